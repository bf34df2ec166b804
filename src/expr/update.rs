use bson::{Bson, Document};

use crate::errors::QueryError;

use super::core::Expr;

/// Update operators. Every method here is field-scoped: it resolves the
/// current-field cursor and fails with `MissingFieldCursor` when it is unset.
impl Expr {
    /// Assigns a value to the current field. Atomic placement writes under
    /// `$set`; non-atomic placement writes the field straight into the update
    /// document, splitting dotted paths into nested documents (the insert
    /// path, where documents are plain field assignments).
    ///
    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn set(&mut self, value: impl Into<Bson>, atomic: bool) -> Result<&mut Self, QueryError> {
        let field = self.require_field()?;
        let value = value.into();
        if atomic {
            self.update_entry("$set").insert(field, value);
        } else if field.contains('.') {
            set_nested(&mut self.update, &field, value);
        } else {
            self.update.insert(field, value);
        }
        Ok(self)
    }

    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn unset(&mut self) -> Result<&mut Self, QueryError> {
        self.push_update("$unset", Bson::Int32(1))
    }

    pub fn inc(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$inc", value.into())
    }

    pub fn mul(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$mul", value.into())
    }

    pub fn min(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$min", value.into())
    }

    pub fn max(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$max", value.into())
    }

    pub fn rename(&mut self, name: &str) -> Result<&mut Self, QueryError> {
        self.push_update("$rename", Bson::String(name.to_string()))
    }

    pub fn set_on_insert(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$setOnInsert", value.into())
    }

    /// Stamps the current field with the store's clock.
    ///
    /// # Errors
    /// `InvalidArgument` unless `kind` is `"date"` or `"timestamp"`;
    /// `MissingFieldCursor` when no field is selected.
    pub fn current_date(&mut self, kind: &str) -> Result<&mut Self, QueryError> {
        if kind != "date" && kind != "timestamp" {
            return Err(QueryError::InvalidArgument(format!(
                "current_date kind must be \"date\" or \"timestamp\", got {kind:?}"
            )));
        }
        let field = self.require_field()?;
        let mut spec = Document::new();
        spec.insert("$type", kind);
        self.update_entry("$currentDate").insert(field, spec);
        Ok(self)
    }

    pub fn bit_and(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.bit("and", value.into())
    }

    pub fn bit_or(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.bit("or", value.into())
    }

    pub fn push(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$push", value.into())
    }

    /// Pushes with a modifier specification composed on a sub-expression
    /// (`each` / `position` / `slice` / `sort`). An `$each` key is always
    /// present in the produced spec.
    ///
    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn push_expr(&mut self, spec: &Self) -> Result<&mut Self, QueryError> {
        let mut spec = spec.filter().clone();
        if !spec.contains_key("$each") {
            spec.insert("$each", Bson::Array(Vec::new()));
        }
        self.push_update("$push", Bson::Document(spec))
    }

    /// Bulk push through the deprecated `$pushAll` operator.
    pub fn push_all<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.push_update("$pushAll", Bson::Array(values))
    }

    pub fn pull(&mut self, value_or_expr: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$pull", value_or_expr.into())
    }

    pub fn pull_all<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.push_update("$pullAll", Bson::Array(values))
    }

    pub fn add_to_set(&mut self, value_or_expr: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.push_update("$addToSet", value_or_expr.into())
    }

    /// Adds several values in one `$addToSet`, wrapped under `$each`.
    pub fn add_many_to_set<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        let mut spec = Document::new();
        spec.insert("$each", Bson::Array(values));
        self.push_update("$addToSet", Bson::Document(spec))
    }

    pub fn pop_first(&mut self) -> Result<&mut Self, QueryError> {
        self.push_update("$pop", Bson::Int32(1))
    }

    pub fn pop_last(&mut self) -> Result<&mut Self, QueryError> {
        self.push_update("$pop", Bson::Int32(-1))
    }

    fn push_update(&mut self, op: &str, value: Bson) -> Result<&mut Self, QueryError> {
        let field = self.require_field()?;
        self.update_entry(op).insert(field, value);
        Ok(self)
    }

    fn bit(&mut self, op: &str, value: Bson) -> Result<&mut Self, QueryError> {
        let field = self.require_field()?;
        let bits = self.update_entry("$bit");
        if !matches!(bits.get(field.as_str()), Some(Bson::Document(_))) {
            bits.insert(field.clone(), Document::new());
        }
        if let Some(Bson::Document(ops)) = bits.get_mut(field.as_str()) {
            ops.insert(op, value);
        }
        Ok(self)
    }
}

fn set_nested(root: &mut Document, path: &str, value: Bson) {
    match path.split_once('.') {
        None => {
            root.insert(path, value);
        }
        Some((head, rest)) => {
            if !matches!(root.get(head), Some(Bson::Document(_))) {
                root.insert(head, Document::new());
            }
            if let Some(Bson::Document(child)) = root.get_mut(head) {
                set_nested(child, rest, value);
            }
        }
    }
}
