use bson::{Bson, Document};

use crate::errors::QueryError;
use crate::types::{Order, TypeArg, type_code};

use super::core::Expr;

/// Comparison, element and logical criteria. Everything here writes into the
/// filter document through [`Expr::apply_operator`], so a prior bare equality
/// on the same field is wrapped under `$eq` first.
impl Expr {
    pub fn gt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$gt", value)
    }

    pub fn gte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$gte", value)
    }

    pub fn lt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$lt", value)
    }

    pub fn lte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$lte", value)
    }

    pub fn ne(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$ne", value)
    }

    pub fn not_equals(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.ne(value)
    }

    /// Half-open interval: `$gte start`, `$lt end`.
    pub fn range(&mut self, start: impl Into<Bson>, end: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$gte", start).apply_operator("$lt", end)
    }

    pub fn is_in<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.apply_operator("$in", values)
    }

    pub fn is_not_in<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.apply_operator("$nin", values)
    }

    pub fn all<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.apply_operator("$all", values)
    }

    pub fn size(&mut self, size: i32) -> &mut Self {
        self.apply_operator("$size", size)
    }

    pub fn exists(&mut self, exists: bool) -> &mut Self {
        self.apply_operator("$exists", exists)
    }

    /// Matches on the BSON type of the field. Accepts a raw type code or a
    /// canonical name such as `"string"` or `"objectid"`.
    ///
    /// # Errors
    /// `InvalidArgument` for a name outside the type table.
    pub fn is_type(&mut self, ty: impl Into<TypeArg>) -> Result<&mut Self, QueryError> {
        let code = match ty.into() {
            TypeArg::Code(code) => code,
            TypeArg::Name(name) => type_code(&name.to_ascii_lowercase()).ok_or_else(|| {
                QueryError::InvalidArgument(format!("unknown BSON type name: {name:?}"))
            })?,
        };
        Ok(self.apply_operator("$type", code))
    }

    pub fn regex(&mut self, pattern: &str) -> &mut Self {
        self.apply_operator("$regex", pattern)
    }

    /// Negates a sub-expression or operator document.
    pub fn is_not(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$not", expr)
    }

    pub fn elem_match(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$elemMatch", expr)
    }

    /// `$each` modifier, used when composing a push specification.
    pub fn each<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        let values: Vec<Bson> = values.into_iter().map(Into::into).collect();
        self.apply_operator("$each", values)
    }

    pub fn position(&mut self, position: i32) -> &mut Self {
        self.apply_operator("$position", position)
    }

    pub fn slice(&mut self, slice: impl Into<Bson>) -> &mut Self {
        self.apply_operator("$slice", slice)
    }

    pub fn is_null(&mut self) -> &mut Self {
        self.equals(Bson::Null)
    }

    pub fn not_null(&mut self) -> &mut Self {
        self.ne(Bson::Null)
    }

    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn bits_all_set(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.require_field()?;
        Ok(self.apply_operator("$bitsAllSet", value))
    }

    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn bits_all_clear(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.require_field()?;
        Ok(self.apply_operator("$bitsAllClear", value))
    }

    pub fn add_and(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.push_logical("$and", expr.into())
    }

    pub fn add_or(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.push_logical("$or", expr.into())
    }

    pub fn add_nor(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.push_logical("$nor", expr.into())
    }

    /// Sorts on a single field; see [`sort_many`](Self::sort_many).
    pub fn sort(&mut self, field: &str, order: impl Into<Order>) -> &mut Self {
        self.sort_many([(field, order)])
    }

    /// Builds a `$sort` document. Orders normalize to `1` / `-1` whether
    /// given as `Order`, a signed integer or an `"asc"` / `"desc"` string.
    pub fn sort_many<I, K, O>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, O)>,
        K: Into<String>,
        O: Into<Order>,
    {
        let mut spec = Document::new();
        for (field, order) in fields {
            spec.insert(field.into(), order.into().as_i32());
        }
        self.apply_operator("$sort", spec)
    }

    /// Full-text search clause: `$text: { $search: ... }`.
    pub fn text(&mut self, search: &str) -> &mut Self {
        let mut clause = Document::new();
        clause.insert("$search", search);
        self.filter.insert("$text", clause);
        self
    }

    /// Toggles `$caseSensitive` on an existing `$text` clause.
    ///
    /// # Errors
    /// `Precondition` when no `$text` operator has been set.
    pub fn case_sensitive(&mut self, case_sensitive: bool) -> Result<&mut Self, QueryError> {
        let Some(Bson::Document(text)) = self.filter.get_mut("$text") else {
            return Err(QueryError::Precondition(
                "case_sensitive requires a $text operator (call text() first)".to_string(),
            ));
        };
        if case_sensitive {
            text.insert("$caseSensitive", true);
        } else {
            text.remove("$caseSensitive");
        }
        Ok(self)
    }

    /// Attaches a `$comment` to the filter.
    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.filter.insert("$comment", comment);
        self
    }

    /// Raw `$where` javascript clause.
    pub fn where_js(&mut self, javascript: &str) -> &mut Self {
        self.filter.insert("$where", javascript);
        self
    }

    fn push_logical(&mut self, op: &str, sub: Bson) -> &mut Self {
        if !matches!(self.filter.get(op), Some(Bson::Array(_))) {
            self.filter.insert(op, Bson::Array(Vec::new()));
        }
        if let Some(Bson::Array(list)) = self.filter.get_mut(op) {
            list.push(sub);
        }
        self
    }
}
