use bson::{Bson, Document};

use crate::errors::QueryError;

/// Mutable build state for one query: a filter document, an update document
/// and the current-field cursor shared by every field-scoped operator.
///
/// The cursor is set by [`field`](Self::field) and persists until the next
/// `field()` call, so chained operators without an intervening `field()`
/// apply to the same field.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Expr {
    pub(crate) filter: Document,
    pub(crate) update: Document,
    pub(crate) current_field: Option<String>,
}

impl Expr {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Points the cursor at `name`. No other effect.
    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        self.current_field = Some(name.into());
        self
    }

    /// Bare equality. With a cursor set, assigns `filter[field] = value`
    /// without any operator wrapping; a later operator on the same field
    /// re-wraps the value under `$eq`. Without a cursor, a document value
    /// replaces the whole filter and anything else becomes a top-level `$eq`.
    pub fn equals(&mut self, value: impl Into<Bson>) -> &mut Self {
        match (&self.current_field, value.into()) {
            (Some(field), value) => {
                self.filter.insert(field.clone(), value);
            }
            (None, Bson::Document(doc)) => {
                self.filter = doc;
            }
            (None, value) => {
                self.filter = Document::new();
                self.filter.insert("$eq", value);
            }
        }
        self
    }

    /// Shared routine behind every comparison operator: wraps any bare
    /// equality already present, then merges `op` into the operator document
    /// at the current field, or at the top level when no field is set.
    pub fn apply_operator(&mut self, op: &str, value: impl Into<Bson>) -> &mut Self {
        self.wrap_equality();
        let value = value.into();
        match self.current_field.clone() {
            Some(field) => {
                if !matches!(self.filter.get(field.as_str()), Some(Bson::Document(_))) {
                    self.filter.insert(field.clone(), Document::new());
                }
                if let Some(Bson::Document(ops)) = self.filter.get_mut(field.as_str()) {
                    ops.insert(op, value);
                }
            }
            None => {
                self.filter.insert(op, value);
            }
        }
        self
    }

    /// Read-only view of the accumulated filter document.
    #[must_use]
    pub fn filter(&self) -> &Document {
        &self.filter
    }

    /// Read-only view of the accumulated update document.
    #[must_use]
    pub fn update(&self) -> &Document {
        &self.update
    }

    #[must_use]
    pub fn current_field(&self) -> Option<&str> {
        self.current_field.as_deref()
    }

    pub(crate) fn require_field(&self) -> Result<String, QueryError> {
        self.current_field.clone().ok_or(QueryError::MissingFieldCursor)
    }

    /// Returns the operator document under `op` in the update document,
    /// inserting a fresh one if the slot is missing or not a document.
    pub(crate) fn update_entry(&mut self, op: &str) -> &mut Document {
        if !matches!(self.update.get(op), Some(Bson::Document(_))) {
            self.update.insert(op, Document::new());
        }
        match self.update.get_mut(op) {
            Some(Bson::Document(doc)) => doc,
            _ => unreachable!(),
        }
    }

    // Converts a prior bare equality into an explicit `$eq` document before a
    // second operator lands on the same slot. The "already an operator
    // document" check inspects only the first key.
    fn wrap_equality(&mut self) {
        match self.current_field.clone() {
            Some(field) => {
                let existing = match self.filter.get(field.as_str()) {
                    None => return,
                    Some(value) if is_falsy(value) => return,
                    Some(Bson::Document(doc))
                        if doc.keys().next().is_some_and(|k| k.starts_with('$')) =>
                    {
                        return;
                    }
                    Some(value) => value.clone(),
                };
                let mut wrapped = Document::new();
                wrapped.insert("$eq", existing);
                self.filter.insert(field, wrapped);
            }
            None => {
                if self.filter.is_empty()
                    || self.filter.keys().next().is_some_and(|k| k.starts_with('$'))
                {
                    return;
                }
                let existing = std::mem::take(&mut self.filter);
                self.filter.insert("$eq", existing);
            }
        }
    }
}

/// A sub-expression used where a plain value is accepted (`add_or`, `pull`,
/// `elem_match`, ...) contributes its filter document.
impl From<&Expr> for Bson {
    fn from(expr: &Expr) -> Self {
        Self::Document(expr.filter.clone())
    }
}

// Empty or zero-like values never get wrapped; the next operator simply
// replaces them with a fresh operator document.
fn is_falsy(value: &Bson) -> bool {
    match value {
        Bson::Null => true,
        Bson::Boolean(b) => !b,
        Bson::Int32(n) => *n == 0,
        Bson::Int64(n) => *n == 0,
        Bson::Double(f) => *f == 0.0,
        Bson::String(s) => s.is_empty(),
        Bson::Array(a) => a.is_empty(),
        Bson::Document(d) => d.is_empty(),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn bare_equality_is_not_wrapped() {
        let mut expr = Expr::new();
        expr.field("name").equals("alice");
        assert_eq!(expr.filter(), &doc! { "name": "alice" });
    }

    #[test]
    fn second_operator_wraps_prior_equality() {
        let mut expr = Expr::new();
        expr.field("x").equals(5).apply_operator("$gt", 1);
        assert_eq!(expr.filter(), &doc! { "x": { "$eq": 5, "$gt": 1 } });
    }

    #[test]
    fn operator_document_is_never_rewrapped() {
        let mut expr = Expr::new();
        expr.field("x").apply_operator("$gt", 1).apply_operator("$lt", 9);
        assert_eq!(expr.filter(), &doc! { "x": { "$gt": 1, "$lt": 9 } });
    }

    #[test]
    fn falsy_equality_is_replaced_not_wrapped() {
        let mut expr = Expr::new();
        expr.field("x").equals(0).apply_operator("$gt", 1);
        assert_eq!(expr.filter(), &doc! { "x": { "$gt": 1 } });
    }

    #[test]
    fn top_level_document_equality_wraps() {
        let mut expr = Expr::new();
        expr.equals(doc! { "a": 1 }).apply_operator("$comment", "c");
        assert_eq!(expr.filter(), &doc! { "$eq": { "a": 1 }, "$comment": "c" });
    }

    #[test]
    fn cursor_persists_across_operators() {
        let mut expr = Expr::new();
        expr.field("age").apply_operator("$gte", 21);
        assert_eq!(expr.current_field(), Some("age"));
    }
}
