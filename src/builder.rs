use bson::{Bson, Document};
use std::sync::Arc;

use crate::errors::QueryError;
use crate::expr::Expr;
use crate::query::{GroupSpec, OperationKind, Query};
use crate::types::{Order, TypeArg};

/// Fluent entry point for one query-construction session.
///
/// A Builder owns exactly one [`Expr`] and re-exposes its whole fluent
/// vocabulary, returning itself from every call so the chain never leaves
/// the Builder. On top of that it selects the operation kind, carries the
/// projection sub-language and execution options, and finalizes the session
/// into an immutable [`Query`].
#[derive(Debug)]
pub struct Builder<S> {
    collection: Arc<S>,
    expr: Expr,
    kind: OperationKind,
    projection: Option<Document>,
    group: Option<GroupSpec>,
    options: Document,
}

impl<S> Builder<S> {
    #[must_use]
    pub fn new(collection: Arc<S>) -> Self {
        Self {
            collection,
            expr: Expr::new(),
            kind: OperationKind::Find,
            projection: None,
            group: None,
            options: Document::new(),
        }
    }

    /// A detached [`Expr`] for composing sub-filters.
    #[must_use]
    pub fn expr() -> Expr {
        Expr::new()
    }

    // Operation selection

    pub fn find(&mut self) -> &mut Self {
        self.kind = OperationKind::Find;
        self
    }

    pub fn find_and_update(&mut self) -> &mut Self {
        self.kind = OperationKind::FindAndUpdate;
        self
    }

    pub fn find_and_remove(&mut self) -> &mut Self {
        self.kind = OperationKind::FindAndRemove;
        self
    }

    pub fn insert(&mut self) -> &mut Self {
        self.kind = OperationKind::Insert;
        self
    }

    pub fn update(&mut self) -> &mut Self {
        self.kind = OperationKind::Update;
        self
    }

    pub fn update_many(&mut self) -> &mut Self {
        self.kind = OperationKind::UpdateMany;
        self
    }

    pub fn remove(&mut self) -> &mut Self {
        self.kind = OperationKind::Remove;
        self
    }

    /// Selects the legacy group-by aggregation.
    pub fn group(&mut self, keys: Document, initial: Document, reduce: &str) -> &mut Self {
        self.kind = OperationKind::Group;
        self.group = Some(GroupSpec {
            keys,
            initial,
            reduce: reduce.to_string(),
            options: Document::new(),
        });
        self
    }

    /// Stores the upsert flag; only update dispatch consumes it.
    pub fn upsert(&mut self, upsert: bool) -> &mut Self {
        self.options.insert("upsert", upsert);
        self
    }

    // Projection sub-language

    /// Marks fields for inclusion in the result documents.
    pub fn select<I, K>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let projection = self.projection.get_or_insert_default();
        for field in fields {
            projection.insert(field.into(), 1);
        }
        self
    }

    /// Projects only the first array element matching a sub-filter.
    pub fn select_elem_match(&mut self, field: &str, expr: impl Into<Bson>) -> &mut Self {
        let mut clause = Document::new();
        clause.insert("$elemMatch", expr.into());
        self.projection.get_or_insert_default().insert(field, clause);
        self
    }

    /// Slice projection: a single count (negative counts from the end), or a
    /// `[skip, limit]` pair when `limit` is given.
    pub fn select_slice(&mut self, field: &str, count_or_skip: i32, limit: Option<i32>) -> &mut Self {
        let slice: Bson = match limit {
            Some(limit) => vec![Bson::Int32(count_or_skip), Bson::Int32(limit)].into(),
            None => count_or_skip.into(),
        };
        let mut clause = Document::new();
        clause.insert("$slice", slice);
        self.projection.get_or_insert_default().insert(field, clause);
        self
    }

    /// Metadata projection, e.g. a text-search relevance score.
    pub fn select_meta(&mut self, keyword: &str) -> &mut Self {
        self.projection.get_or_insert_default().insert("$meta", keyword);
        self
    }

    // Finalization

    /// Snapshots the session into an immutable [`Query`].
    #[must_use]
    pub fn get_query(&self) -> Query<S> {
        self.get_query_with(Document::new())
    }

    /// Like [`get_query`](Self::get_query), with extra execution options
    /// merged over the session's own.
    #[must_use]
    pub fn get_query_with(&self, extra_options: Document) -> Query<S> {
        let mut options = self.options.clone();
        for (key, value) in extra_options {
            options.insert(key, value);
        }
        log::debug!(
            "finalized {} query: filter={:?} update={:?}",
            self.kind,
            self.expr.filter(),
            self.expr.update(),
        );
        Query {
            collection: Arc::clone(&self.collection),
            kind: self.kind,
            filter: self.expr.filter().clone(),
            update: self.expr.update().clone(),
            projection: self.projection.clone(),
            group: self.group.clone(),
            options,
        }
    }

    /// The filter accumulated so far, without finalizing.
    #[must_use]
    pub fn get_filter(&self) -> &Document {
        self.expr.filter()
    }

    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    // Assignment, special-cased for inserts

    /// Assigns a value to the current field. Placement is atomic (`$set`)
    /// except for insert operations, whose documents are plain field
    /// assignments.
    ///
    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn set(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        let atomic = self.kind != OperationKind::Insert;
        self.expr.set(value, atomic)?;
        Ok(self)
    }

    // Name-based dispatch

    /// Resolves Builder verbs first, then falls through to
    /// [`Expr::apply_named`]. `set` keeps its insert special-casing.
    ///
    /// # Errors
    /// `UnknownMethod` when nothing matches the name.
    pub fn apply_named(&mut self, method: &str, value: Bson) -> Result<&mut Self, QueryError> {
        match method {
            "find" => Ok(self.find()),
            "find_and_update" => Ok(self.find_and_update()),
            "find_and_remove" => Ok(self.find_and_remove()),
            "insert" => Ok(self.insert()),
            "update" => Ok(self.update()),
            "update_many" => Ok(self.update_many()),
            "remove" => Ok(self.remove()),
            "upsert" => match value {
                Bson::Boolean(flag) => Ok(self.upsert(flag)),
                other => Err(QueryError::InvalidArgument(format!(
                    "upsert expects a boolean, got {other:?}"
                ))),
            },
            "set" => self.set(value),
            _ => {
                self.expr.apply_named(method, value)?;
                Ok(self)
            }
        }
    }

    // Expression surface, delegated

    pub fn field(&mut self, name: impl Into<String>) -> &mut Self {
        self.expr.field(name);
        self
    }

    pub fn apply_operator(&mut self, op: &str, value: impl Into<Bson>) -> &mut Self {
        self.expr.apply_operator(op, value);
        self
    }

    pub fn equals(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.equals(value);
        self
    }

    pub fn gt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.gt(value);
        self
    }

    pub fn gte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.gte(value);
        self
    }

    pub fn lt(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.lt(value);
        self
    }

    pub fn lte(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.lte(value);
        self
    }

    pub fn ne(&mut self, value: impl Into<Bson>) -> &mut Self {
        Expr::ne(&mut self.expr, value);
        self
    }

    pub fn not_equals(&mut self, value: impl Into<Bson>) -> &mut Self {
        self.expr.not_equals(value);
        self
    }

    pub fn range(&mut self, start: impl Into<Bson>, end: impl Into<Bson>) -> &mut Self {
        self.expr.range(start, end);
        self
    }

    pub fn is_in<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.is_in(values);
        self
    }

    pub fn is_not_in<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.is_not_in(values);
        self
    }

    pub fn all<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.all(values);
        self
    }

    pub fn size(&mut self, size: i32) -> &mut Self {
        self.expr.size(size);
        self
    }

    pub fn exists(&mut self, exists: bool) -> &mut Self {
        self.expr.exists(exists);
        self
    }

    /// # Errors
    /// `InvalidArgument` for a name outside the type table.
    pub fn is_type(&mut self, ty: impl Into<TypeArg>) -> Result<&mut Self, QueryError> {
        self.expr.is_type(ty)?;
        Ok(self)
    }

    pub fn regex(&mut self, pattern: &str) -> &mut Self {
        self.expr.regex(pattern);
        self
    }

    pub fn is_not(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.expr.is_not(expr);
        self
    }

    pub fn elem_match(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.expr.elem_match(expr);
        self
    }

    pub fn each<I, V>(&mut self, values: I) -> &mut Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.each(values);
        self
    }

    pub fn position(&mut self, position: i32) -> &mut Self {
        self.expr.position(position);
        self
    }

    pub fn slice(&mut self, slice: impl Into<Bson>) -> &mut Self {
        self.expr.slice(slice);
        self
    }

    pub fn is_null(&mut self) -> &mut Self {
        self.expr.is_null();
        self
    }

    pub fn not_null(&mut self) -> &mut Self {
        self.expr.not_null();
        self
    }

    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn bits_all_set(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.bits_all_set(value)?;
        Ok(self)
    }

    /// # Errors
    /// `MissingFieldCursor` when no field is selected.
    pub fn bits_all_clear(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.bits_all_clear(value)?;
        Ok(self)
    }

    pub fn add_and(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.expr.add_and(expr);
        self
    }

    pub fn add_or(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.expr.add_or(expr);
        self
    }

    pub fn add_nor(&mut self, expr: impl Into<Bson>) -> &mut Self {
        self.expr.add_nor(expr);
        self
    }

    pub fn sort(&mut self, field: &str, order: impl Into<Order>) -> &mut Self {
        self.expr.sort(field, order);
        self
    }

    pub fn sort_many<I, K, O>(&mut self, fields: I) -> &mut Self
    where
        I: IntoIterator<Item = (K, O)>,
        K: Into<String>,
        O: Into<Order>,
    {
        self.expr.sort_many(fields);
        self
    }

    pub fn text(&mut self, search: &str) -> &mut Self {
        self.expr.text(search);
        self
    }

    /// # Errors
    /// `Precondition` when no `$text` operator has been set.
    pub fn case_sensitive(&mut self, case_sensitive: bool) -> Result<&mut Self, QueryError> {
        self.expr.case_sensitive(case_sensitive)?;
        Ok(self)
    }

    pub fn comment(&mut self, comment: &str) -> &mut Self {
        self.expr.comment(comment);
        self
    }

    pub fn where_js(&mut self, javascript: &str) -> &mut Self {
        self.expr.where_js(javascript);
        self
    }

    pub fn unset(&mut self) -> Result<&mut Self, QueryError> {
        self.expr.unset()?;
        Ok(self)
    }

    pub fn inc(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.inc(value)?;
        Ok(self)
    }

    pub fn mul(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.mul(value)?;
        Ok(self)
    }

    pub fn min(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.min(value)?;
        Ok(self)
    }

    pub fn max(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.max(value)?;
        Ok(self)
    }

    pub fn rename(&mut self, name: &str) -> Result<&mut Self, QueryError> {
        self.expr.rename(name)?;
        Ok(self)
    }

    pub fn set_on_insert(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.set_on_insert(value)?;
        Ok(self)
    }

    /// # Errors
    /// `InvalidArgument` unless the kind is `"date"` or `"timestamp"`.
    pub fn current_date(&mut self, kind: &str) -> Result<&mut Self, QueryError> {
        self.expr.current_date(kind)?;
        Ok(self)
    }

    pub fn bit_and(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.bit_and(value)?;
        Ok(self)
    }

    pub fn bit_or(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.bit_or(value)?;
        Ok(self)
    }

    pub fn push(&mut self, value: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.push(value)?;
        Ok(self)
    }

    pub fn push_expr(&mut self, spec: &Expr) -> Result<&mut Self, QueryError> {
        self.expr.push_expr(spec)?;
        Ok(self)
    }

    pub fn push_all<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.push_all(values)?;
        Ok(self)
    }

    pub fn pull(&mut self, value_or_expr: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.pull(value_or_expr)?;
        Ok(self)
    }

    pub fn pull_all<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.pull_all(values)?;
        Ok(self)
    }

    pub fn add_to_set(&mut self, value_or_expr: impl Into<Bson>) -> Result<&mut Self, QueryError> {
        self.expr.add_to_set(value_or_expr)?;
        Ok(self)
    }

    pub fn add_many_to_set<I, V>(&mut self, values: I) -> Result<&mut Self, QueryError>
    where
        I: IntoIterator<Item = V>,
        V: Into<Bson>,
    {
        self.expr.add_many_to_set(values)?;
        Ok(self)
    }

    pub fn pop_first(&mut self) -> Result<&mut Self, QueryError> {
        self.expr.pop_first()?;
        Ok(self)
    }

    pub fn pop_last(&mut self) -> Result<&mut Self, QueryError> {
        self.expr.pop_last()?;
        Ok(self)
    }
}
