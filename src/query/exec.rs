use bson::Document;
use std::sync::Arc;

use crate::errors::QueryError;
use crate::store::DocumentStore;

use super::types::{GroupSpec, OperationKind};

/// An immutable snapshot of one finished build session. Produced by
/// [`crate::Builder::get_query`]; later Builder mutation is not observed.
#[derive(Debug)]
pub struct Query<S> {
    pub(crate) collection: Arc<S>,
    pub(crate) kind: OperationKind,
    pub(crate) filter: Document,
    pub(crate) update: Document,
    pub(crate) projection: Option<Document>,
    pub(crate) group: Option<GroupSpec>,
    pub(crate) options: Document,
}

/// The store-native result of a dispatched query, one variant per driver
/// method.
pub enum Execution<S: DocumentStore> {
    Cursor(S::Cursor),
    Inserted(S::InsertAck),
    Updated(S::UpdateSummary),
    Deleted(S::DeleteSummary),
    Grouped(S::GroupResult),
}

impl<S: DocumentStore> std::fmt::Debug for Execution<S> {
    // The store-native payloads are opaque to this crate, so only the variant
    // name is printed.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let variant = match self {
            Execution::Cursor(_) => "Cursor",
            Execution::Inserted(_) => "Inserted",
            Execution::Updated(_) => "Updated",
            Execution::Deleted(_) => "Deleted",
            Execution::Grouped(_) => "Grouped",
        };
        f.debug_tuple(variant).finish()
    }
}

impl<S> Query<S> {
    #[must_use]
    pub const fn kind(&self) -> OperationKind {
        self.kind
    }

    #[must_use]
    pub const fn filter(&self) -> &Document {
        &self.filter
    }

    #[must_use]
    pub const fn update(&self) -> &Document {
        &self.update
    }

    #[must_use]
    pub const fn projection(&self) -> Option<&Document> {
        self.projection.as_ref()
    }

    #[must_use]
    pub const fn options(&self) -> &Document {
        &self.options
    }
}

impl<S: DocumentStore> Query<S> {
    /// Dispatches once to the store method matching the operation kind and
    /// returns the store's native result. Store failures propagate verbatim;
    /// nothing is retried.
    ///
    /// # Errors
    /// `UnsupportedOperation` for a kind with no dispatch arm; `Precondition`
    /// for a group query without a group specification; any store error.
    pub fn execute(self) -> Result<Execution<S>, QueryError> {
        let Self { collection, kind, filter, update, projection, group, mut options } = self;
        log::debug!("executing {kind} query: filter={filter:?}");
        match kind {
            OperationKind::Find => {
                let projection = projection.as_ref().filter(|p| !p.is_empty());
                Ok(Execution::Cursor(collection.find(&filter, projection)?))
            }
            OperationKind::Insert => {
                Ok(Execution::Inserted(collection.insert(update, &options)?))
            }
            OperationKind::Update => {
                Ok(Execution::Updated(collection.update_one(&filter, &update, &options)?))
            }
            OperationKind::UpdateMany => {
                Ok(Execution::Updated(collection.update_many(&filter, &update, &options)?))
            }
            OperationKind::Remove => Ok(Execution::Deleted(collection.delete(&filter, &options)?)),
            OperationKind::Group => {
                let spec = group.ok_or_else(|| {
                    QueryError::Precondition(
                        "group query without a group specification".to_string(),
                    )
                })?;
                if !filter.is_empty() {
                    options.insert("cond", filter);
                }
                let mut group_options = spec.options;
                for (key, value) in options {
                    group_options.insert(key, value);
                }
                Ok(Execution::Grouped(collection.group(
                    &spec.keys,
                    &spec.initial,
                    &spec.reduce,
                    &group_options,
                )?))
            }
            OperationKind::FindAndUpdate | OperationKind::FindAndRemove => {
                Err(QueryError::UnsupportedOperation(kind))
            }
        }
    }
}
