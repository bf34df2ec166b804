use bson::Document;

use crate::errors::QueryError;

/// The document store collaborator a finalized [`crate::Query`] dispatches
/// to. Implementations adapt a concrete driver; the result types are the
/// driver's own and are opaque to this crate.
///
/// Store-native failures should be wrapped with [`QueryError::driver`] so
/// they propagate through `execute()` unchanged.
pub trait DocumentStore {
    /// Lazily-iterable result sequence of a filtered read.
    type Cursor;
    /// Acknowledgement of a completed insert.
    type InsertAck;
    /// Modification-count result of an update.
    type UpdateSummary;
    /// Result of a delete.
    type DeleteSummary;
    /// Result of a legacy group-by aggregation.
    type GroupResult;

    fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Self::Cursor, QueryError>;

    fn insert(&self, document: Document, options: &Document)
    -> Result<Self::InsertAck, QueryError>;

    fn update_one(
        &self,
        filter: &Document,
        update: &Document,
        options: &Document,
    ) -> Result<Self::UpdateSummary, QueryError>;

    fn update_many(
        &self,
        filter: &Document,
        update: &Document,
        options: &Document,
    ) -> Result<Self::UpdateSummary, QueryError>;

    fn delete(&self, filter: &Document, options: &Document)
    -> Result<Self::DeleteSummary, QueryError>;

    fn group(
        &self,
        keys: &Document,
        initial: &Document,
        reduce: &str,
        options: &Document,
    ) -> Result<Self::GroupResult, QueryError>;
}
