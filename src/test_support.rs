//! In-memory stand-in for a real document store driver. It records every
//! dispatched call so tests can assert on the exact documents a finalized
//! query hands to the collaborator.

use bson::Document;
use parking_lot::Mutex;

use crate::errors::QueryError;
use crate::store::DocumentStore;

/// One store call captured by [`RecordingStore`].
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    Find { filter: Document, projection: Option<Document> },
    Insert { document: Document, options: Document },
    UpdateOne { filter: Document, update: Document, options: Document },
    UpdateMany { filter: Document, update: Document, options: Document },
    Delete { filter: Document, options: Document },
    Group { keys: Document, initial: Document, reduce: String, options: Document },
}

#[derive(Debug, Default)]
pub struct RecordingStore {
    calls: Mutex<Vec<RecordedCall>>,
    fail_next: Mutex<Option<String>>,
}

impl RecordingStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything dispatched to this store so far, in call order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    /// Makes the next dispatched call fail with a driver-level error.
    pub fn fail_next(&self, message: &str) {
        *self.fail_next.lock() = Some(message.to_string());
    }

    fn record(&self, call: RecordedCall) -> Result<(), QueryError> {
        if let Some(message) = self.fail_next.lock().take() {
            return Err(QueryError::driver(std::io::Error::other(message)));
        }
        self.calls.lock().push(call);
        Ok(())
    }
}

impl DocumentStore for RecordingStore {
    type Cursor = Vec<Document>;
    type InsertAck = ();
    type UpdateSummary = ();
    type DeleteSummary = ();
    type GroupResult = Document;

    fn find(
        &self,
        filter: &Document,
        projection: Option<&Document>,
    ) -> Result<Self::Cursor, QueryError> {
        self.record(RecordedCall::Find {
            filter: filter.clone(),
            projection: projection.cloned(),
        })?;
        Ok(Vec::new())
    }

    fn insert(
        &self,
        document: Document,
        options: &Document,
    ) -> Result<Self::InsertAck, QueryError> {
        self.record(RecordedCall::Insert { document, options: options.clone() })
    }

    fn update_one(
        &self,
        filter: &Document,
        update: &Document,
        options: &Document,
    ) -> Result<Self::UpdateSummary, QueryError> {
        self.record(RecordedCall::UpdateOne {
            filter: filter.clone(),
            update: update.clone(),
            options: options.clone(),
        })
    }

    fn update_many(
        &self,
        filter: &Document,
        update: &Document,
        options: &Document,
    ) -> Result<Self::UpdateSummary, QueryError> {
        self.record(RecordedCall::UpdateMany {
            filter: filter.clone(),
            update: update.clone(),
            options: options.clone(),
        })
    }

    fn delete(&self, filter: &Document, options: &Document) -> Result<Self::DeleteSummary, QueryError> {
        self.record(RecordedCall::Delete { filter: filter.clone(), options: options.clone() })
    }

    fn group(
        &self,
        keys: &Document,
        initial: &Document,
        reduce: &str,
        options: &Document,
    ) -> Result<Self::GroupResult, QueryError> {
        self.record(RecordedCall::Group {
            keys: keys.clone(),
            initial: initial.clone(),
            reduce: reduce.to_string(),
            options: options.clone(),
        })?;
        Ok(Document::new())
    }
}
