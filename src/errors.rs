use crate::query::OperationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum QueryError {
    #[error("this method requires a current field; call field() first")]
    MissingFieldCursor,

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("precondition failed: {0}")]
    Precondition(String),

    #[error("unknown builder method: {0}")]
    UnknownMethod(String),

    #[error("unsupported operation kind: {0}")]
    UnsupportedOperation(OperationKind),

    #[error(transparent)]
    Driver(Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    /// Wraps a store-native failure so it propagates through `execute()`
    /// unchanged.
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }
}
