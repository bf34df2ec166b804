mod exec;
mod types;

pub use exec::{Execution, Query};
pub use types::{GroupSpec, OperationKind};
