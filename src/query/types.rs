use bson::Document;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The operation a finalized query dispatches to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperationKind {
    #[default]
    Find,
    FindAndUpdate,
    FindAndRemove,
    Insert,
    Update,
    UpdateMany,
    Remove,
    Group,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Find => "find",
            Self::FindAndUpdate => "find_and_update",
            Self::FindAndRemove => "find_and_remove",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::UpdateMany => "update_many",
            Self::Remove => "remove",
            Self::Group => "group",
        };
        f.write_str(name)
    }
}

/// Legacy group-by aggregation specification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupSpec {
    pub keys: Document,
    pub initial: Document,
    pub reduce: String,
    pub options: Document,
}
