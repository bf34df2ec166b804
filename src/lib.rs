//! Fluent builder for BSON filter and update documents.
//!
//! A [`Builder`] accumulates criteria and update clauses through chained
//! calls instead of hand-built nested documents, then finalizes into an
//! immutable [`Query`] that dispatches once to a [`DocumentStore`] driver.
//!
//! ```
//! use std::sync::Arc;
//! use docquery::{Builder, test_support::RecordingStore};
//!
//! # fn main() -> Result<(), docquery::QueryError> {
//! let store = Arc::new(RecordingStore::new());
//!
//! let mut qb = Builder::new(Arc::clone(&store));
//! qb.field("name").is_not_in(["Matthew", "Boris"])
//!     .field("age").gte(21)
//!     .field("attributes").is_type("object")?;
//!
//! // Equivalent to finding with the filter
//! // {"name": {"$nin": ["Matthew", "Boris"]},
//! //  "age": {"$gte": 21},
//! //  "attributes": {"$type": 3}}
//! let _cursor = qb.get_query().execute()?;
//! # Ok(())
//! # }
//! ```
//!
//! Update sessions chain criteria and update clauses on one surface:
//!
//! ```
//! use std::sync::Arc;
//! use bson::doc;
//! use docquery::{Builder, test_support::RecordingStore};
//!
//! # fn main() -> Result<(), docquery::QueryError> {
//! let store = Arc::new(RecordingStore::new());
//! let mut qb = Builder::new(store);
//! qb.update_many()
//!     .field("foo").equals("bar").set("buzz")?
//!     .field("totals").gt(10)
//!     .field("counter").inc(1)?
//!     .field("some_list").push(doc! { "name": "testing", "value": "cool" })?;
//! let _ack = qb.get_query().execute()?;
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod errors;
pub mod expr;
pub mod query;
pub mod store;
pub mod test_support;
pub mod types;

pub use builder::Builder;
pub use errors::QueryError;
pub use expr::Expr;
pub use query::{Execution, GroupSpec, OperationKind, Query};
pub use store::DocumentStore;
pub use types::{Order, TypeArg};

/// A new detached [`Expr`] for composing sub-filters.
#[must_use]
pub fn expr() -> Expr {
    Expr::new()
}
