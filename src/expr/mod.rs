// Submodules for separation of concerns
mod core;
mod criteria;
mod named;
mod update;

pub use self::core::Expr;
