//! Repository layer for database operations.
//!
//! [`Repository`] binds a SeaORM entity to a connection and hands out
//! [`Query`] chains built from loosely-typed condition sets. Each chain owns
//! its state and is consumed by the terminal call that executes it, so two
//! executions never share builder state. Row-level operations (find, create,
//! update, delete) live on the [`EntityStore`] trait.

pub mod base;
pub mod messages;
pub mod page;
pub mod query;
pub mod store;

pub use base::Repository;
pub use messages::ErrorMessages;
pub use page::Page;
pub use query::Query;
pub use store::{EntityStore, PrimaryKeyValue};
