//! baserepo - A generic repository and query builder over SeaORM
//!
//! This library turns loosely-typed condition descriptions (keyed JSON
//! objects, operator tuples, raw clause strings) into SeaORM queries, and
//! wraps an entity with a fluent query facade plus row-level CRUD.
//!
//! # Modules
//!
//! * [`criteria`] - Condition normalization and clause types
//! * [`repositories`] - The repository, its query chains and CRUD operations
//! * [`config`] - Configuration loading and validation
//! * [`db`] - Connection and schema helpers
//! * [`logger`] - Logging setup
//! * [`query_log`] - In-memory log of executed statements

/// Configuration module for repository, database and logging settings
pub mod config;

/// Crate constants and default values
pub mod constants;

/// Condition normalization and clause specifications
pub mod criteria;

/// Database connection helpers
pub mod db;

/// Error types shared by every repository operation
pub mod error;

/// Logging setup
pub mod logger;

/// Statement log used in debug mode
pub mod query_log;

/// Repository layer for database operations
pub mod repositories;

pub use config::{Config, DatabaseConfig, LoggingConfig, RepositoryConfig};
pub use criteria::{
    Columns, Condition, ConditionSet, Groups, Having, Havings, Limits, Logic, Operator, Orders, Predicate, SimpleSelect,
};
pub use error::{RepositoryError, Result};
pub use query_log::{LoggedQuery, QueryLog};
pub use repositories::{EntityStore, ErrorMessages, Page, PrimaryKeyValue, Query, Repository};
