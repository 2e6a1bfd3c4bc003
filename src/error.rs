//! Error types for repository operations.

use sea_orm::DbErr;

/// Common error types for repository operations.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: String, key: String },

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    #[error("Invalid attributes: {0}")]
    Json(#[from] serde_json::Error),
}

impl RepositoryError {
    pub(crate) fn not_found(entity: &str, key: impl std::fmt::Debug) -> Self {
        Self::NotFound {
            entity: entity.to_string(),
            key: format!("{:?}", key),
        }
    }

    /// Classify a failure raised while persisting a row.
    ///
    /// Constraint violations and attribute mapping failures become
    /// [`RepositoryError::Validation`]; everything else stays a database error.
    pub(crate) fn persistence(err: DbErr) -> Self {
        if let Some(sql_err) = err.sql_err() {
            return Self::Validation(sql_err.to_string());
        }
        match err {
            DbErr::Json(msg) => Self::Validation(msg),
            other => Self::Database(other),
        }
    }

    /// Whether this error means the requested row does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Database(DbErr::RecordNotFound(_)))
    }
}

/// Result alias used by every repository operation.
pub type Result<T> = std::result::Result<T, RepositoryError>;
