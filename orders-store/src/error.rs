use thiserror::Error;

use orders_domain::DomainError;

/// Errors a repository implementation can raise. One layer up
/// (`orders-app`) folds these into the four-kind application taxonomy —
/// this enum itself stays storage-shaped.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity_type} with id '{id}' was not found")]
    NotFound { entity_type: &'static str, id: String },

    #[error("{entity_type} with id '{id}' already exists")]
    Duplicate { entity_type: &'static str, id: String },

    #[error("invalid domain state: {0}")]
    Domain(#[from] DomainError),

    #[error("database error: {0}")]
    Database(String),

    #[error("failed to reconstruct stored row: {0}")]
    Deserialization(String),
}

impl StoreError {
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    pub fn duplicate(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type,
            id: id.into(),
        }
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => StoreError::NotFound {
                entity_type: "Order",
                id: "<unknown>".to_string(),
            },
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => StoreError::Duplicate {
                entity_type: "Order",
                id: "<unknown>".to_string(),
            },
            other => StoreError::Database(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;
