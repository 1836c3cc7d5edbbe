use thiserror::Error;

use orders_domain::DomainError;
use orders_store::StoreError;

/// Application-level error taxonomy. Every use case returns one of these
/// four kinds; the HTTP layer (`ordersd`) maps each to a status code and
/// nothing downstream of the use cases needs to know about transport.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, field: Option<String> },

    #[error("{resource} not found: {id}")]
    NotFound {
        resource: &'static str,
        id: String,
        message: String,
    },

    #[error("{message}")]
    Conflict { message: String, reason: &'static str },

    #[error("{message}")]
    Infra { message: String },
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: &'static str) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.to_string()),
        }
    }

    pub fn not_found(resource: &'static str, id: impl Into<String>) -> Self {
        let id = id.into();
        Self::NotFound {
            resource,
            message: format!("{resource} '{id}' was not found"),
            id,
        }
    }

    pub fn conflict(message: impl Into<String>, reason: &'static str) -> Self {
        Self::Conflict {
            message: message.into(),
            reason,
        }
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        AppError::validation(err.to_string())
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity_type, id } => AppError::not_found(entity_type, id),
            StoreError::Duplicate { entity_type, id } => {
                AppError::conflict(format!("{entity_type} '{id}' already exists"), "duplicate")
            }
            StoreError::Domain(domain_err) => AppError::from(domain_err),
            other => AppError::Infra {
                message: other.to_string(),
            },
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
