use thiserror::Error;

use orders_app::AppError;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("application error: {0}")]
    App(#[from] AppError),

    #[error("invalid configuration: {}", .0.join("; "))]
    Config(Vec<String>),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("shutdown requested")]
    Shutdown,
}

pub type DaemonResult<T> = Result<T, DaemonError>;
