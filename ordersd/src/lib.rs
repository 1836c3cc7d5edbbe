pub mod api;
pub mod config;
pub mod daemon;
pub mod error;

pub use config::Config;
pub use daemon::Daemon;
pub use error::{DaemonError, DaemonResult};
