//! Transactional outbox: writer (caller-transaction-scoped append) and
//! dispatcher (concurrent poll-based drain with row-level skip-locking).

pub mod dispatcher;
pub mod sink;
pub mod types;
pub mod writer;

pub use dispatcher::{DispatcherConfig, OutboxDispatcher};
pub use sink::{AlreadyWrittenSink, EventSink, NoopEventSink};
pub use types::{OutboxError, OutboxResult, OutboxRow, OutboxStats};
pub use writer::{publish, publish_all};
