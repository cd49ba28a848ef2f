//! Retry queue for quiz leads that could not be delivered
//!
//! Leads are kept in first-in, first-out order and identified by the
//! client submission id, so replaying the same lead twice is harmless.
//!
//! - `FileRetryQueue` - JSON file on local disk, survives restarts
//! - `InMemoryRetryQueue` - process memory, for tests and throwaway runs

pub mod error;
pub mod file;
pub mod memory;
pub mod queue;

pub use error::PersistenceError;
pub use file::FileRetryQueue;
pub use memory::InMemoryRetryQueue;
pub use queue::{PendingLead, RetryQueue};
