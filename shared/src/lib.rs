//! Shared types for the ledger workspace
//!
//! Domain vocabulary used by the server and its clients: invoice and
//! return lifecycle enums, change-feed payloads, and time utilities.

pub mod change;
pub mod types;
pub mod util;

// Re-exports
pub use change::{ChangeAction, ChangeEvent};
pub use serde::{Deserialize, Serialize};
pub use types::{InvoiceStatus, InvoiceType, ItemCondition, ReturnStatus};
