//! Change-feed payloads
//!
//! A [`ChangeEvent`] tells subscribers that rows of a resource changed;
//! it carries no row data. Consumers are expected to re-fetch whatever
//! they are displaying.

use serde::{Deserialize, Serialize};

/// What happened to the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

/// One change notification
///
/// `version` is monotonically increasing per resource, so a client can
/// discard events older than what it has already reacted to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Table name ("invoice", "payment", "product", ...)
    pub resource: String,
    /// Per-resource monotonic version
    pub version: u64,
    pub action: ChangeAction,
    /// Record id in "table:key" form
    pub id: String,
    /// Unix millis at publish time
    pub timestamp: i64,
}
