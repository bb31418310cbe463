//! # Per-group exclusivity slot.
//!
//! A group logically holds at most one *active* record and at most one
//! *default* record reference. Slots hold names (non-owning references into
//! the registry) and are created on demand and removed when empty.

/// Exclusivity bookkeeping for one named group.
#[derive(Debug, Default)]
pub(crate) struct GroupSlot {
    /// Record currently holding the group (`Started`/`Running`/`Resumed`).
    pub active: Option<String>,
    /// Record the group falls back to when a non-default record finishes.
    pub default: Option<String>,
}

impl GroupSlot {
    pub fn is_empty(&self) -> bool {
        self.active.is_none() && self.default.is_none()
    }
}
