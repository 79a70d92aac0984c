use crate::model::timeouts::TimeoutEntry;

/// One stored warning. `issued_at` is unix milliseconds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarningEntry {
    pub reason: String,
    pub issued_at: u64,
}

/// Result of issuing a warning: the post-increment total and the reason as stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WarningRecord {
    pub warn_count: u64,
    pub reason: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WarningRemoval {
    pub removed: u64,
    pub remaining: u64,
}

/// Full disciplinary history for one member.
///
/// `warnings` is oldest first; `timeouts` is in insertion order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WarningHistory {
    pub warn_count: u64,
    pub warnings: Vec<WarningEntry>,
    pub timeouts: Vec<TimeoutEntry>,
}
