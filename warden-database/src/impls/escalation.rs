use std::time::Duration;

use crate::model::escalation::{EscalationAction, ScheduleEntry};

// ---------------------------------------------------------------------------
// Escalation tiers: live warning total → punitive action
// ---------------------------------------------------------------------------

/// Warning total at which a member is permanently removed.
pub const BAN_THRESHOLD: u64 = 6;

/// Returns the action owed for a freshly incremented warning total.
///
/// 1 warning  → notice only
/// 2 warnings → 1 hour mute
/// 3 warnings → 12 hour mute
/// 4 warnings → 24 hour mute
/// 5 warnings → 7 day mute
/// 6+         → permanent removal
pub fn action_for(warn_count: u64) -> EscalationAction {
    match warn_count {
        0 | 1 => EscalationAction::None,
        2 => EscalationAction::TimedMute(Duration::from_secs(3_600)),
        3 => EscalationAction::TimedMute(Duration::from_secs(43_200)),
        4 => EscalationAction::TimedMute(Duration::from_secs(86_400)),
        5 => EscalationAction::TimedMute(Duration::from_secs(604_800)),
        _ => EscalationAction::PermanentRemoval,
    }
}

/// The published penalty schedule, rows 1 through [`BAN_THRESHOLD`].
pub fn schedule_table() -> Vec<ScheduleEntry> {
    (1..=BAN_THRESHOLD)
        .map(|warn_count| ScheduleEntry {
            warn_count,
            action: action_for(warn_count),
        })
        .collect()
}
