use std::time::Duration;

/// Punitive action chosen for a warning total.
///
/// Variant order is severity order, so the derived `Ord` ranks
/// `None < TimedMute(shorter) < TimedMute(longer) < PermanentRemoval`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EscalationAction {
    None,
    TimedMute(Duration),
    PermanentRemoval,
}

impl EscalationAction {
    pub fn mute_duration(&self) -> Option<Duration> {
        match self {
            Self::TimedMute(duration) => Some(*duration),
            _ => None,
        }
    }
}

/// One row of the published penalty schedule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScheduleEntry {
    pub warn_count: u64,
    pub action: EscalationAction,
}
