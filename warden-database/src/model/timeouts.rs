/// A timed mute that was applied on the platform. Timestamps are unix milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimeoutEntry {
    pub started_at: u64,
    pub ends_at: u64,
}

impl TimeoutEntry {
    /// Whether the mute is still in force at `now_millis`.
    ///
    /// Expiry itself is enforced by the platform; this is only a display hint.
    pub fn is_active_at(&self, now_millis: u64) -> bool {
        self.ends_at > now_millis
    }

    pub fn duration_millis(&self) -> u64 {
        self.ends_at.saturating_sub(self.started_at)
    }
}
