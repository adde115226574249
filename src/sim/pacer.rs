/// Fixed-rate tick scheduling for the driver loop.
///
/// Deadlines advance by exactly one period per tick, so sleep granularity
/// and render time never stretch the tick interval. A backlog of more
/// than one period is dropped instead of replayed as a burst.

use std::time::{Duration, Instant};

/// Longest idle between input polls.
pub const MAX_IDLE: Duration = Duration::from_millis(5);

pub struct TickPacer {
    period: Duration,
    next: Instant,
}

impl TickPacer {
    pub fn new(period: Duration, start: Instant) -> Self {
        TickPacer { period, next: start + period }
    }

    /// True when a tick is due at `now`; the deadline moves one period on.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next {
            return false;
        }
        self.next += self.period;
        if now >= self.next {
            self.next = now + self.period;
        }
        true
    }

    /// How long the loop may sleep before it must poll again.
    pub fn idle_time(&self, now: Instant) -> Duration {
        self.next.saturating_duration_since(now).min(MAX_IDLE)
    }
}
