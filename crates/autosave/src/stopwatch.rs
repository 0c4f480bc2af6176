//! Elapsed-time tracking for the autosave interval.

use std::time::Duration;

/// Tracks elapsed time across start/stop cycles.
///
/// Every operation takes the current clock reading as a `now` argument (the
/// plugin reads it from Bevy's [`Time`](bevy::time::Time) resource), so the
/// stopwatch itself is deterministic: elapsed time only advances between a
/// `start` and the matching `stop`. All operations are total.
#[derive(Debug, Clone, Copy, Default)]
pub struct Stopwatch {
    started_at: Option<Duration>,
    accumulated: Duration,
}

impl Stopwatch {
    /// Begin timing. No-op if already running.
    pub fn start(&mut self, now: Duration) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    /// Freeze elapsed time, folding the current run into the accumulated
    /// total. No-op if not running.
    pub fn stop(&mut self, now: Duration) {
        if let Some(started) = self.started_at.take() {
            self.accumulated += now.saturating_sub(started);
        }
    }

    /// Zero the accumulated time and begin timing fresh, regardless of
    /// whether the watch was running.
    pub fn restart(&mut self, now: Duration) {
        self.accumulated = Duration::ZERO;
        self.started_at = Some(now);
    }

    /// Whether the watch is currently accruing time.
    pub fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    /// Accumulated time plus the current run, if any.
    pub fn elapsed(&self, now: Duration) -> Duration {
        match self.started_at {
            Some(started) => self.accumulated + now.saturating_sub(started),
            None => self.accumulated,
        }
    }

    /// Whole minutes elapsed since the last restart, counting only
    /// intervals during which the watch was running.
    pub fn elapsed_minutes(&self, now: Duration) -> u64 {
        self.elapsed(now).as_secs() / 60
    }
}
