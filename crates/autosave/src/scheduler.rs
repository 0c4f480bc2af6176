//! The autosave scheduling state machine.
//!
//! [`AutosaveScheduler`] owns the interval timer and decides, from the
//! host's lifecycle/pause/focus notifications and the per-frame tick, when a
//! save attempt should fire. Pause and focus are tracked as saturating depth
//! counters: each overlapping reason increments its counter, and the
//! corresponding condition only clears when every reason has cleared, so
//! overlapping sources are never double-counted and a release at depth zero
//! never underflows.
//!
//! State transitions are driven exclusively by the router and tick systems,
//! which Bevy runs on a single schedule, so there is no interleaving to
//! guard against and no locking anywhere in this module.

use std::time::Duration;

use bevy::prelude::*;

use crate::host::HostBridge;
use crate::save_log::{LogLevel, SaveLog};
use crate::settings::AutosaveSettings;
use crate::stopwatch::Stopwatch;

// =============================================================================
// Scheduler resource
// =============================================================================

/// Timer, subscription, and lifecycle state for the autosave engine.
///
/// Constructed inert; [`attach`](Self::attach) activates it once settings
/// have been validated, and [`detach`](Self::detach) reverses exactly that.
/// Both are idempotent.
#[derive(Resource, Debug, Default)]
pub struct AutosaveScheduler {
    attached: bool,
    subscribed: bool,
    city_established: bool,
    pause_depth: u32,
    focus_lost_depth: u32,
    ignore_time_paused: bool,
    timer: Stopwatch,
}

impl AutosaveScheduler {
    // -------------------------------------------------------------------------
    // Activation lifecycle
    // -------------------------------------------------------------------------

    /// Register the scheduler as active, capturing the pause policy from
    /// `settings`. Calling this twice has the same effect as calling it once.
    pub fn attach(&mut self, settings: &AutosaveSettings, now: Duration) {
        if self.attached {
            return;
        }
        self.attached = true;
        self.ignore_time_paused = settings.ignore_time_paused;
        self.reconcile(now);
    }

    /// Deactivate: stop the timer and drop the tick subscription. Safe to
    /// call at any time, including after a partial or failed activation.
    pub fn detach(&mut self, now: Duration) {
        self.attached = false;
        self.reconcile(now);
    }

    // -------------------------------------------------------------------------
    // Host notifications
    // -------------------------------------------------------------------------

    /// The current city crossed from unestablished to established.
    pub fn on_city_established(&mut self, now: Duration) {
        self.city_established = true;
        self.reconcile(now);
    }

    /// A city finished loading; `established` is false for a fresh city that
    /// has never been established, in which case there is nothing to save
    /// yet and the timer stays stopped.
    pub fn on_post_city_init(&mut self, established: bool, now: Duration) {
        if established {
            self.city_established = true;
            self.reconcile(now);
        }
    }

    /// The current city is about to unload. Stops the timer unconditionally.
    pub fn on_pre_city_shutdown(&mut self, now: Duration) {
        self.city_established = false;
        self.reconcile(now);
    }

    /// One pause source changed state. All sources feed the same depth
    /// counter; only the 0↔1 transitions have any effect on the timer or
    /// the tick subscription.
    pub fn on_pause_changed(&mut self, active: bool, now: Duration) {
        if active {
            self.pause_depth += 1;
        } else {
            self.pause_depth = self.pause_depth.saturating_sub(1);
        }
        self.reconcile(now);
    }

    /// The application gained or lost input focus. The timer keeps running
    /// either way; only the tick subscription follows focus.
    pub fn on_focus_changed(&mut self, has_focus: bool, now: Duration) {
        if has_focus {
            self.focus_lost_depth = self.focus_lost_depth.saturating_sub(1);
        } else {
            self.focus_lost_depth += 1;
        }
        self.reconcile(now);
    }

    // -------------------------------------------------------------------------
    // Tick evaluation
    // -------------------------------------------------------------------------

    /// Whether this tick should evaluate the save-attempt guard: the
    /// scheduler is subscribed, a city is established, the timer is running,
    /// and a full interval has elapsed.
    pub fn due(&self, now: Duration, interval_minutes: u32) -> bool {
        self.subscribed
            && self.city_established
            && self.timer.is_running()
            && self.timer.elapsed_minutes(now) >= u64::from(interval_minutes)
    }

    /// Record that a save attempt was issued. The next attempt is scheduled
    /// a full interval later regardless of the attempt's outcome.
    pub fn note_attempt(&mut self, now: Duration) {
        self.timer.restart(now);
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    /// Whether the scheduler is currently receiving periodic ticks.
    pub fn is_subscribed(&self) -> bool {
        self.subscribed
    }

    pub fn city_established(&self) -> bool {
        self.city_established
    }

    pub fn timer_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Number of unmatched pause-begin notifications.
    pub fn pause_depth(&self) -> u32 {
        self.pause_depth
    }

    /// Number of unmatched focus-lost notifications.
    pub fn focus_lost_depth(&self) -> u32 {
        self.focus_lost_depth
    }

    /// The application has input focus while no focus-lost reason is active.
    pub fn app_has_focus(&self) -> bool {
        self.focus_lost_depth == 0
    }

    /// Whole minutes accrued toward the next save attempt.
    pub fn elapsed_minutes(&self, now: Duration) -> u64 {
        self.timer.elapsed_minutes(now)
    }

    // -------------------------------------------------------------------------
    // Reconciliation
    // -------------------------------------------------------------------------

    /// Re-derive the timer and subscription state from the counters.
    ///
    /// The stopwatch's idempotent start/stop makes this safe after every
    /// event: a pause at depth 2 going to depth 1 changes nothing, while the
    /// 1→0 transition restarts (or resubscribes) exactly what the 0→1
    /// transition stopped. Invariant: the timer never runs without a city
    /// established. Under the suppress-attempts pause policy the tick
    /// subscription additionally requires pause depth 0.
    fn reconcile(&mut self, now: Duration) {
        let timer_should_run = self.attached
            && self.city_established
            && !(self.ignore_time_paused && self.pause_depth > 0);
        if timer_should_run {
            self.timer.start(now);
        } else {
            self.timer.stop(now);
        }

        self.subscribed = self.attached
            && self.city_established
            && self.focus_lost_depth == 0
            && (self.ignore_time_paused || self.pause_depth == 0);
    }
}

// =============================================================================
// Tick system
// =============================================================================

/// Per-frame tick: when a full interval has elapsed, evaluate the
/// save-attempt guard and, if it passes, issue the host save command, log
/// the outcome, and restart the interval timer.
///
/// A failing guard condition silently skips this tick's attempt and leaves
/// the timer untouched, so the attempt is retried on the next tick rather
/// than a full interval later. Runs after the event router in `Update`.
pub fn autosave_tick_system(
    time: Res<Time>,
    settings: Option<Res<AutosaveSettings>>,
    mut scheduler: ResMut<AutosaveScheduler>,
    mut host: ResMut<HostBridge>,
    mut log: ResMut<SaveLog>,
) {
    // No settings resource means activation failed; the plugin stays inert.
    let Some(settings) = settings else {
        return;
    };

    let now = time.elapsed();
    if !scheduler.due(now, settings.interval_in_minutes) {
        return;
    }

    // Save-attempt guard. Every condition must hold at fire time.
    if !scheduler.app_has_focus()
        || host.is_save_disabled()
        || host.is_simulator_paused()
        || host.is_modal_active()
    {
        return;
    }

    debug!("Autosave: saving city, fast_save={}", settings.fast_save);

    let (level, status) = if host.save_city(settings.fast_save) {
        (LogLevel::Info, "City saved.")
    } else {
        warn!("Autosave: the host's save command failed");
        (LogLevel::Error, "The game's save command failed.")
    };

    if settings.log_save_events {
        log.write_line(level, status);
    }

    scheduler.note_attempt(now);
}

// =============================================================================
// Unit Tests
// =============================================================================
