//! # TestHost: headless harness for driving the plugin in tests.
//!
//! Wraps `bevy::app::App` + `MinimalPlugins` + [`AutosavePlugin`] with a
//! scripted [`SaveHost`] installed, advances virtual time in simulated
//! minutes, and sends host notifications, so scenario tests can run a city
//! session without a window or a real game.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bevy::prelude::*;

use crate::events::{HostEvent, PauseSource};
use crate::host::{HostBridge, SaveHost};
use crate::scheduler::AutosaveScheduler;
use crate::settings::AutosaveSettings;
use crate::{AutosaveError, AutosavePlugin};

static HARNESS_ID: AtomicUsize = AtomicUsize::new(0);

// =============================================================================
// Scripted host
// =============================================================================

#[derive(Debug)]
struct ScriptedHostState {
    /// The `fast` flag of every save call issued so far.
    save_calls: Vec<bool>,
    save_result: bool,
    save_disabled: bool,
    simulator_paused: bool,
    modal_active: bool,
}

impl Default for ScriptedHostState {
    fn default() -> Self {
        Self {
            save_calls: Vec::new(),
            save_result: true,
            save_disabled: false,
            simulator_paused: false,
            modal_active: false,
        }
    }
}

/// Scripted [`SaveHost`] that records every save call.
///
/// Clones share state, so a test keeps one handle while the app owns the
/// other and can reconfigure the host mid-scenario.
#[derive(Clone, Default)]
pub struct ScriptedHost {
    state: Arc<Mutex<ScriptedHostState>>,
}

impl ScriptedHost {
    /// Number of save commands issued so far.
    pub fn save_attempts(&self) -> usize {
        self.state.lock().unwrap().save_calls.len()
    }

    /// The `fast` flag of the most recent save command.
    pub fn last_fast_flag(&self) -> Option<bool> {
        self.state.lock().unwrap().save_calls.last().copied()
    }

    /// Script the result the next save commands will report.
    pub fn set_save_result(&self, ok: bool) {
        self.state.lock().unwrap().save_result = ok;
    }

    pub fn set_save_disabled(&self, disabled: bool) {
        self.state.lock().unwrap().save_disabled = disabled;
    }

    pub fn set_simulator_paused(&self, paused: bool) {
        self.state.lock().unwrap().simulator_paused = paused;
    }

    pub fn set_modal_active(&self, modal: bool) {
        self.state.lock().unwrap().modal_active = modal;
    }
}

impl SaveHost for ScriptedHost {
    fn save_city(&mut self, fast: bool) -> bool {
        let mut state = self.state.lock().unwrap();
        state.save_calls.push(fast);
        state.save_result
    }

    fn is_save_disabled(&self) -> bool {
        self.state.lock().unwrap().save_disabled
    }

    fn is_simulator_paused(&self) -> bool {
        self.state.lock().unwrap().simulator_paused
    }

    fn is_modal_active(&self) -> bool {
        self.state.lock().unwrap().modal_active
    }
}

// =============================================================================
// Harness
// =============================================================================

/// A headless Bevy App wrapping [`AutosavePlugin`] for integration testing.
pub struct TestHost {
    app: App,
    host: ScriptedHost,
}

impl TestHost {
    /// Harness activated with the given settings and a scripted host.
    pub fn new(settings: AutosaveSettings) -> Self {
        Self::with_plugin(AutosavePlugin::with_settings(settings))
    }

    /// Harness with full control over the plugin's construction. The save
    /// log is redirected to a per-harness temp file unless the caller
    /// already moved it off the default path.
    pub fn with_plugin(mut plugin: AutosavePlugin) -> Self {
        if plugin.log_path == AutosavePlugin::default().log_path {
            plugin.log_path = std::env::temp_dir().join(format!(
                "autosave_harness_{}_{}.log",
                std::process::id(),
                HARNESS_ID.fetch_add(1, Ordering::Relaxed)
            ));
        }

        let host = ScriptedHost::default();

        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.add_plugins(plugin);
        app.insert_resource(HostBridge::new(host.clone()));

        // Run one update so Startup activation executes.
        app.update();

        Self { app, host }
    }

    // -------------------------------------------------------------------------
    // Driving
    // -------------------------------------------------------------------------

    /// Send one host notification and run an update so the router applies it.
    pub fn send(&mut self, event: HostEvent) {
        self.app.world_mut().send_event(event);
        self.app.update();
    }

    pub fn establish_city(&mut self) {
        self.send(HostEvent::CityEstablished);
    }

    pub fn shutdown_city(&mut self) {
        self.send(HostEvent::PreCityShutdown);
    }

    pub fn pause(&mut self, source: PauseSource, active: bool) {
        self.send(HostEvent::PauseChanged { source, active });
    }

    pub fn focus(&mut self, has_focus: bool) {
        self.send(HostEvent::FocusChanged { has_focus });
    }

    /// Advance virtual time and run a single update (one idle tick).
    pub fn advance(&mut self, dt: Duration) {
        self.app
            .world_mut()
            .resource_mut::<Time<Virtual>>()
            .advance_by(dt);
        self.app.update();
    }

    /// Advance `n` simulated minutes, one idle tick per minute.
    pub fn tick_minutes(&mut self, n: u64) {
        for _ in 0..n {
            self.advance(Duration::from_secs(60));
        }
    }

    /// Signal application exit and run an update so deactivation executes.
    pub fn exit(&mut self) {
        self.app.world_mut().send_event(AppExit::Success);
        self.app.update();
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    pub fn scheduler(&self) -> &AutosaveScheduler {
        self.app.world().resource::<AutosaveScheduler>()
    }

    /// Installed settings, or `None` when activation failed.
    pub fn settings(&self) -> Option<&AutosaveSettings> {
        self.app.world().get_resource::<AutosaveSettings>()
    }

    /// Handle to the scripted host shared with the app.
    pub fn host(&self) -> &ScriptedHost {
        &self.host
    }

    pub fn save_attempts(&self) -> usize {
        self.host.save_attempts()
    }

    /// Whole minutes currently accrued toward the next save attempt.
    pub fn elapsed_minutes(&self) -> u64 {
        let now = self.app.world().resource::<Time>().elapsed();
        self.scheduler().elapsed_minutes(now)
    }

    /// Drain and return the activation errors emitted so far.
    pub fn drain_errors(&mut self) -> Vec<String> {
        self.app
            .world_mut()
            .resource_mut::<Events<AutosaveError>>()
            .drain()
            .map(|e| e.message)
            .collect()
    }
}
