//! Periodic autosave plugin for Bevy city-builders.
//!
//! Watches the host's lifecycle, pause, and focus notifications
//! ([`HostEvent`]) and, once a city is established, asks the host to save it
//! every [`AutosaveSettings::interval_in_minutes`] minutes of play. The
//! embedding game implements [`SaveHost`], installs it as a [`HostBridge`]
//! resource, and forwards its notifications as `HostEvent`s; everything else
//! (the interval timer, the pause/focus depth counters, the save-attempt
//! guard, and the save log) is internal to the plugin.
//!
//! Activation is one-shot at `Startup`: the settings document is loaded and
//! validated, the save log is opened, and the scheduler is attached. A
//! configuration failure leaves the plugin loaded but inert and emits an
//! [`AutosaveError`] event for the host UI to present as a blocking dialog.

use std::path::PathBuf;

use bevy::prelude::*;

pub mod events;
pub mod host;
pub mod save_log;
pub mod scheduler;
pub mod settings;
pub mod stopwatch;

#[cfg(test)]
pub mod test_harness;

pub use events::{HostEvent, PauseSource};
pub use host::{HostBridge, NullHost, SaveHost};
pub use save_log::{LogLevel, SaveLog};
pub use scheduler::AutosaveScheduler;
pub use settings::{AutosaveSettings, ConfigError};
pub use stopwatch::Stopwatch;

// =============================================================================
// Events
// =============================================================================

/// Emitted when activation fails.
///
/// The host UI should present `message` as a blocking error dialog; the
/// plugin itself stays loaded but performs no autosaves.
#[derive(Event, Debug, Clone)]
pub struct AutosaveError {
    pub message: String,
}

// =============================================================================
// Plugin
// =============================================================================

/// Where the activation routine finds the plugin settings.
#[derive(Debug, Clone)]
pub enum SettingsSource {
    /// Load and parse the settings document at this path.
    File(PathBuf),
    /// Use an already-constructed value. Embedding games with their own
    /// options screen (and tests) skip the file this way; the interval is
    /// still validated at activation.
    Value(AutosaveSettings),
}

pub struct AutosavePlugin {
    /// Settings source consulted once at startup.
    pub settings: SettingsSource,
    /// Save-log destination, truncated at startup.
    pub log_path: PathBuf,
    /// Severity floor for save-log lines.
    pub log_level: LogLevel,
}

impl Default for AutosavePlugin {
    fn default() -> Self {
        Self {
            settings: SettingsSource::File(PathBuf::from("autosave.json")),
            log_path: PathBuf::from("autosave.log"),
            log_level: LogLevel::Info,
        }
    }
}

impl AutosavePlugin {
    /// Plugin that skips the settings file and uses `settings` directly.
    pub fn with_settings(settings: AutosaveSettings) -> Self {
        Self {
            settings: SettingsSource::Value(settings),
            ..Default::default()
        }
    }
}

impl Plugin for AutosavePlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HostEvent>()
            .add_event::<AutosaveError>()
            .init_resource::<AutosaveScheduler>()
            .init_resource::<HostBridge>()
            .init_resource::<SaveLog>()
            .insert_resource(ActivationConfig {
                settings: self.settings.clone(),
                log_path: self.log_path.clone(),
                log_level: self.log_level,
            })
            .add_systems(Startup, activate)
            .add_systems(
                Update,
                (
                    events::route_host_events,
                    scheduler::autosave_tick_system,
                    deactivate_on_exit,
                )
                    .chain(),
            );
    }
}

// =============================================================================
// Activation / deactivation
// =============================================================================

/// Activation parameters captured from the plugin at build time.
#[derive(Resource, Clone)]
struct ActivationConfig {
    settings: SettingsSource,
    log_path: PathBuf,
    log_level: LogLevel,
}

/// One-time activation: open the log, load and validate the settings,
/// install them, and attach the scheduler.
///
/// Order matters: settings must validate before the scheduler attaches, and
/// the version header is written even when activation subsequently fails.
fn activate(
    config: Res<ActivationConfig>,
    time: Res<Time>,
    mut log: ResMut<SaveLog>,
    mut scheduler: ResMut<AutosaveScheduler>,
    mut errors: EventWriter<AutosaveError>,
    mut commands: Commands,
) {
    *log = SaveLog::init(&config.log_path, config.log_level);
    log.write_header(&format!("autosave v{}", env!("CARGO_PKG_VERSION")));

    let loaded = match &config.settings {
        SettingsSource::File(path) => settings::load_settings(path),
        SettingsSource::Value(value) => Ok(value.clone()),
    };

    let settings = match loaded {
        Ok(settings) if settings.interval_in_range() => settings,
        Ok(settings) => {
            abort_activation(
                &ConfigError::IntervalOutOfRange(settings.interval_in_minutes),
                &mut log,
                &mut errors,
            );
            return;
        }
        Err(error) => {
            abort_activation(&error, &mut log, &mut errors);
            return;
        }
    };

    scheduler.attach(&settings, time.elapsed());
    info!(
        "Autosave active: every {} minute(s), fast_save={}, ignore_time_paused={}",
        settings.interval_in_minutes, settings.fast_save, settings.ignore_time_paused
    );
    commands.insert_resource(settings);
}

/// Report an activation failure and leave the plugin inert.
fn abort_activation(
    error: &ConfigError,
    log: &mut SaveLog,
    errors: &mut EventWriter<AutosaveError>,
) {
    let message = format!("Error when loading the autosave settings: {error}");
    error!("{message}");
    log.write_line(LogLevel::Error, &message);
    errors.send(AutosaveError { message });
}

/// Detaches the scheduler when the host application exits, reversing
/// exactly what activation did.
fn deactivate_on_exit(
    time: Res<Time>,
    mut exits: EventReader<AppExit>,
    mut scheduler: ResMut<AutosaveScheduler>,
) {
    if exits.read().next().is_some() {
        scheduler.detach(time.elapsed());
    }
}
