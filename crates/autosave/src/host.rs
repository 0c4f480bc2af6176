//! The narrow contract the embedding game implements for the plugin.

use bevy::prelude::*;

/// Host-side save command plus the capability queries evaluated before each
/// save attempt.
///
/// The embedding game implements this for its application object and
/// installs it with [`HostBridge::new`]. All methods are synchronous: the
/// scheduler borrows the bridge for the duration of a single tick and never
/// retains host state between ticks.
pub trait SaveHost: Send + Sync + 'static {
    /// Ask the host to save the current city. `fast` requests the save
    /// variant that skips thumbnail regeneration. Returns whether the host
    /// reported success.
    fn save_city(&mut self, fast: bool) -> bool;

    /// Whether the current city forbids saving (no city loaded, a save
    /// already in progress, or an explicit host-side save lock).
    fn is_save_disabled(&self) -> bool;

    /// Whether any simulation-level pause is active on the host side.
    fn is_simulator_paused(&self) -> bool;

    /// Whether a modal window is currently open.
    fn is_modal_active(&self) -> bool;
}

/// Resource owning the host bridge between activation and deactivation.
///
/// Dropping the resource (or the app) releases the boxed host, so the plugin
/// never outlives the application object it borrows from.
#[derive(Resource)]
pub struct HostBridge(Box<dyn SaveHost>);

impl HostBridge {
    /// Install `host` as the save target.
    pub fn new(host: impl SaveHost) -> Self {
        Self(Box::new(host))
    }

    pub fn save_city(&mut self, fast: bool) -> bool {
        self.0.save_city(fast)
    }

    pub fn is_save_disabled(&self) -> bool {
        self.0.is_save_disabled()
    }

    pub fn is_simulator_paused(&self) -> bool {
        self.0.is_simulator_paused()
    }

    pub fn is_modal_active(&self) -> bool {
        self.0.is_modal_active()
    }
}

impl Default for HostBridge {
    fn default() -> Self {
        Self::new(NullHost)
    }
}

/// Placeholder bridge used until the game installs a real one.
///
/// Reports saving as disabled, so every guard fails and no save attempt is
/// ever issued against a missing host.
pub struct NullHost;

impl SaveHost for NullHost {
    fn save_city(&mut self, _fast: bool) -> bool {
        false
    }

    fn is_save_disabled(&self) -> bool {
        true
    }

    fn is_simulator_paused(&self) -> bool {
        false
    }

    fn is_modal_active(&self) -> bool {
        false
    }
}
