//! Host notification vocabulary and the router that feeds the scheduler.

use bevy::prelude::*;

use crate::scheduler::AutosaveScheduler;
use crate::settings::AutosaveSettings;

// =============================================================================
// Event types
// =============================================================================

/// The overlapping pause reasons the host can report.
///
/// All three feed the same depth counter in the scheduler: the game counts
/// as paused while any reason is still active, and overlapping reasons are
/// never double-counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseSource {
    /// The player paused the simulation.
    Normal,
    /// The host paused behind a full-screen UI (e.g. the region view).
    Hidden,
    /// The host paused for a disaster or other emergency.
    Emergency,
}

/// A host notification, already decoded from the bus vocabulary.
///
/// The embedding game sends these as Bevy events; the router applies them to
/// the scheduler strictly in delivery order.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostEvent {
    /// The current city crossed from unestablished to established.
    CityEstablished,
    /// A city finished loading. `established` is false for a fresh city
    /// that has never been established.
    PostCityInit { established: bool },
    /// The current city is about to unload.
    PreCityShutdown,
    /// One pause source changed state.
    PauseChanged { source: PauseSource, active: bool },
    /// The application gained or lost input focus.
    FocusChanged { has_focus: bool },
}

// =============================================================================
// Raw message-bus vocabulary
// =============================================================================

// Notification codes for hosts that bridge a raw numeric message bus.
pub const MSG_CITY_ESTABLISHED: u32 = 0x26D3_1EC4;
pub const MSG_POST_CITY_INIT: u32 = 0x26D3_1EC1;
pub const MSG_PRE_CITY_SHUTDOWN: u32 = 0x26D3_1EC2;
pub const MSG_PAUSE_CHANGE: u32 = 0xAA7F_B7E0;
pub const MSG_HIDDEN_PAUSE_CHANGE: u32 = 0x4A7F_B7E2;
pub const MSG_EMERGENCY_PAUSE_CHANGE: u32 = 0x4A7F_B807;
pub const MSG_FOCUS_CHANGE: u32 = 0x26D3_1EC8;

/// Decode a raw host message into a [`HostEvent`].
///
/// `flag` carries the message's boolean payload: pause active, has focus,
/// or city established, depending on the code. Unknown codes return `None`
/// and should be dropped by the caller.
pub fn route(code: u32, flag: bool) -> Option<HostEvent> {
    match code {
        MSG_CITY_ESTABLISHED => Some(HostEvent::CityEstablished),
        MSG_POST_CITY_INIT => Some(HostEvent::PostCityInit { established: flag }),
        MSG_PRE_CITY_SHUTDOWN => Some(HostEvent::PreCityShutdown),
        MSG_PAUSE_CHANGE => Some(HostEvent::PauseChanged {
            source: PauseSource::Normal,
            active: flag,
        }),
        MSG_HIDDEN_PAUSE_CHANGE => Some(HostEvent::PauseChanged {
            source: PauseSource::Hidden,
            active: flag,
        }),
        MSG_EMERGENCY_PAUSE_CHANGE => Some(HostEvent::PauseChanged {
            source: PauseSource::Emergency,
            active: flag,
        }),
        MSG_FOCUS_CHANGE => Some(HostEvent::FocusChanged { has_focus: flag }),
        _ => None,
    }
}

/// The notification codes the plugin needs from a raw message bus.
///
/// The pause codes are only requested under the stop-the-timer pause policy;
/// in the other configuration the save-time pause guard already suppresses
/// attempts, so the pause notifications would be irrelevant traffic.
pub fn required_message_codes(settings: &AutosaveSettings) -> Vec<u32> {
    let mut codes = vec![
        MSG_CITY_ESTABLISHED,
        MSG_POST_CITY_INIT,
        MSG_PRE_CITY_SHUTDOWN,
        MSG_FOCUS_CHANGE,
    ];

    if settings.ignore_time_paused {
        codes.push(MSG_PAUSE_CHANGE);
        codes.push(MSG_HIDDEN_PAUSE_CHANGE);
        codes.push(MSG_EMERGENCY_PAUSE_CHANGE);
    }

    codes
}

// =============================================================================
// Router system
// =============================================================================

/// Applies host notifications to the scheduler in delivery order.
///
/// Runs before the tick system in `Update`, so an event and the tick that
/// follows it observe a consistent scheduler state within the same frame.
pub fn route_host_events(
    time: Res<Time>,
    mut events: EventReader<HostEvent>,
    mut scheduler: ResMut<AutosaveScheduler>,
) {
    let now = time.elapsed();
    for event in events.read() {
        match *event {
            HostEvent::CityEstablished => scheduler.on_city_established(now),
            HostEvent::PostCityInit { established } => {
                scheduler.on_post_city_init(established, now)
            }
            HostEvent::PreCityShutdown => scheduler.on_pre_city_shutdown(now),
            HostEvent::PauseChanged { active, .. } => scheduler.on_pause_changed(active, now),
            HostEvent::FocusChanged { has_focus } => scheduler.on_focus_changed(has_focus, now),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
