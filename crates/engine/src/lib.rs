//! Autosquelch Engine
//!
//! Runs the squelch attempt against a desktop backend:
//! - **Backend:** Window lookup, probe capture, and simulated mouse input
//! - **Controller:** The capture-classify-retry loop and its abort rules
//! - **Plugin:** Host lifecycle handlers that spawn and await attempts
//! - **State:** Per-game flags shared between the two
//!
//! ```text
//! host event ──► SquelchPlugin::on_turn_start ──► spawn attempt_squelch
//!                                                      │
//!      ┌───────────────────────────────────────────────┘
//!      ▼
//!  right-click portrait ─► wait ─► capture probe ─► lightness > threshold?
//!      ▲                                               │ no       │ yes
//!      └────────────── wait (bounded retries) ◄────────┘          ▼
//!                                                 left-click bubble, restore cursor
//! ```

pub mod backend;
pub mod controller;
pub mod plugin;
pub mod state;

pub use backend::{get_backend, DesktopBackend, MouseButton, StubBackend, XcapBackend};
pub use controller::{
    AbortReason, SquelchController, SquelchGeometry, SquelchOutcome, SquelchSettings,
};
pub use plugin::{
    HostAction, SquelchPlugin, PLUGIN_AUTHOR, PLUGIN_DESCRIPTION, PLUGIN_NAME, PLUGIN_VERSION,
};
pub use state::{ControllerState, SquelchState};
