//! Autosquelch Game Model
//!
//! Data contracts between the game host and the squelch controller:
//! - **Modes:** Which kind of match is being played
//! - **Events:** Host lifecycle and game signals as an append-only JSONL feed
//! - **Status:** The queries the controller makes about the running game

pub mod event;
pub mod mode;
pub mod status;

pub use event::*;
pub use mode::*;
pub use status::*;
