//! Autosquelch platform core contracts.
//!
//! Cross-platform window geometry and captured-pixel data structures used by
//! the analyzer, the engine, and the desktop backends without coupling to a
//! concrete OS API.

pub mod geometry;
pub mod pixel;

pub use geometry::*;
pub use pixel::*;
