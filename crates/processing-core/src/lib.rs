//! Autosquelch Processing Core
//!
//! Classifies the captured probe region:
//! - **Luminance:** Average perceived lightness of a pixel buffer
//! - **Classification:** Threshold test for the squelch bubble
//!
//! This crate is pure computation with no I/O and no platform dependencies.
//! All inputs are data; all outputs are data.

pub mod luminance;

pub use luminance::{average_lightness, is_affordance_visible, LightnessReading};
