//! Autosquelch Common Utilities
//!
//! Shared infrastructure for all Autosquelch crates:
//! - Error types and result aliases
//! - Simulated click timing
//! - Tracing/logging initialization
//! - Configuration loading

pub mod config;
pub mod error;
pub mod logging;
pub mod timing;

pub use config::*;
pub use error::*;
pub use timing::*;
