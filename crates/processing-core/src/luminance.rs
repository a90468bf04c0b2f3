//! Average perceived lightness of a captured region.
//!
//! Uses the NTSC/BT.601 perceptual weighting `0.299 R + 0.587 G + 0.114 B`.
//! The squelch bubble threshold is tuned against these weights.

use autosquelch_platform_core::PixelBuffer;
use serde::{Deserialize, Serialize};

/// Default lightness above which the squelch bubble counts as visible.
pub const DEFAULT_LIGHTNESS_THRESHOLD: f64 = 0.67;

const RED_WEIGHT: f64 = 0.299;
const GREEN_WEIGHT: f64 = 0.587;
const BLUE_WEIGHT: f64 = 0.114;

/// Perceived luminance of one pixel in `[0, 255]`.
pub fn perceived_luminance(r: u8, g: u8, b: u8) -> f64 {
    RED_WEIGHT * r as f64 + GREEN_WEIGHT * g as f64 + BLUE_WEIGHT * b as f64
}

/// Mean perceived luminance of every pixel, normalized to `[0, 1]`.
///
/// Alpha is ignored. Callers must not pass an empty buffer; in release
/// builds an empty buffer yields `0.0`.
pub fn average_lightness(buffer: &PixelBuffer) -> f64 {
    debug_assert!(!buffer.is_empty(), "average_lightness on an empty buffer");
    if buffer.is_empty() {
        return 0.0;
    }

    let layout = buffer.layout();
    let bpp = buffer.bytes_per_pixel();
    let total: f64 = buffer
        .rows()
        .flat_map(|row| row.chunks_exact(bpp))
        .map(|pixel| {
            let (r, g, b) = layout.rgb(pixel);
            perceived_luminance(r, g, b)
        })
        .sum();

    total / buffer.pixel_count() as f64 / 255.0
}

/// Whether a measured lightness means the bubble is showing.
pub fn is_affordance_visible(lightness: f64, threshold: f64) -> bool {
    lightness > threshold
}

/// One classified probe measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LightnessReading {
    pub lightness: f64,
    pub threshold: f64,
    pub visible: bool,
}

impl LightnessReading {
    pub fn measure(buffer: &PixelBuffer, threshold: f64) -> Self {
        let lightness = average_lightness(buffer);
        Self {
            lightness,
            threshold,
            visible: is_affordance_visible(lightness, threshold),
        }
    }
}
