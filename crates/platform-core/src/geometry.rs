//! Window geometry and resolution-independent anchors.
//!
//! The game UI is laid out for a 4:3-equivalent canvas and stretches
//! horizontally on other aspect ratios, so horizontal anchors are rescaled
//! by [`AspectRatioCorrection`] while vertical anchors scale linearly.

use serde::{Deserialize, Serialize};

/// Aspect ratio the game UI is authored for.
pub const REFERENCE_ASPECT_RATIO: f64 = 4.0 / 3.0;

/// Opaque identifier of a top-level window, owned by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowHandle(pub u32);

impl WindowHandle {
    pub fn id(&self) -> u32 {
        self.0
    }
}

/// A pixel position. Client-relative or absolute depending on context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A window's client area in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Width over height.
    pub fn aspect_ratio(&self) -> f64 {
        self.width.max(1) as f64 / self.height.max(1) as f64
    }

    /// Translate a client-relative point to absolute screen coordinates.
    pub fn client_to_screen(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: self.x + point.x,
            y: self.y + point.y,
        }
    }

    /// Translate an absolute screen point into this rect's client space.
    pub fn screen_to_client(&self, point: ScreenPoint) -> ScreenPoint {
        ScreenPoint {
            x: point.x - self.x,
            y: point.y - self.y,
        }
    }

    pub fn contains(&self, point: ScreenPoint) -> bool {
        point.x >= self.x
            && point.y >= self.y
            && ((point.x - self.x) as i64) < self.width as i64
            && ((point.y - self.y) as i64) < self.height as i64
    }
}

/// Horizontal rescale factor: `reference_ratio / (width / height)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectRatioCorrection(f64);

impl AspectRatioCorrection {
    pub fn with_reference(rect: &ScreenRect, reference_ratio: f64) -> Self {
        Self(reference_ratio / rect.aspect_ratio())
    }

    pub fn factor(&self) -> f64 {
        self.0
    }
}

/// A point given as fractions of the window width and height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalizedPoint {
    pub x: f64,
    pub y: f64,
}

impl NormalizedPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Unrounded client X after horizontal correction.
    pub fn scaled_x(&self, rect: &ScreenRect, correction: AspectRatioCorrection) -> f64 {
        rect.width as f64 * self.x * correction.factor()
    }

    /// Unrounded client Y. Vertical positions are not corrected.
    pub fn scaled_y(&self, rect: &ScreenRect) -> f64 {
        rect.height as f64 * self.y
    }

    /// Client-relative pixel position inside `rect`.
    pub fn to_client(&self, rect: &ScreenRect, correction: AspectRatioCorrection) -> ScreenPoint {
        ScreenPoint {
            x: self.scaled_x(rect, correction) as i32,
            y: self.scaled_y(rect) as i32,
        }
    }
}

/// Region to capture, anchored at its top-left corner in client space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub origin: ScreenPoint,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    /// Size a region from the window *height* only, so it covers the same
    /// UI element at every width.
    pub fn sized_from_height(
        origin: ScreenPoint,
        rect: &ScreenRect,
        width_ratio: f64,
        height_ratio: f64,
    ) -> Self {
        let height = rect.height as f64;
        Self {
            origin,
            width: ((height * width_ratio).round() as u32).max(1),
            height: ((height * height_ratio).round() as u32).max(1),
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn reference_window_has_unit_correction() {
        let rect = ScreenRect::new(0, 0, 1440, 1080);
        let correction = AspectRatioCorrection::with_reference(&rect, REFERENCE_ASPECT_RATIO);
        assert!((correction.factor() - 1.0).abs() < 1e-12);

        let portrait = NormalizedPoint::new(0.5, 0.17).to_client(&rect, correction);
        assert_eq!(portrait, ScreenPoint::new(720, 183));
    }

    #[test]
    fn wide_window_compresses_horizontal_anchor() {
        let rect = ScreenRect::new(0, 0, 1920, 1080);
        let correction = AspectRatioCorrection::with_reference(&rect, REFERENCE_ASPECT_RATIO);
        assert!((correction.factor() - 0.75).abs() < 1e-12);

        let probe = NormalizedPoint::new(0.4, 0.10);
        assert!(probe.scaled_x(&rect, correction) < 1920.0 * 0.4);
        let client = probe.to_client(&rect, correction);
        assert!((client.x - 576).abs() <= 1, "x = {}", client.x);
        assert_eq!(client.y, 108);
    }

    #[test]
    fn capture_region_tracks_height_not_width() {
        let narrow = ScreenRect::new(0, 0, 1440, 1080);
        let wide = ScreenRect::new(0, 0, 2560, 1080);
        let origin = ScreenPoint::new(10, 10);

        let a = CaptureRegion::sized_from_height(origin, &narrow, 0.051, 0.025);
        let b = CaptureRegion::sized_from_height(origin, &wide, 0.051, 0.025);
        assert_eq!((a.width, a.height), (55, 27));
        assert_eq!(a, b);
    }

    #[test]
    fn capture_region_is_never_empty() {
        let tiny = ScreenRect::new(0, 0, 8, 6);
        let region = CaptureRegion::sized_from_height(ScreenPoint::default(), &tiny, 0.051, 0.025);
        assert_eq!((region.width, region.height), (1, 1));
        assert_eq!(region.area(), 1);
    }

    #[test]
    fn client_to_screen_offsets_by_origin() {
        let rect = ScreenRect::new(-1920, 40, 1920, 1080);
        let screen = rect.client_to_screen(ScreenPoint::new(100, 200));
        assert_eq!(screen, ScreenPoint::new(-1820, 240));
        assert_eq!(rect.screen_to_client(screen), ScreenPoint::new(100, 200));
        assert!(rect.contains(screen));
        assert!(!rect.contains(ScreenPoint::new(0, 40)));
    }

    #[test]
    fn degenerate_rect_does_not_divide_by_zero() {
        let rect = ScreenRect::new(0, 0, 0, 0);
        assert!(rect.is_empty());
        assert!(AspectRatioCorrection::with_reference(&rect, REFERENCE_ASPECT_RATIO).factor().is_finite());
    }

    proptest! {
        #[test]
        fn wider_than_reference_always_moves_left(
            height in 200u32..2200,
            extra in 0.02f64..2.0,
            fx in 0.01f64..1.0,
            fy in 0.0f64..1.0,
        ) {
            let width = (height as f64 * (REFERENCE_ASPECT_RATIO + extra)).round() as u32;
            let rect = ScreenRect::new(0, 0, width, height);
            let correction = AspectRatioCorrection::with_reference(&rect, REFERENCE_ASPECT_RATIO);
            let point = NormalizedPoint::new(fx, fy);

            prop_assert!(correction.factor() < 1.0);
            prop_assert!(point.scaled_x(&rect, correction) < width as f64 * fx);
            prop_assert!((point.scaled_y(&rect) - height as f64 * fy).abs() < 1e-9);
        }
    }
}
