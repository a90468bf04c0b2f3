use std::sync::Arc;

use autosquelch_common::config::TargetWindowConfig;
use autosquelch_common::error::AutosquelchResult;
use autosquelch_common::timing::ClickTiming;
use autosquelch_platform_core::{PixelBuffer, ScreenPoint, ScreenRect, WindowHandle};
use serde::{Deserialize, Serialize};

/// Logical mouse button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    /// The other button, for systems with swapped primary/secondary buttons.
    pub fn swapped(self) -> Self {
        match self {
            MouseButton::Left => MouseButton::Right,
            MouseButton::Right => MouseButton::Left,
        }
    }
}

/// OS capabilities the squelch controller needs from its host.
///
/// Points passed to `capture_region` and `click` are relative to the target
/// window's client area. Implementations convert them to screen
/// coordinates.
#[async_trait::async_trait]
pub trait DesktopBackend: Send + Sync {
    /// Backend name for logging.
    fn name(&self) -> &str;

    /// Whether the game client window currently has focus.
    fn is_target_foreground(&self) -> bool;

    /// Handle of the game client window, if one exists.
    fn target_window(&self) -> Option<WindowHandle>;

    /// Current rectangle of the game client window. With `include_borders`
    /// false this is the client area only.
    fn target_window_rect(&self, include_borders: bool) -> AutosquelchResult<ScreenRect>;

    /// Absolute cursor position.
    fn cursor_position(&self) -> AutosquelchResult<ScreenPoint>;

    /// Move the cursor to an absolute position without clicking.
    fn set_cursor_position(&self, point: ScreenPoint) -> AutosquelchResult<()>;

    /// Capture `width` x `height` pixels whose top-left corner is `origin`.
    async fn capture_region(
        &self,
        window: WindowHandle,
        origin: ScreenPoint,
        width: u32,
        height: u32,
    ) -> AutosquelchResult<PixelBuffer>;

    /// Move to `client_point` and press/release `button` using the
    /// backend's click timing.
    async fn click(
        &self,
        window: WindowHandle,
        client_point: ScreenPoint,
        button: MouseButton,
    ) -> AutosquelchResult<()>;
}

pub mod desktop;
pub mod stub;

pub use desktop::XcapBackend;
pub use stub::{BackendCall, StubBackend};

/// Get the desktop backend for the current platform.
pub fn get_backend(
    target: &TargetWindowConfig,
    timing: ClickTiming,
) -> AutosquelchResult<Arc<dyn DesktopBackend>> {
    Ok(Arc::new(XcapBackend::new(target.clone(), timing)))
}
