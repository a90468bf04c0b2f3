//! Desktop backend built on `xcap` (windows, capture) and `enigo` (input).
//!
//! All OS calls are blocking, so they run on tokio's blocking pool. An
//! `Enigo` connection is opened per gesture and never held across an await.

use std::time::Duration;

use autosquelch_common::config::TargetWindowConfig;
use autosquelch_common::error::{AutosquelchError, AutosquelchResult};
use autosquelch_common::timing::ClickTiming;
use autosquelch_platform_core::{PixelBuffer, PixelLayout, ScreenPoint, ScreenRect, WindowHandle};
use enigo::{Coordinate, Direction, Enigo, Mouse, Settings};
use xcap::image::imageops;

use crate::backend::{DesktopBackend, MouseButton};

pub struct XcapBackend {
    target: TargetWindowConfig,
    timing: ClickTiming,
}

impl XcapBackend {
    pub fn new(target: TargetWindowConfig, timing: ClickTiming) -> Self {
        Self { target, timing }
    }

    fn find_target(&self) -> AutosquelchResult<Option<xcap::Window>> {
        find_window(&self.target)
    }
}

#[async_trait::async_trait]
impl DesktopBackend for XcapBackend {
    fn name(&self) -> &str {
        "xcap"
    }

    fn is_target_foreground(&self) -> bool {
        match self.find_target() {
            Ok(Some(window)) => window.is_focused().unwrap_or(false),
            Ok(None) => false,
            Err(e) => {
                tracing::debug!(error = %e, "Window enumeration failed");
                false
            }
        }
    }

    fn target_window(&self) -> Option<WindowHandle> {
        self.find_target()
            .ok()
            .flatten()
            .and_then(|window| window.id().ok())
            .map(WindowHandle)
    }

    fn target_window_rect(&self, include_borders: bool) -> AutosquelchResult<ScreenRect> {
        let window = self
            .find_target()?
            .ok_or_else(|| AutosquelchError::window("game window not found"))?;
        if include_borders {
            frame_rect(&window)
        } else {
            client_rect(&window)
        }
    }

    fn cursor_position(&self) -> AutosquelchResult<ScreenPoint> {
        let enigo = connect()?;
        let (x, y) = enigo
            .location()
            .map_err(|e| AutosquelchError::input(format!("cursor location: {e}")))?;
        Ok(ScreenPoint::new(x, y))
    }

    fn set_cursor_position(&self, point: ScreenPoint) -> AutosquelchResult<()> {
        let mut enigo = connect()?;
        enigo
            .move_mouse(point.x, point.y, Coordinate::Abs)
            .map_err(|e| AutosquelchError::input(format!("move cursor: {e}")))
    }

    async fn capture_region(
        &self,
        window: WindowHandle,
        origin: ScreenPoint,
        width: u32,
        height: u32,
    ) -> AutosquelchResult<PixelBuffer> {
        blocking(move || capture_window_region(window, origin, width, height)).await
    }

    async fn click(
        &self,
        window: WindowHandle,
        client_point: ScreenPoint,
        button: MouseButton,
    ) -> AutosquelchResult<()> {
        let down_up = self.timing.down_up();
        blocking(move || press_and_release(window, client_point, button, down_up)).await?;
        tokio::time::sleep(self.timing.after_up()).await;
        Ok(())
    }
}

/// Whether a window's title and app name identify the game client.
pub fn matches_target(target: &TargetWindowConfig, title: &str, app_name: &str) -> bool {
    if !title.trim().eq_ignore_ascii_case(target.title.trim()) {
        return false;
    }
    match &target.app_name {
        Some(wanted) => app_name
            .to_lowercase()
            .contains(&wanted.trim().to_lowercase()),
        None => true,
    }
}

fn find_window(target: &TargetWindowConfig) -> AutosquelchResult<Option<xcap::Window>> {
    let windows =
        xcap::Window::all().map_err(|e| AutosquelchError::window(format!("list windows: {e}")))?;

    Ok(windows.into_iter().find(|window| {
        if window.is_minimized().unwrap_or(false) {
            return false;
        }
        let title = window.title().unwrap_or_default();
        let app_name = window.app_name().unwrap_or_default();
        matches_target(target, &title, &app_name)
    }))
}

fn window_by_id(handle: WindowHandle) -> AutosquelchResult<xcap::Window> {
    let windows =
        xcap::Window::all().map_err(|e| AutosquelchError::window(format!("list windows: {e}")))?;
    windows
        .into_iter()
        .find(|window| window.id().ok() == Some(handle.id()))
        .ok_or_else(|| AutosquelchError::window(format!("window {:#x} is gone", handle.id())))
}

fn frame_rect(window: &xcap::Window) -> AutosquelchResult<ScreenRect> {
    let read = |e: xcap::XCapError| AutosquelchError::window(format!("window geometry: {e}"));
    Ok(ScreenRect::new(
        window.x().map_err(read)?,
        window.y().map_err(read)?,
        window.width().map_err(read)?,
        window.height().map_err(read)?,
    ))
}

fn client_rect(window: &xcap::Window) -> AutosquelchResult<ScreenRect> {
    let id = window
        .id()
        .map_err(|e| AutosquelchError::window(format!("window id: {e}")))?;
    match autosquelch_platform_windows::client_area(id) {
        Ok(rect) => Ok(rect),
        Err(e) => {
            tracing::trace!(error = %e, "Client area unavailable, using window frame");
            frame_rect(window)
        }
    }
}

fn capture_window_region(
    handle: WindowHandle,
    origin: ScreenPoint,
    width: u32,
    height: u32,
) -> AutosquelchResult<PixelBuffer> {
    let window = window_by_id(handle)?;
    let frame = frame_rect(&window)?;
    let client = client_rect(&window)?;

    let image = window
        .capture_image()
        .map_err(|e| AutosquelchError::capture(format!("capture window: {e}")))?;

    // The captured image covers the frame; the origin is client-relative.
    let x = client.x - frame.x + origin.x;
    let y = client.y - frame.y + origin.y;
    if x < 0
        || y < 0
        || x as u64 + width as u64 > image.width() as u64
        || y as u64 + height as u64 > image.height() as u64
    {
        return Err(AutosquelchError::capture(format!(
            "probe {width}x{height} at ({x}, {y}) lies outside the {}x{} window capture",
            image.width(),
            image.height()
        )));
    }

    let region = imageops::crop_imm(&image, x as u32, y as u32, width, height).to_image();
    PixelBuffer::packed(width, height, PixelLayout::Rgba32, region.into_raw())
}

fn press_and_release(
    handle: WindowHandle,
    client_point: ScreenPoint,
    button: MouseButton,
    down_up: Duration,
) -> AutosquelchResult<()> {
    let window = window_by_id(handle)?;
    let screen = client_rect(&window)?.client_to_screen(client_point);

    let physical = if autosquelch_platform_windows::mouse_buttons_swapped() {
        button.swapped()
    } else {
        button
    };
    let enigo_button = match physical {
        MouseButton::Left => enigo::Button::Left,
        MouseButton::Right => enigo::Button::Right,
    };

    let mut enigo = connect()?;
    let input = |e: enigo::InputError| AutosquelchError::input(format!("{button:?} click: {e}"));

    enigo
        .move_mouse(screen.x, screen.y, Coordinate::Abs)
        .map_err(input)?;
    tracing::debug!(x = screen.x, y = screen.y, ?button, "Clicking");

    enigo.button(enigo_button, Direction::Press).map_err(input)?;
    std::thread::sleep(down_up);
    enigo.button(enigo_button, Direction::Release).map_err(input)?;
    Ok(())
}

fn connect() -> AutosquelchResult<Enigo> {
    Enigo::new(&Settings::default())
        .map_err(|e| AutosquelchError::input(format!("connect input device: {e}")))
}

async fn blocking<T, F>(f: F) -> AutosquelchResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> AutosquelchResult<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| AutosquelchError::Other(anyhow::anyhow!("blocking task failed: {e}")))?
}

#[cfg(test)]
mod tests {
    use super::*;

    fn target(title: &str, app_name: Option<&str>) -> TargetWindowConfig {
        TargetWindowConfig {
            title: title.to_string(),
            app_name: app_name.map(str::to_string),
        }
    }

    #[test]
    fn title_match_is_case_insensitive() {
        let config = target("Hearthstone", None);
        assert!(matches_target(&config, "hearthstone", "Hearthstone.exe"));
        assert!(matches_target(&config, " HEARTHSTONE ", ""));
        assert!(!matches_target(&config, "Hearthstone Deck Tracker", ""));
    }

    #[test]
    fn app_name_narrows_match() {
        let config = target("Hearthstone", Some("hearthstone.exe"));
        assert!(matches_target(&config, "Hearthstone", "C:/Games/Hearthstone.exe"));
        assert!(!matches_target(&config, "Hearthstone", "firefox"));
    }
}
