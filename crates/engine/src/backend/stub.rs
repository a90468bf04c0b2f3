//! Scriptable in-memory backend for testing and dry runs.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard};

use autosquelch_common::error::{AutosquelchError, AutosquelchResult};
use autosquelch_platform_core::{PixelBuffer, PixelLayout, ScreenPoint, ScreenRect, WindowHandle};

use crate::backend::{DesktopBackend, MouseButton};

/// A recorded call into the stub.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Capture {
        window: WindowHandle,
        origin: ScreenPoint,
        width: u32,
        height: u32,
    },
    Click {
        window: WindowHandle,
        point: ScreenPoint,
        button: MouseButton,
    },
    SetCursor(ScreenPoint),
}

type CaptureHook = Box<dyn Fn(usize) + Send + Sync>;

/// Backend that serves scripted frames and records every input it is asked
/// to simulate. Captures beyond the script return a dark frame.
pub struct StubBackend {
    window: Option<WindowHandle>,
    rect: ScreenRect,
    foreground: AtomicBool,
    fail_captures: AtomicBool,
    cursor: Mutex<ScreenPoint>,
    frames: Mutex<VecDeque<PixelBuffer>>,
    calls: Mutex<Vec<BackendCall>>,
    capture_hook: Option<CaptureHook>,
}

impl StubBackend {
    /// A focused window with the given client rectangle.
    pub fn new(rect: ScreenRect) -> Self {
        Self {
            window: Some(WindowHandle(1)),
            rect,
            foreground: AtomicBool::new(true),
            fail_captures: AtomicBool::new(false),
            cursor: Mutex::new(ScreenPoint::default()),
            frames: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
            capture_hook: None,
        }
    }

    /// No game window exists.
    pub fn without_window(mut self) -> Self {
        self.window = None;
        self
    }

    pub fn with_foreground(self, foreground: bool) -> Self {
        self.foreground.store(foreground, Ordering::SeqCst);
        self
    }

    pub fn with_cursor(self, point: ScreenPoint) -> Self {
        *lock(&self.cursor) = point;
        self
    }

    /// Frames returned by successive captures, in order.
    pub fn with_frames(self, frames: impl IntoIterator<Item = PixelBuffer>) -> Self {
        lock(&self.frames).extend(frames);
        self
    }

    /// Run `hook` after each capture with the 1-based capture count.
    pub fn on_capture(mut self, hook: impl Fn(usize) + Send + Sync + 'static) -> Self {
        self.capture_hook = Some(Box::new(hook));
        self
    }

    pub fn set_foreground(&self, foreground: bool) {
        self.foreground.store(foreground, Ordering::SeqCst);
    }

    /// Make every subsequent capture fail.
    pub fn fail_captures(&self, fail: bool) {
        self.fail_captures.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.calls).clone()
    }

    pub fn capture_count(&self) -> usize {
        lock(&self.calls)
            .iter()
            .filter(|call| matches!(call, BackendCall::Capture { .. }))
            .count()
    }

    /// Client points clicked with `button`, in order.
    pub fn clicks(&self, button: MouseButton) -> Vec<ScreenPoint> {
        lock(&self.calls)
            .iter()
            .filter_map(|call| match call {
                BackendCall::Click {
                    point, button: b, ..
                } if *b == button => Some(*point),
                _ => None,
            })
            .collect()
    }

    /// Current absolute cursor position.
    pub fn cursor(&self) -> ScreenPoint {
        *lock(&self.cursor)
    }

    fn record(&self, call: BackendCall) {
        lock(&self.calls).push(call);
    }
}

/// Opaque frame bright enough to read as a visible bubble.
pub fn bright_frame(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::filled(width, height, PixelLayout::Bgra32, &[235, 235, 235, 255])
}

/// Frame of the dark portrait menu background.
pub fn dark_frame(width: u32, height: u32) -> PixelBuffer {
    PixelBuffer::filled(width, height, PixelLayout::Bgra32, &[24, 20, 18, 255])
}

#[async_trait::async_trait]
impl DesktopBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_target_foreground(&self) -> bool {
        self.window.is_some() && self.foreground.load(Ordering::SeqCst)
    }

    fn target_window(&self) -> Option<WindowHandle> {
        self.window
    }

    fn target_window_rect(&self, _include_borders: bool) -> AutosquelchResult<ScreenRect> {
        match self.window {
            Some(_) => Ok(self.rect),
            None => Err(AutosquelchError::window("game window not found")),
        }
    }

    fn cursor_position(&self) -> AutosquelchResult<ScreenPoint> {
        Ok(self.cursor())
    }

    fn set_cursor_position(&self, point: ScreenPoint) -> AutosquelchResult<()> {
        self.record(BackendCall::SetCursor(point));
        *lock(&self.cursor) = point;
        Ok(())
    }

    async fn capture_region(
        &self,
        window: WindowHandle,
        origin: ScreenPoint,
        width: u32,
        height: u32,
    ) -> AutosquelchResult<PixelBuffer> {
        self.record(BackendCall::Capture {
            window,
            origin,
            width,
            height,
        });
        let count = self.capture_count();
        if let Some(hook) = &self.capture_hook {
            hook(count);
        }

        if self.fail_captures.load(Ordering::SeqCst) {
            return Err(AutosquelchError::capture("stub capture failure"));
        }

        let frame = lock(&self.frames).pop_front();
        Ok(frame.unwrap_or_else(|| dark_frame(width, height)))
    }

    async fn click(
        &self,
        window: WindowHandle,
        client_point: ScreenPoint,
        button: MouseButton,
    ) -> AutosquelchResult<()> {
        self.record(BackendCall::Click {
            window,
            point: client_point,
            button,
        });
        *lock(&self.cursor) = self.rect.client_to_screen(client_point);
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}
