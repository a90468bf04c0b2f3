//! Windows platform integration.
//!
//! Win32 primitives the cross-platform desktop backend can't get from
//! `xcap`/`enigo`: the client area of a window (excluding borders and
//! title bar) and whether the user swapped the primary mouse button.
//! On other platforms these report "unsupported" / "not swapped".

use autosquelch_common::error::AutosquelchResult;
use autosquelch_platform_core::ScreenRect;

#[cfg(target_os = "windows")]
mod win32;

/// Whether the primary and secondary mouse buttons are swapped.
///
/// Injected button events are physical, so callers invert left/right when
/// this is true to keep the logical button the user expects.
pub fn mouse_buttons_swapped() -> bool {
    #[cfg(target_os = "windows")]
    {
        win32::mouse_buttons_swapped()
    }
    #[cfg(not(target_os = "windows"))]
    {
        false
    }
}

/// Client area of the window with the given id, in screen coordinates.
pub fn client_area(window_id: u32) -> AutosquelchResult<ScreenRect> {
    #[cfg(target_os = "windows")]
    {
        win32::client_area(window_id)
    }
    #[cfg(not(target_os = "windows"))]
    {
        tracing::trace!(window_id, "Client-area lookup requested off Windows");
        Err(autosquelch_common::error::AutosquelchError::unsupported(
            "client-area lookup is only available on Windows",
        ))
    }
}

#[cfg(all(test, not(target_os = "windows")))]
mod tests {
    use super::*;

    #[test]
    fn non_windows_reports_unswapped_and_unsupported() {
        assert!(!mouse_buttons_swapped());
        assert!(client_area(42).is_err());
    }
}
