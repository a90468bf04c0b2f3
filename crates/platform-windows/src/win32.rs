use autosquelch_common::error::{AutosquelchError, AutosquelchResult};
use autosquelch_platform_core::ScreenRect;
use windows_sys::Win32::Foundation::{HWND, POINT, RECT};
use windows_sys::Win32::Graphics::Gdi::ClientToScreen;
use windows_sys::Win32::UI::WindowsAndMessaging::{GetClientRect, GetSystemMetrics, SM_SWAPBUTTON};

pub(crate) fn mouse_buttons_swapped() -> bool {
    // SAFETY: GetSystemMetrics has no preconditions.
    unsafe { GetSystemMetrics(SM_SWAPBUTTON) != 0 }
}

pub(crate) fn client_area(window_id: u32) -> AutosquelchResult<ScreenRect> {
    let hwnd = window_id as usize as HWND;
    let mut rect = RECT {
        left: 0,
        top: 0,
        right: 0,
        bottom: 0,
    };
    let mut origin = POINT { x: 0, y: 0 };

    // SAFETY: both out-pointers reference live stack values; an invalid
    // handle makes the calls fail rather than write.
    let ok = unsafe {
        GetClientRect(hwnd, &mut rect) != 0 && ClientToScreen(hwnd, &mut origin) != 0
    };
    if !ok {
        return Err(AutosquelchError::window(format!(
            "GetClientRect/ClientToScreen failed for window {window_id:#x}"
        )));
    }

    Ok(ScreenRect::new(
        origin.x,
        origin.y,
        (rect.right - rect.left).max(0) as u32,
        (rect.bottom - rect.top).max(0) as u32,
    ))
}
