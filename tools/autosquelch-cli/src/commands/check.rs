//! Report the game window and the click geometry derived from it.

use anyhow::Context;
use autosquelch_common::config::AppConfig;
use autosquelch_engine::{get_backend, SquelchGeometry, SquelchSettings};
use autosquelch_platform_core::{ScreenPoint, ScreenRect, REFERENCE_ASPECT_RATIO};

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    println!("Autosquelch Window Check");
    println!("{}", "=".repeat(50));

    let backend = get_backend(&config.target, config.click)?;
    println!("[OK] Backend: {}", backend.name());

    let Some(window) = backend.target_window() else {
        println!("[FAIL] No window titled {:?} found", config.target.title);
        println!();
        println!("Start the game, or set target.title in the configuration.");
        return Ok(());
    };
    println!("[OK] Game window: {:#x}", window.id());

    if backend.is_target_foreground() {
        println!("[OK] Game window is in the foreground");
    } else {
        println!("[WARN] Game window is not in the foreground; squelching waits for focus");
    }

    let rect = backend
        .target_window_rect(false)
        .context("failed to read the game window's client area")?;
    let settings = SquelchSettings::from(config);
    let geometry = SquelchGeometry::compute(rect, &settings);
    let portrait = rect.client_to_screen(geometry.portrait);
    let probe = rect.client_to_screen(geometry.probe);

    println!();
    println!("Geometry:");
    println!(
        "  Client area: {}x{} at ({}, {})",
        rect.width, rect.height, rect.x, rect.y
    );
    println!(
        "  Aspect ratio: {:.4} (correction {:.4})",
        rect.aspect_ratio(),
        geometry.correction.factor()
    );
    println!(
        "  Portrait: ({}, {}) client, ({}, {}) screen",
        geometry.portrait.x, geometry.portrait.y, portrait.x, portrait.y
    );
    println!(
        "  Probe: ({}, {}) client, ({}, {}) screen",
        geometry.probe.x, geometry.probe.y, probe.x, probe.y
    );
    println!(
        "  Capture region: {}x{} ({} px)",
        geometry.capture.width,
        geometry.capture.height,
        geometry.capture.area()
    );

    if (settings.reference_aspect_ratio - REFERENCE_ASPECT_RATIO).abs() > 1e-6 {
        println!(
            "[WARN] Reference aspect ratio {:.4} differs from the game's 4:3 layout",
            settings.reference_aspect_ratio
        );
    }
    match backend.cursor_position() {
        Ok(cursor) => println!("  {}", describe_cursor(&rect, cursor)),
        Err(e) => println!("[WARN] Could not read the cursor position: {e}"),
    }
    println!();
    println!("Timing:");
    println!(
        "  Click: {}ms hold, {}ms settle ({}ms total)",
        config.click.down_up_ms,
        config.click.after_up_ms,
        config.click.total().as_millis()
    );
    println!(
        "  Overlay delay: {}ms, up to {} probes",
        settings.overlay_trigger_delay.as_millis(),
        settings.max_attempts()
    );

    Ok(())
}

/// Where the cursor sits relative to the client area.
fn describe_cursor(rect: &ScreenRect, cursor: ScreenPoint) -> String {
    if rect.contains(cursor) {
        let client = rect.screen_to_client(cursor);
        format!(
            "Cursor: ({}, {}) client, inside the game window",
            client.x, client.y
        )
    } else {
        format!(
            "Cursor: ({}, {}) screen, outside the game window",
            cursor.x, cursor.y
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_inside_window_is_client_relative() {
        let rect = ScreenRect::new(-1920, 40, 1920, 1080);
        assert_eq!(
            describe_cursor(&rect, ScreenPoint::new(-1820, 240)),
            "Cursor: (100, 200) client, inside the game window"
        );
    }

    #[test]
    fn cursor_on_far_edge_is_outside() {
        let rect = ScreenRect::new(0, 0, 1024, 768);
        assert_eq!(
            describe_cursor(&rect, ScreenPoint::new(1024, 10)),
            "Cursor: (1024, 10) screen, outside the game window"
        );
    }
}
