//! Sample the squelch bubble once without clicking anything.

use std::sync::Arc;

use anyhow::Context;
use autosquelch_common::config::AppConfig;
use autosquelch_engine::{get_backend, SquelchController, SquelchSettings, SquelchState};
use autosquelch_game_model::LiveGameStatus;
use autosquelch_platform_core::PixelBuffer;

pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let backend = get_backend(&config.target, config.click)?;
    let window = backend
        .target_window()
        .with_context(|| format!("no window titled {:?} found", config.target.title))?;

    let controller = SquelchController::new(
        backend,
        Arc::new(LiveGameStatus::new()),
        Arc::new(SquelchState::new()),
        SquelchSettings::from(config),
    );
    let geometry = controller
        .geometry()
        .context("failed to compute probe geometry")?;
    let buffer = controller
        .capture_probe(window, &geometry)
        .await
        .context("failed to capture the probe region")?;
    let reading = controller.classify(&buffer);

    println!(
        "Probe {}x{} at ({}, {})",
        geometry.capture.width, geometry.capture.height, geometry.probe.x, geometry.probe.y
    );
    println!("  {}", describe_buffer(&buffer));
    println!("  Lightness: {:.4}", reading.lightness);
    println!("  Threshold: {:.4}", reading.threshold);
    println!(
        "  Squelch bubble: {}",
        if reading.visible { "visible" } else { "not visible" }
    );
    Ok(())
}

/// One-line summary of a captured frame: size, layout and the centre pixel.
fn describe_buffer(buffer: &PixelBuffer) -> String {
    let centre = buffer
        .rgb_at(buffer.width() / 2, buffer.height() / 2)
        .map(|(r, g, b)| format!("#{r:02x}{g:02x}{b:02x}"))
        .unwrap_or_else(|| "n/a".to_string());
    format!(
        "Captured {} bytes, {:?}, stride {}, centre {centre}",
        buffer.as_bytes().len(),
        buffer.layout(),
        buffer.stride()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use autosquelch_platform_core::PixelLayout;

    #[test]
    fn describes_padded_frame() {
        // 2x2 RGB with each row padded to 8 bytes; the centre is (1, 1).
        let data = vec![
            0, 0, 0, 0, 0, 0, 9, 9, //
            0, 0, 0, 0xee, 0x80, 0x10,
        ];
        let buffer = PixelBuffer::new(2, 2, 8, PixelLayout::Rgb24, data).unwrap();

        assert_eq!(
            describe_buffer(&buffer),
            "Captured 14 bytes, Rgb24, stride 8, centre #ee8010"
        );
    }

    #[test]
    fn centre_of_bgra_frame_is_reported_as_rgb() {
        let buffer = PixelBuffer::filled(3, 3, PixelLayout::Bgra32, &[0x10, 0x20, 0x30, 0xff]);
        assert!(describe_buffer(&buffer).ends_with("stride 12, centre #302010"));
    }
}
