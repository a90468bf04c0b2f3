//! The squelch control loop.
//!
//! One attempt right-clicks the opponent portrait to open its menu, waits
//! for the menu to render, and samples the spot where the squelch bubble
//! appears. A bright sample means the bubble is there and gets clicked.
//! Every iteration re-checks that the game window is still focused and the
//! game is still squelchable, so alt-tabbing or unloading stops the loop
//! within one delay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use autosquelch_common::config::AppConfig;
use autosquelch_common::error::{AutosquelchError, AutosquelchResult};
use autosquelch_game_model::{GameMode, GameStatus};
use autosquelch_platform_core::{
    AspectRatioCorrection, CaptureRegion, NormalizedPoint, PixelBuffer, ScreenPoint, ScreenRect,
    WindowHandle,
};
use autosquelch_processing_core::LightnessReading;
use serde::{Deserialize, Serialize};

use crate::backend::{DesktopBackend, MouseButton};
use crate::state::SquelchState;

/// Tunables for one controller, usually derived from [`AppConfig`].
#[derive(Debug, Clone, PartialEq)]
pub struct SquelchSettings {
    /// Wait after each portrait click and after each miss.
    pub overlay_trigger_delay: Duration,
    pub lightness_threshold: f64,
    /// Retries after the first probe.
    pub max_retries: u32,
    pub reference_aspect_ratio: f64,
    pub portrait: NormalizedPoint,
    pub probe: NormalizedPoint,
    pub capture_width_ratio: f64,
    pub capture_height_ratio: f64,
    pub excluded_modes: Vec<GameMode>,
}

impl SquelchSettings {
    /// Probes allowed per attempt.
    pub fn max_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    pub fn is_squelchable(&self, mode: GameMode) -> bool {
        !self.excluded_modes.contains(&mode)
    }
}

impl From<&AppConfig> for SquelchSettings {
    fn from(config: &AppConfig) -> Self {
        let detection = &config.detection;
        Self {
            overlay_trigger_delay: config.overlay_trigger_delay(),
            lightness_threshold: detection.lightness_threshold,
            max_retries: detection.max_retries,
            reference_aspect_ratio: detection.reference_aspect_ratio,
            portrait: NormalizedPoint::new(detection.portrait.x, detection.portrait.y),
            probe: NormalizedPoint::new(detection.probe.x, detection.probe.y),
            capture_width_ratio: detection.capture_width_ratio,
            capture_height_ratio: detection.capture_height_ratio,
            excluded_modes: config.excluded_modes.clone(),
        }
    }
}

impl Default for SquelchSettings {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

/// Points and probe region for one window geometry. Client-relative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SquelchGeometry {
    pub rect: ScreenRect,
    pub correction: AspectRatioCorrection,
    /// Right-click target that opens the opponent menu.
    pub portrait: ScreenPoint,
    /// Where the squelch bubble appears; also the left-click target.
    pub probe: ScreenPoint,
    pub capture: CaptureRegion,
}

impl SquelchGeometry {
    pub fn compute(rect: ScreenRect, settings: &SquelchSettings) -> Self {
        let correction =
            AspectRatioCorrection::with_reference(&rect, settings.reference_aspect_ratio);
        let portrait = settings.portrait.to_client(&rect, correction);
        let probe = settings.probe.to_client(&rect, correction);
        let capture = CaptureRegion::sized_from_height(
            probe,
            &rect,
            settings.capture_width_ratio,
            settings.capture_height_ratio,
        );
        Self {
            rect,
            correction,
            portrait,
            probe,
            capture,
        }
    }
}

/// Why an attempt stopped without finishing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum AbortReason {
    NotRunning,
    DisabledByUser,
    GameNotInProgress,
    UnsupportedMode(GameMode),
    NotForeground,
    WindowUnavailable,
    /// The window was replaced while the attempt was running.
    WindowChanged,
    Backend(String),
}

impl fmt::Display for AbortReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AbortReason::NotRunning => f.write_str("plugin is not running"),
            AbortReason::DisabledByUser => f.write_str("disabled by user"),
            AbortReason::GameNotInProgress => f.write_str("no game in progress"),
            AbortReason::UnsupportedMode(mode) => write!(f, "cannot squelch in {mode} mode"),
            AbortReason::NotForeground => f.write_str("game window is not in the foreground"),
            AbortReason::WindowUnavailable => f.write_str("game window is unavailable"),
            AbortReason::WindowChanged => f.write_str("game window changed"),
            AbortReason::Backend(message) => write!(f, "backend error: {message}"),
        }
    }
}

/// Result of one squelch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SquelchOutcome {
    /// The bubble was found on probe `attempts` and clicked.
    Squelched { attempts: u32 },
    /// Every probe came back dark. The portrait menu may be left open.
    NotDetected { attempts: u32 },
    Aborted(AbortReason),
}

impl SquelchOutcome {
    pub fn is_squelched(&self) -> bool {
        matches!(self, SquelchOutcome::Squelched { .. })
    }
}

pub struct SquelchController {
    backend: Arc<dyn DesktopBackend>,
    game: Arc<dyn GameStatus>,
    state: Arc<SquelchState>,
    settings: SquelchSettings,
}

impl SquelchController {
    pub fn new(
        backend: Arc<dyn DesktopBackend>,
        game: Arc<dyn GameStatus>,
        state: Arc<SquelchState>,
        settings: SquelchSettings,
    ) -> Self {
        Self {
            backend,
            game,
            state,
            settings,
        }
    }

    pub fn state(&self) -> &Arc<SquelchState> {
        &self.state
    }

    pub fn backend(&self) -> &Arc<dyn DesktopBackend> {
        &self.backend
    }

    pub fn settings(&self) -> &SquelchSettings {
        &self.settings
    }

    /// Whether the current game mode allows squelching.
    pub fn is_squelchable_now(&self) -> bool {
        self.settings.is_squelchable(self.game.current_mode())
    }

    /// Everything that must hold before the controller touches the mouse.
    pub fn check_preconditions(&self) -> Result<WindowHandle, AbortReason> {
        if !self.state.is_running() {
            return Err(AbortReason::NotRunning);
        }
        if self.state.is_disabled() {
            return Err(AbortReason::DisabledByUser);
        }
        if !self.game.is_running() {
            return Err(AbortReason::GameNotInProgress);
        }
        let mode = self.game.current_mode();
        if !self.settings.is_squelchable(mode) {
            return Err(AbortReason::UnsupportedMode(mode));
        }
        if !self.backend.is_target_foreground() {
            return Err(AbortReason::NotForeground);
        }
        self.backend
            .target_window()
            .ok_or(AbortReason::WindowUnavailable)
    }

    /// Geometry of the game window as it is right now.
    pub fn geometry(&self) -> AutosquelchResult<SquelchGeometry> {
        let rect = self.backend.target_window_rect(false)?;
        if rect.is_empty() {
            return Err(AutosquelchError::window(format!(
                "game window has no area ({}x{})",
                rect.width, rect.height
            )));
        }
        Ok(SquelchGeometry::compute(rect, &self.settings))
    }

    /// Grab the pixels under the probe point without classifying them.
    pub async fn capture_probe(
        &self,
        window: WindowHandle,
        geometry: &SquelchGeometry,
    ) -> AutosquelchResult<PixelBuffer> {
        let region = geometry.capture;
        let buffer = self
            .backend
            .capture_region(window, region.origin, region.width, region.height)
            .await?;
        if buffer.is_empty() {
            return Err(AutosquelchError::capture("probe capture returned no pixels"));
        }
        Ok(buffer)
    }

    pub fn classify(&self, buffer: &PixelBuffer) -> LightnessReading {
        LightnessReading::measure(buffer, self.settings.lightness_threshold)
    }

    /// Capture the probe region once and classify it.
    pub async fn probe_once(
        &self,
        window: WindowHandle,
        geometry: &SquelchGeometry,
    ) -> AutosquelchResult<LightnessReading> {
        let buffer = self.capture_probe(window, geometry).await?;
        Ok(self.classify(&buffer))
    }

    /// Run one squelch attempt.
    ///
    /// The caller is expected to have claimed this game's attempt through
    /// [`SquelchState::try_begin_attempt`]. Any abort releases that claim
    /// so a later turn can try again; a detection miss keeps it.
    pub async fn attempt_squelch(&self) -> SquelchOutcome {
        let window = match self.check_preconditions() {
            Ok(window) => window,
            Err(reason) => return self.abort(reason),
        };

        let geometry = match self.geometry() {
            Ok(geometry) => geometry,
            Err(e) => return self.abort(AbortReason::Backend(e.to_string())),
        };
        tracing::debug!(
            backend = self.backend.name(),
            width = geometry.rect.width,
            height = geometry.rect.height,
            correction = geometry.correction.factor(),
            portrait = ?geometry.portrait,
            probe = ?geometry.probe,
            "Resolved squelch geometry"
        );

        let restore_to = match self.backend.cursor_position() {
            Ok(point) => Some(point),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read cursor position; it will not be restored");
                None
            }
        };

        let delay = self.settings.overlay_trigger_delay;
        let max_attempts = self.settings.max_attempts();
        let mut attempts = 0;
        let mut visible = false;

        while attempts < max_attempts {
            if let Err(reason) = self.recheck(window) {
                return self.abort(reason);
            }
            attempts += 1;

            if let Err(e) = self
                .backend
                .click(window, geometry.portrait, MouseButton::Right)
                .await
            {
                return self.backend_failure("portrait click", e);
            }
            tokio::time::sleep(delay).await;

            let reading = match self.probe_once(window, &geometry).await {
                Ok(reading) => reading,
                Err(e) => return self.backend_failure("probe capture", e),
            };
            tracing::debug!(
                attempt = attempts,
                lightness = reading.lightness,
                threshold = reading.threshold,
                visible = reading.visible,
                "Probed squelch bubble"
            );

            if reading.visible {
                visible = true;
                break;
            }
            tokio::time::sleep(delay).await;
        }

        if !visible {
            tracing::info!(attempts, "Squelch bubble not detected");
            return SquelchOutcome::NotDetected { attempts };
        }

        if let Err(reason) = self.recheck(window) {
            return self.abort(reason);
        }
        if let Err(e) = self
            .backend
            .click(window, geometry.probe, MouseButton::Left)
            .await
        {
            return self.backend_failure("squelch click", e);
        }

        if let Some(point) = restore_to {
            if let Err(e) = self.backend.set_cursor_position(point) {
                tracing::warn!(error = %e, "Could not restore cursor position");
            }
        }

        tracing::info!(attempts, "Opponent squelched");
        SquelchOutcome::Squelched { attempts }
    }

    fn recheck(&self, window: WindowHandle) -> Result<(), AbortReason> {
        match self.check_preconditions()? {
            current if current == window => Ok(()),
            _ => Err(AbortReason::WindowChanged),
        }
    }

    fn backend_failure(&self, step: &str, error: AutosquelchError) -> SquelchOutcome {
        tracing::warn!(step, error = %error, "Squelch attempt failed");
        self.abort(AbortReason::Backend(format!("{step}: {error}")))
    }

    fn abort(&self, reason: AbortReason) -> SquelchOutcome {
        self.state.clear_attempt();
        tracing::info!(%reason, "Squelch attempt aborted");
        SquelchOutcome::Aborted(reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_allow_five_probes() {
        let settings = SquelchSettings::default();
        assert_eq!(settings.max_attempts(), 5);
        assert_eq!(settings.overlay_trigger_delay, Duration::from_millis(50));
        assert!(!settings.is_squelchable(GameMode::Practice));
        assert!(settings.is_squelchable(GameMode::Casual));
    }

    #[test]
    fn geometry_for_reference_window() {
        let rect = ScreenRect::new(100, 50, 1440, 1080);
        let geometry = SquelchGeometry::compute(rect, &SquelchSettings::default());

        assert!((geometry.correction.factor() - 1.0).abs() < 1e-12);
        assert_eq!(geometry.portrait, ScreenPoint::new(720, 183));
        assert_eq!(geometry.probe.y, 108);
        assert!((geometry.probe.x - 576).abs() <= 1);
        assert_eq!(geometry.capture.origin, geometry.probe);
        assert_eq!((geometry.capture.width, geometry.capture.height), (55, 27));
    }

    #[test]
    fn geometry_on_wide_window_pulls_points_left() {
        let rect = ScreenRect::new(0, 0, 2560, 1080);
        let geometry = SquelchGeometry::compute(rect, &SquelchSettings::default());

        assert!(geometry.correction.factor() < 1.0);
        assert!(geometry.portrait.x < 1280);
        assert!(geometry.probe.x < 1024);
        assert_eq!((geometry.capture.width, geometry.capture.height), (55, 27));
    }

    #[test]
    fn abort_reason_messages() {
        assert_eq!(
            AbortReason::UnsupportedMode(GameMode::Battlegrounds).to_string(),
            "cannot squelch in battlegrounds mode"
        );
        assert_eq!(
            AbortReason::NotForeground.to_string(),
            "game window is not in the foreground"
        );
    }
}
