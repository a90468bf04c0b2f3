//! Application configuration.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use autosquelch_game_model::GameMode;
use serde::{Deserialize, Serialize};

use crate::error::{AutosquelchError, AutosquelchResult};
use crate::timing::ClickTiming;

/// Global application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Delay used to let the portrait menu render before and after a probe (ms).
    pub overlay_trigger_delay_ms: u64,

    /// How the game client window is recognised.
    pub target: TargetWindowConfig,

    /// Coordinates and thresholds for the squelch probe.
    pub detection: DetectionConfig,

    /// Simulated click timing.
    pub click: ClickTiming,

    /// Game modes in which the opponent can't be squelched.
    pub excluded_modes: Vec<GameMode>,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Identifies the game client's top-level window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetWindowConfig {
    /// Window title, matched case-insensitively.
    pub title: String,

    /// Optional application/process name, matched case-insensitively as a substring.
    pub app_name: Option<String>,
}

/// A point expressed as fractions of the window size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnchorConfig {
    pub x: f64,
    pub y: f64,
}

/// Detection parameters. Defaults are tuned for the game's 4:3 layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionConfig {
    /// Average lightness above which the squelch bubble counts as visible.
    pub lightness_threshold: f64,

    /// Retries after the first probe.
    pub max_retries: u32,

    /// Aspect ratio the game UI is authored for.
    pub reference_aspect_ratio: f64,

    /// Opponent portrait (right-click target).
    pub portrait: AnchorConfig,

    /// Squelch bubble (probe and left-click target).
    pub probe: AnchorConfig,

    /// Capture width as a fraction of window height.
    pub capture_width_ratio: f64,

    /// Capture height as a fraction of window height.
    pub capture_height_ratio: f64,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "autosquelch_engine=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            overlay_trigger_delay_ms: 50,
            target: TargetWindowConfig::default(),
            detection: DetectionConfig::default(),
            click: ClickTiming::default(),
            excluded_modes: vec![
                GameMode::None,
                GameMode::Practice,
                GameMode::Battlegrounds,
                GameMode::Spectator,
            ],
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for TargetWindowConfig {
    fn default() -> Self {
        Self {
            title: "Hearthstone".to_string(),
            app_name: None,
        }
    }
}

impl Default for DetectionConfig {
    fn default() -> Self {
        Self {
            lightness_threshold: 0.67,
            max_retries: 4,
            reference_aspect_ratio: 4.0 / 3.0,
            portrait: AnchorConfig { x: 0.5, y: 0.17 },
            probe: AnchorConfig { x: 0.4, y: 0.10 },
            // 55px @ height = 1080
            capture_width_ratio: 0.051,
            // 27px @ height = 1080
            capture_height_ratio: 0.025,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            file: None,
        }
    }
}

impl AppConfig {
    /// Load config from the standard location, falling back to defaults.
    pub fn load() -> Self {
        Self::load_from(&config_file_path())
    }

    /// Load config from an explicit path, falling back to defaults.
    pub fn load_from(config_path: &Path) -> Self {
        if config_path.exists() {
            match std::fs::read_to_string(config_path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse config at {:?}: {}", config_path, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<PathBuf, std::io::Error> {
        let config_path = config_file_path();
        self.save_to(&config_path)?;
        Ok(config_path)
    }

    /// Save config to an explicit path.
    pub fn save_to(&self, config_path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// The overlay trigger delay as a duration.
    pub fn overlay_trigger_delay(&self) -> Duration {
        Duration::from_millis(self.overlay_trigger_delay_ms)
    }

    /// Reject values the controller cannot work with.
    pub fn validate(&self) -> AutosquelchResult<()> {
        let detection = &self.detection;
        if !(0.0..1.0).contains(&detection.lightness_threshold) {
            return Err(AutosquelchError::config(format!(
                "detection.lightness_threshold must be in [0, 1), got {}",
                detection.lightness_threshold
            )));
        }
        if !detection.reference_aspect_ratio.is_finite() || detection.reference_aspect_ratio <= 0.0 {
            return Err(AutosquelchError::config(
                "detection.reference_aspect_ratio must be positive",
            ));
        }
        for (name, anchor) in [("portrait", detection.portrait), ("probe", detection.probe)] {
            if !(0.0..=1.0).contains(&anchor.x) || !(0.0..=1.0).contains(&anchor.y) {
                return Err(AutosquelchError::config(format!(
                    "detection.{name} must lie within the window, got ({}, {})",
                    anchor.x, anchor.y
                )));
            }
        }
        if detection.capture_width_ratio <= 0.0 || detection.capture_height_ratio <= 0.0 {
            return Err(AutosquelchError::config(
                "detection capture ratios must be positive",
            ));
        }
        Ok(())
    }
}

/// Standard config file location.
///
/// `%APPDATA%\autosquelch\config.json` on Windows,
/// `$XDG_CONFIG_HOME/autosquelch/config.json` or `~/.config/...` elsewhere.
pub fn config_file_path() -> PathBuf {
    config_dir_from(|name| std::env::var_os(name), cfg!(target_os = "windows"))
        .join("autosquelch")
        .join("config.json")
}

fn config_dir_from(var: impl Fn(&str) -> Option<OsString>, windows: bool) -> PathBuf {
    let non_empty = |name: &str| var(name).filter(|value| !value.is_empty()).map(PathBuf::from);

    if windows {
        if let Some(appdata) = non_empty("APPDATA") {
            return appdata;
        }
    }
    if let Some(xdg) = non_empty("XDG_CONFIG_HOME") {
        return xdg;
    }
    let home = if windows {
        non_empty("USERPROFILE").or_else(|| non_empty("HOME"))
    } else {
        non_empty("HOME")
    };
    match home {
        Some(home) => home.join(".config"),
        None => std::env::temp_dir().join(".config"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_excludes_unsquelchable_modes() {
        let config = AppConfig::default();
        assert_eq!(
            config.excluded_modes,
            vec![
                GameMode::None,
                GameMode::Practice,
                GameMode::Battlegrounds,
                GameMode::Spectator,
            ]
        );
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_out_of_range_values() {
        let mut config = AppConfig::default();
        config.detection.lightness_threshold = 1.5;
        assert!(matches!(
            config.validate(),
            Err(AutosquelchError::Config { .. })
        ));

        let mut config = AppConfig::default();
        config.detection.probe.y = -0.1;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("detection.probe"));

        let mut config = AppConfig::default();
        config.detection.capture_height_ratio = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_json_fills_missing_fields_with_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"overlay_trigger_delay_ms": 120, "detection": {"max_retries": 2}}"#)
                .unwrap();
        assert_eq!(config.overlay_trigger_delay(), Duration::from_millis(120));
        assert_eq!(config.detection.max_retries, 2);
        assert!((config.detection.lightness_threshold - 0.67).abs() < 1e-12);
        assert_eq!(config.click, ClickTiming::default());
        assert_eq!(config.target.title, "Hearthstone");
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let vars: Vec<(String, OsString)> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect();
        move |name: &str| {
            vars.iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        }
    }

    #[test]
    fn windows_config_lives_under_appdata() {
        let dir = config_dir_from(
            env(&[("APPDATA", r"C:\Users\me\AppData\Roaming")]),
            true,
        );
        assert_eq!(dir, PathBuf::from(r"C:\Users\me\AppData\Roaming"));

        let dir = config_dir_from(
            env(&[("APPDATA", ""), ("USERPROFILE", r"C:\Users\me")]),
            true,
        );
        assert_eq!(dir, PathBuf::from(r"C:\Users\me").join(".config"));
    }

    #[test]
    fn unix_config_prefers_xdg_then_home() {
        let vars = [
            ("XDG_CONFIG_HOME", "/xdg"),
            ("HOME", "/home/me"),
            ("APPDATA", "/ignored"),
        ];
        let dir = config_dir_from(env(&vars), false);
        assert_eq!(dir, PathBuf::from("/xdg"));

        let dir = config_dir_from(env(&[("HOME", "/home/me"), ("APPDATA", "/ignored")]), false);
        assert_eq!(dir, PathBuf::from("/home/me/.config"));
    }

    #[test]
    fn missing_home_falls_back_to_temp_dir() {
        assert_eq!(
            config_dir_from(env(&[]), false),
            std::env::temp_dir().join(".config")
        );
    }

    #[test]
    fn load_from_missing_path_uses_defaults() {
        let path = std::env::temp_dir().join("autosquelch-missing-config-does-not-exist.json");
        assert_eq!(AppConfig::load_from(&path), AppConfig::default());
    }

    #[test]
    fn save_then_load_preserves_values() {
        let dir = std::env::temp_dir().join(format!("autosquelch-config-{}", std::process::id()));
        let path = dir.join("config.json");

        let mut config = AppConfig::default();
        config.overlay_trigger_delay_ms = 75;
        config.excluded_modes.push(GameMode::Duels);
        config.save_to(&path).unwrap();

        let loaded = AppConfig::load_from(&path);
        assert_eq!(loaded, config);

        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn malformed_file_falls_back_to_defaults() {
        let dir = std::env::temp_dir().join(format!("autosquelch-bad-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert_eq!(AppConfig::load_from(&path), AppConfig::default());

        std::fs::remove_dir_all(dir).ok();
    }
}
