//! Application configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{QuadcamError, QuadcamResult};

/// Global application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding the project store (`projects.json`).
    pub data_dir: PathBuf,

    /// Server-accessible media root used to resolve feed filenames.
    pub media_dir: PathBuf,

    /// Directory where exported clips are written.
    pub exports_dir: PathBuf,

    /// Playback scheduling parameters.
    pub playback: PlaybackDefaults,

    /// Telemetry extraction settings.
    pub telemetry: TelemetryConfig,

    /// Overlay export settings.
    pub export: ExportSettings,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Playback scheduling parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackDefaults {
    /// Wall-clock period of the timeline tick. Each tick advances logical
    /// time by the same amount.
    pub tick_interval_ms: u64,

    /// Period of the per-frame drift correction pass.
    pub frame_interval_ms: u64,

    /// Drift (seconds) above which a feed is hard-seeked back to target.
    pub drift_threshold_secs: f64,

    /// Skip back/forward step in seconds.
    pub skip_secs: f64,

    /// Whether manual scrubbing pauses playback.
    pub pause_on_scrub: bool,
}

/// Telemetry extraction settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Program that prints a telemetry table (CSV) for a video file.
    /// When unset, synthetic telemetry is always used.
    pub extractor_command: Option<String>,

    /// Arguments placed before the file path.
    pub extractor_args: Vec<String>,
}

/// Overlay export settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// ffmpeg binary to invoke.
    pub ffmpeg_path: String,

    /// Length of the burned clip in seconds.
    pub clip_secs: f64,

    /// Prefix joined with the output file name to form the returned URL.
    pub url_prefix: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "quadcam=debug,warn").
    pub level: String,

    /// Whether to output structured JSON logs.
    pub json: bool,

    /// Optional log file path.
    pub file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            media_dir: data_dir.join("media"),
            exports_dir: data_dir.join("exports"),
            data_dir,
            playback: PlaybackDefaults::default(),
            telemetry: TelemetryConfig::default(),
            export: ExportSettings::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for PlaybackDefaults {
    fn default() -> Self {
        Self {
            tick_interval_ms: 100,
            frame_interval_ms: 33,
            drift_threshold_secs: 0.3,
            skip_secs: 5.0,
            pause_on_scrub: true,
        }
    }
}

impl PlaybackDefaults {
    /// Logical seconds added per timeline tick.
    pub fn tick_step_secs(&self) -> f64 {
        self.tick_interval_ms as f64 / 1000.0
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            ffmpeg_path: "ffmpeg".to_string(),
            clip_secs: 10.0,
            url_prefix: "/exports".to_string(),
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
            match Self::read(config_path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::warn!("Ignoring config at {:?}: {}", config_path, e);
                }
            }
        }
        Self::default()
    }

    /// Read and parse a config file without any fallback.
    pub fn read(config_path: &Path) -> QuadcamResult<Self> {
        let content = std::fs::read_to_string(config_path)?;
        serde_json::from_str(&content)
            .map_err(|e| QuadcamError::config(format!("{}: {e}", config_path.display())))
    }

    /// Save config to the standard location.
    pub fn save(&self) -> Result<(), std::io::Error> {
        let config_path = config_file_path();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;
        std::fs::write(config_path, json)
    }

    /// Path of the project store file.
    pub fn store_path(&self) -> PathBuf {
        self.data_dir.join("projects.json")
    }
}

/// Standard config file location.
pub fn config_file_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".config")
        });
    base.join("quadcam").join("config.json")
}

/// Default data directory.
fn default_data_dir() -> PathBuf {
    let base = std::env::var("XDG_DATA_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
            PathBuf::from(home).join(".local").join("share")
        });
    base.join("quadcam")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_defaults() {
        let defaults = PlaybackDefaults::default();
        assert_eq!(defaults.tick_interval_ms, 100);
        assert!((defaults.tick_step_secs() - 0.1).abs() < 1e-12);
        assert!((defaults.drift_threshold_secs - 0.3).abs() < 1e-12);
        assert!(defaults.pause_on_scrub);
    }

    #[test]
    fn test_partial_config_fills_defaults() {
        let raw = r#"{ "playback": { "drift_threshold_secs": 0.5 } }"#;
        let config: AppConfig = serde_json::from_str(raw).unwrap();
        assert!((config.playback.drift_threshold_secs - 0.5).abs() < 1e-12);
        assert_eq!(config.playback.tick_interval_ms, 100);
        assert_eq!(config.export.ffmpeg_path, "ffmpeg");
        assert!(config.telemetry.extractor_command.is_none());
    }

    #[test]
    fn test_unparsable_config_falls_back_to_defaults() {
        let path = std::env::temp_dir().join("quadcam_test_bad_config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let config = AppConfig::load_from(&path);
        assert_eq!(config.logging.level, "info");
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_read_reports_config_error() {
        let path = std::env::temp_dir().join("quadcam_test_read_bad_config.json");
        std::fs::write(&path, "{ \"playback\": 3 }").unwrap();
        let err = AppConfig::read(&path).unwrap_err();
        assert!(matches!(err, QuadcamError::Config { .. }));
        assert!(err.to_string().starts_with("Configuration error"));
        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn test_store_path_is_inside_data_dir() {
        let config = AppConfig {
            data_dir: PathBuf::from("/srv/quadcam"),
            ..AppConfig::default()
        };
        assert_eq!(config.store_path(), PathBuf::from("/srv/quadcam/projects.json"));
    }
}
