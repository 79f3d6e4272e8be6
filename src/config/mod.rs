use crate::error::{Error, Result as EngineResult};
use crate::timeline::coordinate::{TimeScale, MINUTES_PER_DAY};
use crate::timeline::layout::LayoutConfig;
use crate::timeline::scrubber::{ScrubberConfig, SnapPolicy};
use crate::timeline::view::ViewConfig;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub store: StoreConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
    /// API server address
    #[serde(default = "default_address")]
    pub address: String,
    /// API server port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Directory served at `/` (dashboard assets, icons, thumbnails)
    #[serde(default = "default_static_dir")]
    pub static_dir: PathBuf,
}

fn default_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    4750
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_static_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
            log_level: default_log_level(),
            static_dir: default_static_dir(),
        }
    }
}

/// Timeline geometry and scrubber behaviour
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimelineConfig {
    /// Horizontal pixels per minute of the day
    pub pixels_per_minute: f64,
    /// Width reserved for camera names left of minute 0
    pub left_margin: f64,
    /// Floor applied to every bar width
    pub minimum_bar_width: f64,
    /// Distance within which the scrubber snaps to an incident boundary
    pub snap_threshold_seconds: u32,
    /// Length of the visible window (at most one day)
    pub day_window_minutes: u32,
    pub snap_policy: SnapPolicy,
    pub major_tick_minutes: u32,
    pub row_height: f64,
    pub header_height: f64,
    pub bar_height: f64,
    pub right_padding: f64,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            pixels_per_minute: 5.0,
            left_margin: 140.0,
            minimum_bar_width: 4.0,
            snap_threshold_seconds: 120,
            day_window_minutes: MINUTES_PER_DAY,
            snap_policy: SnapPolicy::LastMatch,
            major_tick_minutes: 10,
            row_height: 35.0,
            header_height: 60.0,
            bar_height: 30.0,
            right_padding: 20.0,
        }
    }
}

impl TimelineConfig {
    pub fn scale(&self) -> EngineResult<TimeScale> {
        TimeScale::new(self.pixels_per_minute, self.left_margin)?.with_day_window(self.day_window_minutes)
    }

    pub fn layout_config(&self) -> EngineResult<LayoutConfig> {
        for (name, value) in [
            ("minimum_bar_width", self.minimum_bar_width),
            ("row_height", self.row_height),
            ("header_height", self.header_height),
            ("bar_height", self.bar_height),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!("{} must be non-negative, got {}", name, value)));
            }
        }

        Ok(LayoutConfig {
            scale: self.scale()?,
            minimum_bar_width: self.minimum_bar_width,
            row_height: self.row_height,
            header_height: self.header_height,
            bar_height: self.bar_height,
        })
    }

    pub fn scrubber_config(&self) -> EngineResult<ScrubberConfig> {
        Ok(ScrubberConfig {
            scale: self.scale()?,
            snap_threshold_seconds: self.snap_threshold_seconds,
            snap_policy: self.snap_policy,
        })
    }

    pub fn view_config(&self) -> EngineResult<ViewConfig> {
        if self.major_tick_minutes == 0 {
            return Err(Error::Config("major_tick_minutes must be at least 1".to_string()));
        }
        if !self.right_padding.is_finite() || self.right_padding < 0.0 {
            return Err(Error::Config(format!(
                "right_padding must be non-negative, got {}",
                self.right_padding
            )));
        }

        Ok(ViewConfig {
            layout: self.layout_config()?,
            scrubber: self.scrubber_config()?,
            major_tick_minutes: self.major_tick_minutes,
            right_padding: self.right_padding,
        })
    }
}

/// Incident store configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    /// JSON file with cameras and incidents to load at startup
    #[serde(default)]
    pub seed_path: Option<PathBuf>,
    /// Generate demo cameras and incidents when no seed file is given
    #[serde(default = "default_seed_demo_data")]
    pub seed_demo_data: bool,
}

fn default_seed_demo_data() -> bool {
    true
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            seed_path: None,
            seed_demo_data: default_seed_demo_data(),
        }
    }
}

/// Parse configuration text; `format` is the file extension (`toml` or `json`).
pub fn parse_config(contents: &str, format: &str) -> Result<Config> {
    let config: Config = match format {
        "json" => serde_json::from_str(contents).context("Failed to parse JSON config")?,
        "toml" => toml::from_str(contents).context("Failed to parse TOML config")?,
        other => return Err(anyhow::anyhow!("Unsupported config file format: {}", other)),
    };

    config
        .timeline
        .view_config()
        .context("Invalid timeline configuration")?;

    Ok(config)
}

/// Load configuration from a file or use default
pub fn load_config(config_path: Option<&Path>) -> Result<Config> {
    match config_path {
        Some(path) => {
            let config_str = std::fs::read_to_string(path)
                .context(format!("Failed to read config file: {:?}", path))?;
            let format = path
                .extension()
                .and_then(|ext| ext.to_str())
                .unwrap_or_default();

            parse_config(&config_str, format)
        }
        None => Ok(Config::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_reference_geometry() {
        let config = Config::default();
        let view = config.timeline.view_config().unwrap();

        assert_eq!(view.layout.scale.pixels_per_minute(), 5.0);
        assert_eq!(view.layout.scale.left_margin(), 140.0);
        assert_eq!(view.layout.scale.day_window_minutes(), 1440);
        assert_eq!(view.scrubber.snap_threshold_seconds, 120);
        assert_eq!(view.scrubber.snap_policy, SnapPolicy::LastMatch);
        assert_eq!(config.api.port, 4750);
    }

    #[test]
    fn test_parse_toml_overrides() {
        let config = parse_config(
            r#"
            [api]
            port = 8080

            [timeline]
            pixels_per_minute = 2.5
            snap_threshold_seconds = 30
            snap_policy = "nearest"
            "#,
            "toml",
        )
        .unwrap();

        assert_eq!(config.api.port, 8080);
        assert_eq!(config.api.log_level, "info");
        assert_eq!(config.timeline.pixels_per_minute, 2.5);
        assert_eq!(config.timeline.snap_policy, SnapPolicy::Nearest);
        assert_eq!(config.timeline.minimum_bar_width, 4.0);
        assert!(config.store.seed_demo_data);
    }

    #[test]
    fn test_parse_json() {
        let config = parse_config(
            r#"{"timeline": {"day_window_minutes": 720}, "store": {"seed_demo_data": false}}"#,
            "json",
        )
        .unwrap();

        assert_eq!(config.timeline.day_window_minutes, 720);
        assert!(!config.store.seed_demo_data);
    }

    #[test]
    fn test_invalid_geometry_is_rejected() {
        assert!(parse_config("[timeline]\npixels_per_minute = 0.0\n", "toml").is_err());
        assert!(parse_config("[timeline]\nday_window_minutes = 2000\n", "toml").is_err());
        assert!(parse_config("[timeline]\nmajor_tick_minutes = 0\n", "toml").is_err());
        assert!(parse_config("[timeline]\nminimum_bar_width = -1.0\n", "toml").is_err());
        assert!(parse_config("", "yaml").is_err());
    }

    #[test]
    fn test_missing_file_without_path_uses_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.timeline.major_tick_minutes, 10);
    }
}
