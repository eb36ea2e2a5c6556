//! Configuration for wolfreel
//!
//! Two layers, mirroring how the driver binary assembles its settings:
//! - [`PlaybackOptions`]: the engine-facing knobs (base interval, speed).
//! - [`ConfigFile`]: optional TOML file merged beneath CLI arguments.
//!
//! ## Priority Order
//!
//! Configuration is resolved with the following priority (highest to lowest):
//! 1. Command-line arguments / environment variables
//! 2. Configuration file
//! 3. Default values

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Result, WolfreelError};

/// Default autoplay base interval in milliseconds (one event per second at 1x)
pub const DEFAULT_BASE_INTERVAL_MS: u64 = 1000;

/// Default speed multiplier
pub const DEFAULT_SPEED: f64 = 1.0;

/// Speed presets offered by playback UIs. The engine accepts any positive
/// multiplier; these are only the conventional choices.
pub const SPEED_PRESETS: &[f64] = &[0.5, 1.0, 2.0, 4.0, 8.0];

/// Default timeout for fetching a replay over HTTP, in milliseconds
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 10_000;

/// Default log level
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default configuration file name, looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "wolfreel.toml";

/// Engine playback options.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackOptions {
    /// Autoplay interval at 1x speed, in milliseconds
    pub base_interval_ms: u64,
    /// Initial speed multiplier
    pub speed: f64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            base_interval_ms: DEFAULT_BASE_INTERVAL_MS,
            speed: DEFAULT_SPEED,
        }
    }
}

impl PlaybackOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the autoplay base interval
    pub fn with_base_interval_ms(mut self, ms: u64) -> Self {
        self.base_interval_ms = ms;
        self
    }

    /// Set the initial speed multiplier
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    /// Base interval as a [`Duration`]
    pub fn base_interval(&self) -> Duration {
        Duration::from_millis(self.base_interval_ms)
    }

    /// Validate the options before handing them to the engine
    pub fn validate(&self) -> Result<()> {
        if self.base_interval_ms == 0 {
            return Err(WolfreelError::config("base_interval_ms must be positive"));
        }
        if !(self.speed.is_finite() && self.speed > 0.0) {
            return Err(WolfreelError::InvalidSpeed(self.speed));
        }
        Ok(())
    }
}

/// Root configuration structure for the TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Playback settings
    pub playback: PlaybackSection,

    /// Replay source settings
    pub source: SourceSection,
}

/// `[playback]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaybackSection {
    pub base_interval_ms: Option<u64>,
    pub speed: Option<f64>,
    pub display_thinking: Option<bool>,
    pub log_level: Option<String>,
}

/// `[source]` section
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSection {
    /// URL serving the replay payload
    pub url: Option<String>,
    /// Local JSON file holding the replay payload
    pub replay_file: Option<PathBuf>,
    /// HTTP fetch timeout in milliseconds
    pub timeout_ms: Option<u64>,
}

impl ConfigFile {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            WolfreelError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            WolfreelError::config(format!("Failed to parse {}: {}", path.display(), e))
        })
    }

    /// Load `wolfreel.toml` from the working directory, if present
    pub fn load_default() -> Option<Self> {
        let path = Path::new(DEFAULT_CONFIG_FILE);
        if !path.exists() {
            return None;
        }
        ConfigFile::load(path).ok()
    }

    /// Generate an example configuration file
    pub fn generate_example() -> String {
        format!(
            r#"# wolfreel.toml

[playback]
base_interval_ms = {DEFAULT_BASE_INTERVAL_MS}
speed = 1.0
display_thinking = false
log_level = "{DEFAULT_LOG_LEVEL}"

[source]
# url = "http://127.0.0.1:8000/replay_data"
# replay_file = "./replay.json"
timeout_ms = {DEFAULT_SOURCE_TIMEOUT_MS}
"#
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playback_options_default() {
        let options = PlaybackOptions::default();
        assert_eq!(options.base_interval_ms, 1000);
        assert_eq!(options.speed, 1.0);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_playback_options_builder() {
        let options = PlaybackOptions::new()
            .with_base_interval_ms(250)
            .with_speed(2.0);
        assert_eq!(options.base_interval(), Duration::from_millis(250));
        assert_eq!(options.speed, 2.0);
    }

    #[test]
    fn test_playback_options_validation() {
        assert!(PlaybackOptions::new()
            .with_base_interval_ms(0)
            .validate()
            .is_err());
        assert!(PlaybackOptions::new().with_speed(0.0).validate().is_err());
        assert!(PlaybackOptions::new().with_speed(-1.0).validate().is_err());
        assert!(PlaybackOptions::new()
            .with_speed(f64::INFINITY)
            .validate()
            .is_err());
    }

    #[test]
    fn test_config_file_parse() {
        let parsed: ConfigFile = toml::from_str(
            r#"
            [playback]
            speed = 4.0
            display_thinking = true

            [source]
            url = "http://localhost:8000/replay_data"
            "#,
        )
        .unwrap();

        assert_eq!(parsed.playback.speed, Some(4.0));
        assert_eq!(parsed.playback.display_thinking, Some(true));
        assert_eq!(parsed.playback.base_interval_ms, None);
        assert_eq!(
            parsed.source.url.as_deref(),
            Some("http://localhost:8000/replay_data")
        );
    }

    #[test]
    fn test_example_config_parses_back() {
        let example = ConfigFile::generate_example();
        let parsed: ConfigFile = toml::from_str(&example).unwrap();
        assert_eq!(
            parsed.playback.base_interval_ms,
            Some(DEFAULT_BASE_INTERVAL_MS)
        );
        assert_eq!(parsed.source.timeout_ms, Some(DEFAULT_SOURCE_TIMEOUT_MS));
    }

    #[test]
    fn test_load_missing_file_errors() {
        let temp = tempfile::tempdir().unwrap();
        let result = ConfigFile::load(temp.path().join("nope.toml"));
        assert!(matches!(result, Err(WolfreelError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let temp = tempfile::tempdir().unwrap();
        let path = temp.path().join("wolfreel.toml");
        std::fs::write(&path, "[playback]\nbase_interval_ms = 500\n").unwrap();

        let loaded = ConfigFile::load(&path).unwrap();
        assert_eq!(loaded.playback.base_interval_ms, Some(500));
    }
}
