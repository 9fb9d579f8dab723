//! Configuration management for Narrator.
//!
//! Handles loading and saving user configuration to platform-standard config
//! directories:
//! - Linux: `~/.config/narrator/config.json`
//! - macOS: `~/Library/Application Support/narrator/config.json`
//! - Windows: `%APPDATA%\narrator\config.json`

use directories::{ProjectDirs, UserDirs};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Output-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Custom annotation output directory. If None, uses the home directory
    /// (the annotation folder chooser defaults there).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
}

/// Audio capture configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AudioConfig {
    /// Capture device index, as reported by device enumeration.
    #[serde(default)]
    pub device_id: usize,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self { device_id: 0 }
    }
}

/// Playback-related configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Seek step in milliseconds for press-and-hold seeking.
    #[serde(default = "default_seek_step_ms")]
    pub seek_step_ms: u64,
}

fn default_seek_step_ms() -> u64 {
    crate::SEEK_STEP_MS
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            seek_step_ms: crate::SEEK_STEP_MS,
        }
    }
}

/// Microphone monitor configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Number of samples per channel kept in the monitor window.
    #[serde(default = "default_monitor_window")]
    pub window: usize,
    /// Refresh interval of the monitor plot, in milliseconds.
    #[serde(default = "default_monitor_interval_ms")]
    pub interval_ms: u64,
}

fn default_monitor_window() -> usize {
    crate::MONITOR_WINDOW_SAMPLES
}

fn default_monitor_interval_ms() -> u64 {
    crate::MONITOR_INTERVAL_MS
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            window: crate::MONITOR_WINDOW_SAMPLES,
            interval_ms: crate::MONITOR_INTERVAL_MS,
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Output settings group.
    #[serde(default)]
    pub output: OutputConfig,
    /// Audio capture settings group.
    #[serde(default)]
    pub audio: AudioConfig,
    /// Playback settings group.
    #[serde(default)]
    pub playback: PlaybackConfig,
    /// Microphone monitor settings group.
    #[serde(default)]
    pub monitor: MonitorConfig,
}

impl AppConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }
}

/// Get the path to the config file.
fn get_config_path() -> Result<PathBuf, String> {
    let proj_dirs =
        ProjectDirs::from("", "", "narrator").ok_or("Could not determine config directory")?;

    Ok(proj_dirs.config_dir().join("config.json"))
}

/// Load configuration from disk.
/// Returns default config if file doesn't exist or is invalid.
pub fn load_config() -> AppConfig {
    let config_path = match get_config_path() {
        Ok(path) => path,
        Err(e) => {
            warn!("Failed to get config path: {}", e);
            return AppConfig::default();
        }
    };

    if !config_path.exists() {
        debug!("No config file found, using defaults");
        return AppConfig::default();
    }

    match fs::read_to_string(&config_path) {
        Ok(contents) => match serde_json::from_str::<AppConfig>(&contents) {
            Ok(config) => {
                debug!("Loaded config from {:?}", config_path);
                config
            }
            Err(e) => {
                warn!("Failed to parse config file: {}. Using defaults.", e);
                AppConfig::default()
            }
        },
        Err(e) => {
            warn!("Failed to read config file: {}. Using defaults.", e);
            AppConfig::default()
        }
    }
}

/// Save configuration to disk.
/// Creates the config directory if it doesn't exist.
pub fn save_config(config: &AppConfig) -> Result<(), String> {
    let config_path = get_config_path()?;

    if let Some(parent) = config_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
    }

    let json = serde_json::to_string_pretty(config)
        .map_err(|e| format!("Failed to serialize config: {}", e))?;

    fs::write(&config_path, json).map_err(|e| format!("Failed to write config file: {}", e))?;

    debug!("Saved config to {:?}", config_path);
    Ok(())
}

/// Get the default annotation output directory (home directory).
pub fn get_default_output_dir() -> Result<PathBuf, String> {
    let user_dirs = UserDirs::new().ok_or("Could not determine user directories")?;
    Ok(user_dirs.home_dir().to_path_buf())
}

/// Get the configured output directory, falling back to default if not set.
pub fn get_output_dir(config: &AppConfig) -> Result<PathBuf, String> {
    match &config.output.directory {
        Some(dir) if !dir.is_empty() => Ok(PathBuf::from(dir)),
        _ => get_default_output_dir(),
    }
}

/// Validate that a directory exists and is writable.
pub fn validate_directory(path: &str) -> Result<(), String> {
    let path = PathBuf::from(path);

    if !path.exists() {
        return Err("Directory does not exist".to_string());
    }

    if !path.is_dir() {
        return Err("Path is not a directory".to_string());
    }

    let test_file = path.join(".narrator_write_test");
    match fs::write(&test_file, "test") {
        Ok(()) => {
            let _ = fs::remove_file(test_file);
            Ok(())
        }
        Err(_) => Err("Directory is not writable".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.output.directory.is_none());
        assert_eq!(config.audio.device_id, 0);
        assert_eq!(config.playback.seek_step_ms, crate::SEEK_STEP_MS);
        assert_eq!(config.monitor.window, crate::MONITOR_WINDOW_SAMPLES);
        assert_eq!(config.monitor.interval_ms, crate::MONITOR_INTERVAL_MS);
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.output.directory = Some("/custom/path".to_string());
        config.audio.device_id = 3;

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.output.directory, Some("/custom/path".to_string()));
        assert_eq!(parsed.audio.device_id, 3);
    }

    #[test]
    fn test_empty_directory_serialization() {
        // Empty directory should not be serialized
        let config = AppConfig::default();
        let json = serde_json::to_string(&config).unwrap();

        assert!(!json.contains("directory"));
    }

    #[test]
    fn test_config_backward_compatible() {
        // Old config without the monitor/playback groups loads correctly
        let json = r#"{"output": {}, "audio": {"device_id": 2}}"#;
        let parsed: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(parsed.audio.device_id, 2);
        assert_eq!(parsed.playback.seek_step_ms, crate::SEEK_STEP_MS);
        assert_eq!(parsed.monitor.window, crate::MONITOR_WINDOW_SAMPLES);
    }
}
