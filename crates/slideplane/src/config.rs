use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::gesture::GestureConfig;
use crate::navigation::{DEFAULT_ANIMATION_SECONDS, Mode};

const FILENAME: &str = "config.yaml";
const APP_DIR: &str = "slideplane";

const ANIMATION_SECONDS_RANGE: RangeInclusive<f64> = 0.0..=10.0;
// 1.0 would leave no room between the dead zone and the edge.
const EDGE_THRESHOLD_RANGE: RangeInclusive<f64> = 0.0..=0.99;
const TICK_RATE_RANGE: RangeInclusive<f64> = 1.0..=240.0;
const WHEEL_DIVISOR_RANGE: RangeInclusive<f64> = 1.0..=100_000.0;
const DOUBLE_CLICK_INTERVAL_RANGE: RangeInclusive<f64> = 0.05..=2.0;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_roam: Option<FreeRoamConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// `presentation` or `editor`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_click_free_roam: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_seconds: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FreeRoamConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_threshold: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tick_rate: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wheel_divisor: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub double_click_interval: Option<f64>,
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(FILENAME))
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                anyhow::anyhow!("No config found. Run `slideplane config show` to see defaults.")
            } else {
                anyhow::anyhow!("Failed to read config: {e}")
            }
        })?;
        let config: Config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let contents = format!("# slideplane configuration\n{yaml}");
        std::fs::write(path, contents)?;
        Ok(())
    }

    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "defaults.mode" => {
                match value {
                    "presentation" | "editor" => {}
                    _ => anyhow::bail!(
                        "Invalid mode: {value}. Must be 'presentation' or 'editor'."
                    ),
                }
                self.defaults_mut().mode = Some(value.to_string());
            }
            "defaults.double_click_free_roam" => {
                let enabled = match value {
                    "true" | "on" | "yes" => true,
                    "false" | "off" | "no" => false,
                    _ => anyhow::bail!(
                        "Invalid double_click_free_roam: {value}. Must be 'true' or 'false'."
                    ),
                };
                self.defaults_mut().double_click_free_roam = Some(enabled);
            }
            "defaults.animation_seconds" => {
                let seconds = parse_number(key, value, ANIMATION_SECONDS_RANGE)?;
                self.defaults_mut().animation_seconds = Some(seconds);
            }
            "free_roam.edge_threshold" => {
                let threshold = parse_number(key, value, EDGE_THRESHOLD_RANGE)?;
                self.free_roam_mut().edge_threshold = Some(threshold);
            }
            "free_roam.tick_rate" => {
                let rate = parse_number(key, value, TICK_RATE_RANGE)?;
                self.free_roam_mut().tick_rate = Some(rate);
            }
            "free_roam.wheel_divisor" => {
                let divisor = parse_number(key, value, WHEEL_DIVISOR_RANGE)?;
                self.free_roam_mut().wheel_divisor = Some(divisor);
            }
            "free_roam.double_click_interval" => {
                let interval = parse_number(key, value, DOUBLE_CLICK_INTERVAL_RANGE)?;
                self.free_roam_mut().double_click_interval = Some(interval);
            }
            _ => anyhow::bail!(
                "Unknown config key: {key}. Valid keys: defaults.mode, defaults.double_click_free_roam, \
                 defaults.animation_seconds, free_roam.edge_threshold, free_roam.tick_rate, \
                 free_roam.wheel_divisor, free_roam.double_click_interval"
            ),
        }
        Ok(())
    }

    fn defaults_mut(&mut self) -> &mut DefaultsConfig {
        self.defaults.get_or_insert_with(DefaultsConfig::default)
    }

    fn free_roam_mut(&mut self) -> &mut FreeRoamConfig {
        self.free_roam.get_or_insert_with(FreeRoamConfig::default)
    }

    /// Configured start mode. Unknown values fall back to presentation.
    pub fn mode(&self) -> Mode {
        match self.defaults.as_ref().and_then(|d| d.mode.as_deref()) {
            Some("editor") => Mode::Editor,
            _ => Mode::Presentation,
        }
    }

    pub fn double_click_free_roam(&self) -> bool {
        self.defaults
            .as_ref()
            .and_then(|d| d.double_click_free_roam)
            .unwrap_or(true)
    }

    pub fn animation_seconds(&self) -> f64 {
        in_range(
            "defaults.animation_seconds",
            self.defaults.as_ref().and_then(|d| d.animation_seconds),
            ANIMATION_SECONDS_RANGE,
            DEFAULT_ANIMATION_SECONDS,
        )
    }

    /// Gesture tunables. Unset or out-of-range values fall back to the built-in
    /// defaults with a warning.
    pub fn gesture_config(&self) -> GestureConfig {
        let defaults = GestureConfig::default();
        let Some(free_roam) = &self.free_roam else {
            return defaults;
        };
        GestureConfig {
            edge_threshold: in_range(
                "free_roam.edge_threshold",
                free_roam.edge_threshold,
                EDGE_THRESHOLD_RANGE,
                defaults.edge_threshold,
            ),
            tick_rate: in_range(
                "free_roam.tick_rate",
                free_roam.tick_rate,
                TICK_RATE_RANGE,
                defaults.tick_rate,
            ),
            wheel_divisor: in_range(
                "free_roam.wheel_divisor",
                free_roam.wheel_divisor,
                WHEEL_DIVISOR_RANGE,
                defaults.wheel_divisor,
            ),
            double_click_interval: in_range(
                "free_roam.double_click_interval",
                free_roam.double_click_interval,
                DOUBLE_CLICK_INTERVAL_RANGE,
                defaults.double_click_interval,
            ),
        }
    }
}

fn in_range(key: &str, value: Option<f64>, range: RangeInclusive<f64>, default: f64) -> f64 {
    match value {
        Some(value) if range.contains(&value) => value,
        Some(value) => {
            warn!(
                "Ignoring {key}: {value} is outside {}..={}, using {default}",
                range.start(),
                range.end()
            );
            default
        }
        None => default,
    }
}

fn parse_number(key: &str, value: &str, range: RangeInclusive<f64>) -> Result<f64> {
    let number: f64 = value
        .parse()
        .map_err(|_| anyhow::anyhow!("Invalid {key}: {value}. Must be a number."))?;
    if !range.contains(&number) {
        anyhow::bail!(
            "Invalid {key}: {value}. Must be between {} and {}.",
            range.start(),
            range.end()
        );
    }
    Ok(number)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::default();
        assert_eq!(config.mode(), Mode::Presentation);
        assert!(config.double_click_free_roam());
        assert_eq!(config.animation_seconds(), DEFAULT_ANIMATION_SECONDS);
        assert_eq!(config.gesture_config(), GestureConfig::default());
    }

    #[test]
    fn test_set_valid_values() {
        let mut config = Config::default();
        config.set("defaults.mode", "editor").unwrap();
        config.set("defaults.double_click_free_roam", "off").unwrap();
        config.set("defaults.animation_seconds", "0.5").unwrap();
        config.set("free_roam.tick_rate", "60").unwrap();
        config.set("free_roam.edge_threshold", "0.3").unwrap();

        assert_eq!(config.mode(), Mode::Editor);
        assert!(!config.double_click_free_roam());
        assert_eq!(config.animation_seconds(), 0.5);
        let gestures = config.gesture_config();
        assert_eq!(gestures.tick_rate, 60.0);
        assert_eq!(gestures.edge_threshold, 0.3);
        assert_eq!(gestures.wheel_divisor, 1500.0);
    }

    #[test]
    fn test_set_rejects_bad_values() {
        let mut config = Config::default();
        assert!(config.set("defaults.mode", "slideshow").is_err());
        assert!(config.set("defaults.double_click_free_roam", "maybe").is_err());
        assert!(config.set("free_roam.tick_rate", "fast").is_err());
        assert!(config.set("free_roam.edge_threshold", "1.0").is_err());
        assert!(config.set("free_roam.tick_rate", "0").is_err());
        assert!(config.defaults.is_none());
        assert!(config.free_roam.is_none());
    }

    #[test]
    fn test_out_of_range_file_values_fall_back() {
        let yaml = "defaults:\n  animation_seconds: -1\nfree_roam:\n  edge_threshold: 1.0\n  tick_rate: 0\n  wheel_divisor: 0\n  double_click_interval: .nan\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.animation_seconds(), DEFAULT_ANIMATION_SECONDS);
        assert_eq!(config.gesture_config(), GestureConfig::default());
    }

    #[test]
    fn test_in_range_file_values_kept() {
        let yaml = "free_roam:\n  edge_threshold: 0.5\n  tick_rate: 0\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        let gestures = config.gesture_config();
        assert_eq!(gestures.edge_threshold, 0.5);
        assert_eq!(gestures.tick_rate, 24.0);
    }

    #[test]
    fn test_set_rejects_unknown_key() {
        let mut config = Config::default();
        let err = config.set("defaults.theme", "dark").unwrap_err();
        assert!(err.to_string().contains("Unknown config key"));
    }

    #[test]
    fn test_yaml_round_trip_skips_unset() {
        let mut config = Config::default();
        config.set("free_roam.wheel_divisor", "900").unwrap();
        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(!yaml.contains("defaults"));
        let parsed: Config = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.gesture_config().wheel_divisor, 900.0);
    }

    #[test]
    fn test_save_and_load_from_path() {
        let path = std::env::temp_dir()
            .join(format!("slideplane-config-{}", uuid::Uuid::new_v4()))
            .join(FILENAME);
        let mut config = Config::default();
        config.set("defaults.mode", "editor").unwrap();
        config.save_to(&path).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.starts_with("# slideplane configuration"));
        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.mode(), Mode::Editor);

        if let Some(dir) = path.parent() {
            let _ = std::fs::remove_dir_all(dir);
        }
    }

    #[test]
    fn test_load_missing_file_explains() {
        let err = Config::load_from(Path::new("/no/such/slideplane.yaml")).unwrap_err();
        assert!(err.to_string().contains("slideplane config show"));
    }
}
