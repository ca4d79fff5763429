//! Service configuration loading and types.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use marine_common::{Datum, TideInterval};
use serde::{Deserialize, Serialize};
use station_cache::DEFAULT_CAPACITY;

/// Default location of the YAML config file.
pub const DEFAULT_CONFIG_PATH: &str = "config/marine.yaml";

/// Service configuration loaded from YAML, then adjusted by environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarineConfig {
    pub cache: CacheConfig,
    pub tides: TideConfig,
    pub data: DataConfig,
}

/// Memoizer sizing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum cached buoy reading results.
    pub reading_capacity: usize,

    /// Maximum cached tide results (one per station, window and datum).
    pub tide_capacity: usize,

    /// Optional entry lifetime; entries live until evicted when unset.
    pub ttl_secs: Option<u64>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            reading_capacity: DEFAULT_CAPACITY,
            tide_capacity: DEFAULT_CAPACITY,
            ttl_secs: None,
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_secs.map(Duration::from_secs)
    }
}

/// Tide lookup policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TideConfig {
    /// Datums tried in order for both the nearest-station and by-id paths.
    pub datum_preferences: Vec<Datum>,

    /// Sampling interval requested from tide stations.
    pub interval: TideInterval,
}

impl Default for TideConfig {
    fn default() -> Self {
        Self {
            datum_preferences: Datum::default_preferences(),
            interval: TideInterval::default(),
        }
    }
}

/// Where the snapshot backend reads from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    pub snapshot_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: PathBuf::from("data/snapshot"),
        }
    }
}

impl MarineConfig {
    /// Load configuration from a YAML file, then apply environment overrides.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_file(path)?;
        config.apply_overrides(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file only.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        // If file doesn't exist, return default config
        if !path.exists() {
            tracing::warn!(
                "Config file {} does not exist, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read: {:?}", path))?;

        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse: {:?}", path))?;

        tracing::info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Apply `MARINE_*` overrides read through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MARINE_READING_CACHE_SIZE") {
            self.cache.reading_capacity = value
                .trim()
                .parse()
                .with_context(|| format!("MARINE_READING_CACHE_SIZE is not a number: {}", value))?;
        }

        if let Some(value) = lookup("MARINE_TIDE_CACHE_SIZE") {
            self.cache.tide_capacity = value
                .trim()
                .parse()
                .with_context(|| format!("MARINE_TIDE_CACHE_SIZE is not a number: {}", value))?;
        }

        if let Some(value) = lookup("MARINE_CACHE_TTL_SECS") {
            let value = value.trim();
            // 0 or empty disables expiry
            self.cache.ttl_secs = match value {
                "" | "0" => None,
                secs => Some(
                    secs.parse()
                        .with_context(|| format!("MARINE_CACHE_TTL_SECS is not a number: {}", secs))?,
                ),
            };
        }

        if let Some(value) = lookup("MARINE_DATA_DIR") {
            self.data.snapshot_dir = PathBuf::from(value);
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.tides.datum_preferences.is_empty() {
            bail!("tides.datum_preferences must list at least one datum");
        }
        if self.cache.reading_capacity == 0 || self.cache.tide_capacity == 0 {
            tracing::warn!("Cache capacity of 0 configured; memoizers will hold a single entry");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = MarineConfig::default();
        assert_eq!(config.cache.reading_capacity, 128);
        assert_eq!(config.cache.tide_capacity, 128);
        assert_eq!(config.cache.ttl(), None);
        assert_eq!(
            config.tides.datum_preferences,
            vec![
                Datum::MeanLowerLowWater,
                Datum::MeanSeaLevel,
                Datum::MeanTideLevel
            ]
        );
        assert_eq!(config.tides.interval, TideInterval::Hourly);
        assert_eq!(config.data.snapshot_dir, PathBuf::from("data/snapshot"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = MarineConfig::from_yaml(
            r#"
cache:
  reading_capacity: 16
  ttl_secs: 600
tides:
  datum_preferences: [mean_sea_level]
"#,
        )
        .unwrap();

        assert_eq!(config.cache.reading_capacity, 16);
        assert_eq!(config.cache.tide_capacity, 128);
        assert_eq!(config.cache.ttl(), Some(Duration::from_secs(600)));
        assert_eq!(config.tides.datum_preferences, vec![Datum::MeanSeaLevel]);
        assert_eq!(config.tides.interval, TideInterval::Hourly);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = MarineConfig::load_file("/nonexistent/marine.yaml").unwrap();
        assert_eq!(config, MarineConfig::default());
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tides:\n  interval: high_low\ndata:\n  snapshot_dir: /srv/marine").unwrap();

        let config = MarineConfig::load_file(file.path()).unwrap();
        assert_eq!(config.tides.interval, TideInterval::HighLow);
        assert_eq!(config.data.snapshot_dir, PathBuf::from("/srv/marine"));
    }

    #[test]
    fn test_load_file_rejects_bad_yaml() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tides:\n  datum_preferences: [navd88]").unwrap();

        assert!(MarineConfig::load_file(file.path()).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = MarineConfig::default();
        config
            .apply_overrides(env(&[
                ("MARINE_READING_CACHE_SIZE", "64"),
                ("MARINE_TIDE_CACHE_SIZE", " 32 "),
                ("MARINE_CACHE_TTL_SECS", "300"),
                ("MARINE_DATA_DIR", "/tmp/snapshot"),
            ]))
            .unwrap();

        assert_eq!(config.cache.reading_capacity, 64);
        assert_eq!(config.cache.tide_capacity, 32);
        assert_eq!(config.cache.ttl_secs, Some(300));
        assert_eq!(config.data.snapshot_dir, PathBuf::from("/tmp/snapshot"));
    }

    #[test]
    fn test_env_ttl_zero_disables_expiry() {
        let mut config = MarineConfig::default();
        config.cache.ttl_secs = Some(60);
        config
            .apply_overrides(env(&[("MARINE_CACHE_TTL_SECS", "0")]))
            .unwrap();
        assert_eq!(config.cache.ttl_secs, None);
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = MarineConfig::default();
        let result = config.apply_overrides(env(&[("MARINE_READING_CACHE_SIZE", "lots")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_rejects_empty_preferences() {
        let mut config = MarineConfig::default();
        config.tides.datum_preferences.clear();
        assert!(config.validate().is_err());
    }
}
