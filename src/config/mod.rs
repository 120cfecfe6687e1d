use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, ConfigError, File, FileFormat};
use serde::Deserialize;

use crate::directory::FilterSpec;

#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    pub snapshot: SnapshotConfig,
    #[serde(default)]
    pub directory: DirectorySettings,
    pub cache: CacheConfig,
}

impl DirectoryConfig {
    pub fn load() -> Result<Self> {
        let configured_path = std::env::var("IAA_DIRECTORY_CONFIG")
            .unwrap_or_else(|_| "config/directory.toml".to_string());
        assert!(
            !configured_path.is_empty(),
            "Configuration path must be non-empty"
        );
        assert!(
            configured_path.len() < 4096,
            "Configuration path length exceeds hard limit"
        );

        let mut builder = Config::builder()
            .add_source(File::new(&configured_path, FileFormat::Toml).required(true));

        if let Ok(env_override) = std::env::var("IAA_DIRECTORY_ENV") {
            if !env_override.is_empty() {
                let env_file = format!("config/directory.{}.toml", env_override);
                if Path::new(&env_file).exists() {
                    builder = builder.add_source(File::new(&env_file, FileFormat::Toml));
                }
            }
        }

        let settings = builder
            .build()
            .map_err(|err| map_config_error(err, &configured_path))?;
        Self::from_settings(settings)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .context("Failed to parse directory configuration")?;
        Self::from_settings(settings)
    }

    fn from_settings(settings: Config) -> Result<Self> {
        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize directory configuration")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        assert!(
            !self.snapshot.path.as_os_str().is_empty(),
            "Snapshot path must be specified"
        );
        self.snapshot.ensure_bounds()?;
        self.cache.ensure_bounds()?;
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SnapshotConfig {
    pub path: PathBuf,
    #[serde(default = "SnapshotConfig::default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

impl SnapshotConfig {
    pub fn poll_interval(&self) -> Duration {
        assert!(
            self.poll_interval_ms >= 100,
            "Poll interval must be >= 100ms"
        );
        assert!(
            self.poll_interval_ms <= 60_000,
            "Poll interval must be <= 60 seconds"
        );
        Duration::from_millis(self.poll_interval_ms)
    }

    fn ensure_bounds(&self) -> Result<()> {
        assert!(
            self.poll_interval_ms >= 100,
            "Poll interval must be >= 100ms"
        );
        assert!(
            self.poll_interval_ms <= 60_000,
            "Poll interval must be <= 60 seconds"
        );
        Ok(())
    }

    const fn default_poll_interval_ms() -> u64 {
        2_000
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DirectorySettings {
    #[serde(default)]
    pub default_filter: FilterSpec,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    pub results_max_capacity: u64,
    pub results_ttl_seconds: u64,
}

impl CacheConfig {
    pub fn results_ttl(&self) -> Duration {
        Duration::from_secs(self.results_ttl_seconds)
    }

    fn ensure_bounds(&self) -> Result<()> {
        assert!(
            self.results_max_capacity >= 16,
            "Result cache capacity must be at least 16"
        );
        assert!(
            self.results_ttl_seconds > 0,
            "Result cache TTL must be positive"
        );
        assert!(
            self.results_ttl_seconds <= 86_400,
            "Result cache TTL cannot exceed one day"
        );
        Ok(())
    }
}

fn map_config_error(err: ConfigError, path: &str) -> ConfigError {
    match err {
        ConfigError::NotFound(_) => ConfigError::NotFound(path.to_string()),
        other => other,
    }
}
