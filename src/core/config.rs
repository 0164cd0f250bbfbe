use crate::core::aggregate::DEFAULT_RADIUS_KM;
use crate::core::rates::{DEFAULT_BCV_RATE, DEFAULT_USDT_RATE, ExchangeRates};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FallbackRatesConfig {
    pub bcv: f64,
    pub usdt: f64,
}

impl Default for FallbackRatesConfig {
    fn default() -> Self {
        FallbackRatesConfig {
            bcv: DEFAULT_BCV_RATE,
            usdt: DEFAULT_USDT_RATE,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Hosted backend. Without it the client runs on sample data.
    pub backend: Option<BackendConfig>,
    #[serde(default = "default_radius_km")]
    pub radius_km: f64,
    #[serde(default = "default_rates_refresh_secs")]
    pub rates_refresh_secs: u64,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default)]
    pub fallback_rates: FallbackRatesConfig,
    pub data_path: Option<String>,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_radius_km() -> f64 {
    DEFAULT_RADIUS_KM
}

fn default_rates_refresh_secs() -> u64 {
    12 * 60 * 60
}

fn default_poll_interval_secs() -> u64 {
    15
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            backend: None,
            radius_km: default_radius_km(),
            rates_refresh_secs: default_rates_refresh_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            fallback_rates: FallbackRatesConfig::default(),
            data_path: None,
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or defaults when there is none yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ve", "perros", "perros-index")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("ve", "perros", "perros-index")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn fallback_rates(&self) -> Result<ExchangeRates> {
        ExchangeRates::new(self.fallback_rates.bcv, self.fallback_rates.usdt)
            .context("Invalid fallback_rates in config")
    }

    pub fn rates_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.rates_refresh_secs.max(1))
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
backend:
  url: "https://example.supabase.co"
  anon_key: "public-anon-key"
radius_km: 25
fallback_rates:
  bcv: 36.5
  usdt: 40.1
data_path: "/tmp/perros"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        let backend = config.backend.as_ref().expect("backend section");
        assert_eq!(backend.url, "https://example.supabase.co");
        assert_eq!(backend.anon_key, "public-anon-key");
        assert_eq!(backend.timeout_secs, 30);
        assert_eq!(config.radius_km, 25.0);
        assert_eq!(config.rates_refresh_secs, 43200);
        assert_eq!(config.poll_interval_secs, 15);
        assert_eq!(
            config.fallback_rates,
            FallbackRatesConfig {
                bcv: 36.5,
                usdt: 40.1
            }
        );
        assert_eq!(
            config.default_data_path().unwrap(),
            PathBuf::from("/tmp/perros")
        );
    }

    #[test]
    fn test_empty_config_means_fallback_mode() {
        let config: AppConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.backend.is_none());
        assert_eq!(config.radius_km, DEFAULT_RADIUS_KM);
        let rates = config.fallback_rates().unwrap();
        assert_eq!(rates.bcv(), DEFAULT_BCV_RATE);
        assert_eq!(rates.usdt(), DEFAULT_USDT_RATE);
    }

    #[test]
    fn test_invalid_fallback_rates() {
        let config: AppConfig =
            serde_yaml::from_str("fallback_rates: { bcv: 0, usdt: 40 }").unwrap();
        assert!(config.fallback_rates().is_err());
    }

    #[test]
    fn test_load_from_path() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), "radius_km: 10\npoll_interval_secs: 0\n").unwrap();
        let config = AppConfig::load_from_path(file.path()).unwrap();
        assert_eq!(config.radius_km, 10.0);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));

        assert!(AppConfig::load_from_path("/nonexistent/config.yaml").is_err());
    }
}
