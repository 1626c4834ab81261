//! Configuration file support for Pocket Marathon Coach.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/pmc/config.toml`.

use crate::ics::CALENDAR_FILE_NAME;
use crate::log_export::LOG_FILE_NAME;
use crate::{Error, Result, TrainingParameters};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub defaults: PlanDefaults,

    #[serde(default)]
    pub export: ExportConfig,
}

/// Data storage configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// Training parameters used when nothing has been saved yet
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlanDefaults {
    #[serde(default = "default_base_km")]
    pub base_km: f64,

    #[serde(default = "default_peak_km")]
    pub peak_km: f64,

    #[serde(default = "default_runs_per_week")]
    pub runs_per_week: u32,

    #[serde(default = "default_long_run_peak_km")]
    pub long_run_peak_km: f64,

    #[serde(default = "default_cutback")]
    pub cutback: bool,
}

impl Default for PlanDefaults {
    fn default() -> Self {
        Self {
            base_km: default_base_km(),
            peak_km: default_peak_km(),
            runs_per_week: default_runs_per_week(),
            long_run_peak_km: default_long_run_peak_km(),
            cutback: default_cutback(),
        }
    }
}

impl PlanDefaults {
    pub fn to_parameters(&self) -> TrainingParameters {
        TrainingParameters {
            race_date: None,
            base_km: self.base_km,
            peak_km: self.peak_km,
            runs_per_week: self.runs_per_week,
            long_run_peak_km: self.long_run_peak_km,
            cutback: self.cutback,
        }
    }
}

/// Export file names
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExportConfig {
    #[serde(default = "default_calendar_file")]
    pub calendar_file: String,

    #[serde(default = "default_log_file")]
    pub log_file: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            calendar_file: default_calendar_file(),
            log_file: default_log_file(),
        }
    }
}

// Default value functions
fn default_data_dir() -> PathBuf {
    let base = dirs::data_local_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join(".local/share")))
        .unwrap_or_else(|| PathBuf::from("."));
    base.join("pmc")
}

fn default_base_km() -> f64 {
    TrainingParameters::default().base_km
}

fn default_peak_km() -> f64 {
    TrainingParameters::default().peak_km
}

fn default_runs_per_week() -> u32 {
    TrainingParameters::default().runs_per_week
}

fn default_long_run_peak_km() -> f64 {
    TrainingParameters::default().long_run_peak_km
}

fn default_cutback() -> bool {
    TrainingParameters::default().cutback
}

fn default_calendar_file() -> String {
    CALENDAR_FILE_NAME.into()
}

fn default_log_file() -> String {
    LOG_FILE_NAME.into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        config.validate()?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir()
            .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
            .unwrap_or_else(|| PathBuf::from("."));
        base.join("pmc").join("config.toml")
    }

    /// Save the current configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        let d = &self.defaults;
        for (name, value) in [
            ("base_km", d.base_km),
            ("peak_km", d.peak_km),
            ("long_run_peak_km", d.long_run_peak_km),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::Config(format!(
                    "defaults.{} must be a non-negative number",
                    name
                )));
            }
        }
        if self.export.calendar_file.trim().is_empty() || self.export.log_file.trim().is_empty() {
            return Err(Error::Config("export file names must not be empty".into()));
        }
        Ok(())
    }
}
