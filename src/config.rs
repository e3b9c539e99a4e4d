// ⚙️ Desk Configuration
// JSON file → env overrides → command-line workbook path

use anyhow::{Context as AnyhowContext, Result};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file used when `HOTEL_DESK_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "hotel.json";

pub const CONFIG_PATH_ENV: &str = "HOTEL_DESK_CONFIG";
pub const WORKBOOK_PATH_ENV: &str = "HOTEL_DESK_WORKBOOK";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct DeskConfig {
    /// Room workbook (.xlsx), one sheet per floor
    pub workbook_path: PathBuf,

    /// Label printed after amounts
    pub currency: String,

    /// Default `env_logger` filter when `RUST_LOG` is unset
    pub log_level: String,

    /// File the values came from; `None` when running on defaults.
    /// Logged by the caller once the logger is up.
    #[serde(skip)]
    pub loaded_from: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        DeskConfig {
            workbook_path: PathBuf::from("data/rooms.xlsx"),
            currency: "PLN".to_string(),
            log_level: "info".to_string(),
            loaded_from: None,
        }
    }
}

impl DeskConfig {
    /// Parse a JSON config file. Missing fields take their defaults.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;

        let mut config: DeskConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config JSON: {:?}", path.as_ref()))?;
        config.loaded_from = Some(path.as_ref().to_path_buf());
        Ok(config)
    }

    /// Config file if present, defaults otherwise
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Resolve the full configuration for a run.
    ///
    /// Precedence (highest first): first CLI argument, `HOTEL_DESK_WORKBOOK`,
    /// config file (`HOTEL_DESK_CONFIG` or `hotel.json`), defaults.
    pub fn resolve(cli_workbook: Option<String>) -> Result<Self> {
        let config_path =
            env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());

        let mut config = Self::load_or_default(&config_path)?;
        config.apply_overrides(env::var(WORKBOOK_PATH_ENV).ok(), cli_workbook);
        Ok(config)
    }

    fn apply_overrides(&mut self, env_workbook: Option<String>, cli_workbook: Option<String>) {
        if let Some(path) = cli_workbook.or(env_workbook) {
            self.workbook_path = PathBuf::from(path);
        }
    }
}
