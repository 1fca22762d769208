use std::{fs, path::PathBuf};

use common::prelude::{Repository, DEFAULT_SERIES_DIRNAME};
use serde::{Deserialize, Serialize};

pub const APP_NAME: &str = "vault";
pub const CONFIG_FILE_NAME: &str = "config.toml";
pub const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the series root
    pub repo_root: PathBuf,
    /// Name of the series root below `repo_root`
    #[serde(default = "default_series_dirname")]
    pub series_dirname: String,
    /// Login used when `--login` is not given
    #[serde(default)]
    pub login: Option<String>,
    /// Default tracing level, overridden by RUST_LOG
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Daily rolling log files are written here when set
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

fn default_series_dirname() -> String {
    DEFAULT_SERIES_DIRNAME.to_string()
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

impl AppConfig {
    pub fn new(repo_root: PathBuf) -> Self {
        Self {
            repo_root,
            series_dirname: default_series_dirname(),
            login: None,
            log_level: default_log_level(),
            log_dir: None,
        }
    }

    pub fn repository(&self) -> Repository {
        Repository::new(&self.repo_root, &self.series_dirname)
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    /// Path to the vault directory (~/.vault)
    pub vault_dir: PathBuf,
    /// Path to the config file
    pub config_path: PathBuf,
    /// Loaded configuration
    pub config: AppConfig,
}

impl AppState {
    /// Get the vault directory path (custom or default ~/.vault)
    pub fn vault_dir(custom_path: Option<PathBuf>) -> Result<PathBuf, StateError> {
        if let Some(path) = custom_path {
            return Ok(path);
        }

        let home = dirs::home_dir().ok_or(StateError::NoHomeDirectory)?;
        Ok(home.join(format!(".{}", APP_NAME)))
    }

    /// Initialize a new vault directory holding `config`
    pub fn init(custom_path: Option<PathBuf>, config: AppConfig) -> Result<Self, StateError> {
        let vault_dir = Self::vault_dir(custom_path)?;
        let config_path = vault_dir.join(CONFIG_FILE_NAME);

        if config_path.exists() {
            return Err(StateError::AlreadyInitialized);
        }

        fs::create_dir_all(&vault_dir)?;
        fs::write(&config_path, toml::to_string_pretty(&config)?)?;

        Ok(Self {
            vault_dir,
            config_path,
            config,
        })
    }

    /// Load existing state from the vault directory
    pub fn load(custom_path: Option<PathBuf>) -> Result<Self, StateError> {
        let vault_dir = Self::vault_dir(custom_path)?;

        if !vault_dir.exists() {
            return Err(StateError::NotInitialized);
        }

        let config_path = vault_dir.join(CONFIG_FILE_NAME);
        if !config_path.exists() {
            return Err(StateError::MissingFile(CONFIG_FILE_NAME.to_string()));
        }

        let config_toml = fs::read_to_string(&config_path)?;
        let config: AppConfig = toml::from_str(&config_toml)?;

        Ok(Self {
            vault_dir,
            config_path,
            config,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("vault directory not initialized. Run 'vault init' first")]
    NotInitialized,

    #[error("vault directory already initialized")]
    AlreadyInitialized,

    #[error("no home directory found")]
    NoHomeDirectory,

    #[error("missing required file: {0}")]
    MissingFile(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("TOML deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}
