use anyhow::{Context, Result, bail};
use log::info;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_BIND: &str = "127.0.0.1:8501";
pub const DEFAULT_MODEL_PATH: &str = "model/titanic_survival_model.json";

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub model: ModelConfig,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            workers: 4,
        }
    }
}

impl ServerConfig {
    /// Worker thread count, never zero.
    pub fn worker_count(&self) -> usize {
        self.workers.max(1)
    }
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct ModelConfig {
    pub path: PathBuf,
    /// Hex SHA-256 the artifact must match.
    pub sha256: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_MODEL_PATH),
            sha256: None,
        }
    }
}

/// Load configuration from `explicit` if given (must exist), otherwise from
/// `<config_dir>/titanic-predictor/config.toml` if present, otherwise defaults.
pub fn load_config(explicit: Option<&Path>) -> Result<Config> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("config file {} does not exist", path.display());
        }
        return read_config(path);
    }

    let Some(config_dir) = dirs::config_dir() else {
        return Ok(Config::default());
    };

    let config_path = config_dir.join("titanic-predictor").join("config.toml");
    if !config_path.exists() {
        return Ok(Config::default());
    }

    read_config(&config_path)
}

fn read_config(path: &Path) -> Result<Config> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    info!("using config {}", path.display());
    Ok(config)
}
