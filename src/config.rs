use std::fs;
use std::path::PathBuf;

use directories::ProjectDirs;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub windows: WindowsConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct GeneralConfig {
    /// Modes enabled when --modes is not passed.
    #[serde(default = "default_modes")]
    pub modes: Vec<String>,

    /// Command prefix for desktop entries that want a terminal.
    #[serde(default)]
    pub terminal: Option<String>,
}

fn default_modes() -> Vec<String> {
    vec!["drun".to_string(), "run".to_string()]
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            modes: default_modes(),
            terminal: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
pub struct WindowsConfig {
    /// Window classes never shown in the window list.
    #[serde(default = "default_ignore")]
    pub ignore: Vec<String>,

    /// Our own window class, kept out of results and dragged along by
    /// preview.
    #[serde(default = "default_self_id")]
    pub self_id: String,
}

fn default_ignore() -> Vec<String> {
    vec!["polybar".to_string()]
}

fn default_self_id() -> String {
    "swoop".to_string()
}

impl Default for WindowsConfig {
    fn default() -> Self {
        Self {
            ignore: default_ignore(),
            self_id: default_self_id(),
        }
    }
}

fn config_path() -> PathBuf {
    ProjectDirs::from("org", "swoop", "swoop")
        .map(|dirs| dirs.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}

pub fn load_config() -> Result<Config, ConfigError> {
    let path = config_path();
    if !path.exists() {
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}
