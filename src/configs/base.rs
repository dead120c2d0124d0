use serde::{Deserialize, Serialize};

use crate::configs::*;

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct Config {
  #[serde(default)]
  pub server: ServerConfig,
  pub logging: Option<LoggingConfig>,
  #[serde(default)]
  pub youtube: YouTubeConfig,
  #[serde(default)]
  pub fetch: FetchConfig,
  #[serde(default)]
  pub relay: RelayConfig,
  #[serde(default)]
  pub search: SearchConfig,
}

use crate::common::types::AnyResult;

impl Config {
  /// Loads `config.toml`, then `config.default.toml`. Returns `Ok(None)` when
  /// neither file exists so the caller can fall back to built-in defaults.
  pub fn load() -> AnyResult<Option<Self>> {
    let config_path = if std::path::Path::new("config.toml").exists() {
      "config.toml"
    } else if std::path::Path::new("config.default.toml").exists() {
      "config.default.toml"
    } else {
      return Ok(None);
    };

    println!("Loading configuration from: {}", config_path);

    let config_str = std::fs::read_to_string(config_path)?;
    if config_str.is_empty() {
      return Err(format!("{} is empty", config_path).into());
    }

    Self::from_toml(&config_str).map(Some)
  }

  pub fn from_toml(raw: &str) -> AnyResult<Self> {
    let config: Config = toml::from_str(raw)?;
    Ok(config)
  }
}
