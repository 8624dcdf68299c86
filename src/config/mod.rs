//! Configuration module
//!
//! Handles loading and saving Igni client configuration. The render
//! bootstrap never reads the environment on its own; callers build a
//! [`RenderConfig`] (from a file, from `IGNI_RENDER_SRV`, or by hand) and
//! pass it in.

use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the render service socket path
pub const RENDER_SERVER_ENV: &str = "IGNI_RENDER_SRV";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Render server address not configured (set IGNI_RENDER_SRV)")]
    MissingRenderServer,

    #[error("Hit server address not configured")]
    MissingHitServer,
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Main client configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Render service settings
    #[serde(default)]
    pub render: RenderConfig,

    /// Hit service settings
    #[serde(default)]
    pub hit: HitConfig,
}

/// Render service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Socket path of the render server
    pub server: Option<PathBuf>,
}

impl RenderConfig {
    pub fn new(server: impl Into<PathBuf>) -> Self {
        Self {
            server: Some(server.into()),
        }
    }

    /// Read the server address from `IGNI_RENDER_SRV`
    pub fn from_env() -> Self {
        Self::from_var(std::env::var_os(RENDER_SERVER_ENV))
    }

    fn from_var(value: Option<OsString>) -> Self {
        Self {
            server: value.filter(|v| !v.is_empty()).map(PathBuf::from),
        }
    }

    /// The configured server address, or an error if there is none
    pub fn server_address(&self) -> ConfigResult<&Path> {
        self.server
            .as_deref()
            .ok_or(ConfigError::MissingRenderServer)
    }
}

/// Hit service configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HitConfig {
    /// Socket path of the hit server
    pub server: Option<PathBuf>,
}

impl HitConfig {
    pub fn new(server: impl Into<PathBuf>) -> Self {
        Self {
            server: Some(server.into()),
        }
    }

    pub fn server_address(&self) -> ConfigResult<&Path> {
        self.server.as_deref().ok_or(ConfigError::MissingHitServer)
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load configuration from the default location
    pub fn load_default() -> ConfigResult<Self> {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("igni/config.toml")),
            Some(PathBuf::from("./igni.toml")),
        ];

        Self::load_first(config_paths.iter().flatten())
    }

    /// Load the first existing file of `paths`
    fn load_first<'a>(paths: impl IntoIterator<Item = &'a PathBuf>) -> ConfigResult<Self> {
        for path in paths {
            if path.exists() {
                return Self::load(path);
            }
        }

        // Return default config if no file found
        Ok(Self::default())
    }

    /// Configuration taken from the environment alone
    pub fn from_env() -> Self {
        Self {
            render: RenderConfig::from_env(),
            ..Default::default()
        }
    }

    /// Let `IGNI_RENDER_SRV` override the render server address, if set
    pub fn with_env_overrides(self) -> Self {
        self.with_render_override(RenderConfig::from_env())
    }

    fn with_render_override(mut self, render: RenderConfig) -> Self {
        if let Some(server) = render.server {
            self.render.server = Some(server);
        }
        self
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        let contents = toml::to_string_pretty(self)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        std::fs::write(path, contents)?;
        Ok(())
    }
}

/// Generate a sample configuration file
pub fn generate_sample_config() -> ConfigResult<String> {
    let config = Config {
        render: RenderConfig::new("/run/igni/render.sock"),
        hit: HitConfig::new("/run/igni/hit.sock"),
    };

    Ok(toml::to_string_pretty(&config)?)
}
