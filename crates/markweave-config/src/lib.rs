use markweave_engine::{
    ParseOptions, Registry, RegistryBuilder, SetupError,
    extensions::{self, Extension},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Unknown extension '{name}' (available: {available})")]
    UnknownExtension { name: String, available: String },

    #[error("Failed to set up parser: {0}")]
    Setup(#[from] SetupError),
}

/// Global parse switches, the `[parse]` table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseSection {
    pub track_positions: bool,
    pub force_tight_lists: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub parse: ParseSection,
    /// Names of enabled extensions, in registration order.
    pub extensions: Vec<String>,
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        log::debug!(
            "loaded config from {} ({} extensions)",
            config_path.display(),
            config.extensions.len()
        );
        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/markweave");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    /// Expands `~` and environment variables in a user-supplied path.
    pub fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }

    /// Enables an extension unless it is already listed.
    pub fn enable(&mut self, name: &str) {
        if !self.extensions.iter().any(|n| n == name) {
            self.extensions.push(name.to_string());
        }
    }

    /// Resolves the configured extension names.
    pub fn resolve_extensions(&self) -> Result<Vec<&'static dyn Extension>, ConfigError> {
        self.extensions
            .iter()
            .map(|name| {
                extensions::by_name(name).ok_or_else(|| ConfigError::UnknownExtension {
                    name: name.clone(),
                    available: extensions::names().collect::<Vec<_>>().join(", "),
                })
            })
            .collect()
    }

    /// Core handlers plus every configured extension.
    pub fn registry(&self) -> Result<Registry, ConfigError> {
        let mut builder = RegistryBuilder::new();
        for extension in self.resolve_extensions()? {
            builder.extension(extension)?;
        }
        Ok(builder.build()?)
    }

    /// Parse options from the `[parse]` table, adjusted by extension hooks.
    pub fn options(&self) -> Result<ParseOptions, ConfigError> {
        let mut options = ParseOptions {
            track_positions: self.parse.track_positions,
            force_tight_lists: self.parse.force_tight_lists,
        };
        for extension in self.resolve_extensions()? {
            extension.configure(&mut options);
        }
        Ok(options)
    }
}
