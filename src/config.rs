//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/atomtree/atomtree.toml`
//! 3. Explicit config file (e.g. `--config`)
//! 4. Environment variables: `ATOMTREE_*` prefix, `__` between sections
//!    (`ATOMTREE_BINARY__MAX_BYTES=1048576`)

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::codec::{BinaryCodec, DEFAULT_INDENT, DEFAULT_MAX_BYTES, DEFAULT_MAX_DEPTH};
use crate::domain::ids::{self, HumanIdGenerator, SharedGenerator, UuidGenerator};

pub const ENV_PREFIX: &str = "ATOMTREE";

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {message}")]
    Config { message: String },
}

/// Which generator supplies ids for atoms created without one.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Timestamp + random digits
    #[default]
    Human,
    /// UUID v4
    Uuid,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct IdSettings {
    pub strategy: IdStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JsonSettings {
    /// Spaces per level for pretty output
    pub indent: usize,
}

impl Default for JsonSettings {
    fn default() -> Self {
        Self {
            indent: DEFAULT_INDENT,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BinarySettings {
    /// Upper bound for one encode/decode
    pub max_bytes: u64,
    /// Deepest tree, in atom levels, for one encode/decode
    pub max_depth: usize,
}

impl Default for BinarySettings {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Unified configuration for atomtree.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub ids: IdSettings,
    pub json: JsonSettings,
    pub binary: BinarySettings,
}

/// Get the XDG config directory for atomtree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "atomtree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("atomtree.toml"))
}

impl Settings {
    /// Load settings with layered precedence from the process environment.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        Self::build(explicit, Environment::with_prefix(ENV_PREFIX))
    }

    /// Like [`Settings::load`], but environment overrides are read from `vars`
    /// instead of the process environment.
    pub fn load_with_env(
        explicit: Option<&Path>,
        vars: HashMap<String, String>,
    ) -> Result<Self, SettingsError> {
        Self::build(explicit, Environment::with_prefix(ENV_PREFIX).source(Some(vars)))
    }

    #[instrument(level = "debug", skip(env))]
    fn build(explicit: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let defaults = Settings::default();

        // 1. Compiled defaults
        let mut builder = Config::builder()
            .set_default("ids.strategy", "human")
            .map_err(config_err)?
            .set_default("json.indent", defaults.json.indent as i64)
            .map_err(config_err)?
            .set_default("binary.max_bytes", defaults.binary.max_bytes as i64)
            .map_err(config_err)?
            .set_default("binary.max_depth", defaults.binary.max_depth as i64)
            .map_err(config_err)?;

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                builder = builder.add_source(File::from(global_path).required(false));
            }
        }

        // 3. Explicit config must exist
        if let Some(path) = explicit {
            debug!("explicit config: {}", path.display());
            builder = builder.add_source(File::from(path.to_path_buf()).required(true));
        }

        // 4. Environment overrides
        builder = builder.add_source(
            env.prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().map_err(config_err)?;
        config.try_deserialize().map_err(config_err)
    }

    pub fn binary_codec(&self) -> BinaryCodec {
        BinaryCodec::new(self.binary.max_bytes).with_max_depth(self.binary.max_depth)
    }

    pub fn id_generator(&self) -> SharedGenerator {
        match self.ids.strategy {
            IdStrategy::Human => SharedGenerator::new(HumanIdGenerator),
            IdStrategy::Uuid => SharedGenerator::new(UuidGenerator),
        }
    }

    /// Make the configured id generator the process-wide default.
    pub fn install_id_generator(&self) {
        ids::set_default_generator(self.id_generator());
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, SettingsError> {
        toml::to_string_pretty(self).map_err(|e| SettingsError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# atomtree configuration
#
# Locations (by precedence, lowest to highest):
#   Global:   ~/.config/atomtree/atomtree.toml
#   Explicit: --config <file>
#   Env:      ATOMTREE_* environment variables (ATOMTREE_JSON__INDENT=4)

[ids]
# Generator for atoms created without an id: "human" or "uuid"
# strategy = "human"

[json]
# Spaces per indentation level for pretty output
# indent = 2

[binary]
# Upper bound in bytes for a single encode or decode
# max_bytes = 67108864
# Deepest tree in atom levels for a single encode or decode
# max_depth = 128
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> SettingsError {
    SettingsError::Config {
        message: e.to_string(),
    }
}
