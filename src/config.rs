//! Configuration module for the archive pipelines.
//!
//! This module provides a layered configuration system that supports:
//! - Default values
//! - TOML configuration file
//! - Environment variable overrides
//! - CLI argument overrides
//!
//! # Environment Variables
//!
//! Environment variables must be prefixed with `VP_` and use double underscores
//! to separate nested levels:
//! - `VP_LOGGING__LEVEL=debug` sets `logging.level`
//! - `VP_ARCHIVE__BINARY_BY_DEFAULT=true` sets `archive.binary_by_default`
//! - `VP_SIMILARITY__NORMALIZE=true` sets `similarity.normalize`

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::archive::WriterOptions;
use crate::pipeline::SimilarityOptions;

const CONFIG_DIR: &str = ".vecpipe";
const CONFIG_FILE: &str = "settings.toml";

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Settings {
    /// Version of the configuration schema
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub logging: LoggingConfig,

    /// Defaults for archive locators that leave the format open
    #[serde(default)]
    pub archive: ArchiveConfig,

    #[serde(default)]
    pub similarity: SimilarityConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LoggingConfig {
    /// One of trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct ArchiveConfig {
    /// Write binary when a locator names neither `t` nor `b`
    #[serde(default)]
    pub binary_by_default: bool,

    /// Flush after every record when a locator doesn't say
    #[serde(default)]
    pub flush_each_write: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct SimilarityConfig {
    /// L2-normalize vectors before scoring
    #[serde(default)]
    pub normalize: bool,
}

fn default_version() -> u32 {
    1
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: default_version(),
            logging: LoggingConfig::default(),
            archive: ArchiveConfig::default(),
            similarity: SimilarityConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl ArchiveConfig {
    pub fn writer_options(&self) -> WriterOptions {
        WriterOptions {
            binary_by_default: self.binary_by_default,
            flush_each_write: self.flush_each_write,
        }
    }
}

impl SimilarityConfig {
    pub fn options(&self) -> SimilarityOptions {
        SimilarityOptions {
            normalize: self.normalize,
        }
    }
}

/// `VP_`-prefixed variables, with `__` separating nested keys.
fn env_provider() -> Env {
    Env::prefixed("VP_").map(|key| key.as_str().to_lowercase().replace("__", ".").into())
}

impl Settings {
    /// Load configuration from all sources
    pub fn load() -> Result<Self, Box<figment::Error>> {
        let config_path = Self::find_workspace_config()
            .unwrap_or_else(|| PathBuf::from(CONFIG_DIR).join(CONFIG_FILE));
        Self::load_from(config_path)
    }

    /// Load configuration with `path` as the TOML layer.
    ///
    /// A missing file is not an error; defaults and environment still apply.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, Box<figment::Error>> {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(env_provider())
            .extract()
            .map_err(Box::new)
    }

    /// Find the nearest `.vecpipe/settings.toml`, searching from the current
    /// directory up to the root
    pub fn find_workspace_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;

        for ancestor in current.ancestors() {
            let config_dir = ancestor.join(CONFIG_DIR);
            if config_dir.is_dir() {
                return Some(config_dir.join(CONFIG_FILE));
            }
        }

        None
    }

    /// Save current configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), Box<dyn std::error::Error>> {
        let parent = path.as_ref().parent().ok_or("Invalid path")?;
        std::fs::create_dir_all(parent)?;

        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;

        Ok(())
    }

    /// Create a default settings file with comments under `dir`
    pub fn init_config_file(
        dir: impl AsRef<Path>,
        force: bool,
    ) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let config_path = dir.as_ref().join(CONFIG_DIR).join(CONFIG_FILE);

        if !force && config_path.exists() {
            return Err("Configuration file already exists. Use --force to overwrite".into());
        }

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let defaults = Settings::default();
        let template = format!(
            r#"# vecpipe configuration file

# Version of the configuration schema
version = {version}

[logging]
# trace, debug, info, warn or error. -v and -q on the command line win.
level = "{level}"

[archive]
# Format for write locators without a t or b option. Bare paths with
# this off are written as text, "ark:" locators are always binary.
binary_by_default = {binary}

# Flush output after every record unless the locator says otherwise
flush_each_write = {flush}

[similarity]
# Score cosine similarity instead of raw dot products
normalize = {normalize}
"#,
            version = defaults.version,
            level = defaults.logging.level,
            binary = defaults.archive.binary_by_default,
            flush = defaults.archive.flush_each_write,
            normalize = defaults.similarity.normalize,
        );

        std::fs::write(&config_path, template)?;
        Ok(config_path)
    }
}
