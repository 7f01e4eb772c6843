//! Global Config Module
//!
//! The user-scoped settings live under one application home directory:
//! `$MESONGO_HOME` when set, otherwise the platform data directory. It holds
//! an optional `config.toml` and the `templates/` store.

use crate::error::{Error, Result};
use crate::utils::log::{log, LogLevel};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const HOME_ENV: &str = "MESONGO_HOME";
const CONFIG_FILE: &str = "config.toml";
const TEMPLATES_DIR: &str = "templates";

/// Struct describing the user-scoped tool configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ToolConfig {
    pub descriptor: DescriptorConfig,
    pub tools: ToolsConfig,
    pub sources: SourcesConfig,
    pub search: SearchConfig,
}

/// Which file marks a project root and which variables it declares
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DescriptorConfig {
    pub file: String,
    pub build_dir_var: String,
    pub output_dir_var: String,
    pub output_name_var: String,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        DescriptorConfig {
            file: "meson.build".to_string(),
            build_dir_var: "build_dir_where".to_string(),
            output_dir_var: "output_dir".to_string(),
            output_name_var: "output_name".to_string(),
        }
    }
}

/// Names (or paths) of the external build programs
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolsConfig {
    pub meson: String,
    pub ninja: String,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        ToolsConfig {
            meson: "meson".to_string(),
            ninja: "ninja".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SourcesConfig {
    pub extensions: Vec<String>,
    pub cache_file: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        SourcesConfig {
            extensions: ["cpp", "cxx", "cc", "c"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            cache_file: ".sources_cache".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    pub max_depth: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig { max_depth: 5 }
    }
}

impl ToolConfig {
    /// Loads `config.toml` from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<ToolConfig> {
        if !path.exists() {
            log(
                LogLevel::Debug,
                &format!("No tool config at {}, using defaults", path.display()),
            );
            return Ok(ToolConfig::default());
        }
        let contents = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        ToolConfig::parse(&contents, path)
    }

    /// Parses the TOML text of a tool config; `path` is only used in errors
    pub fn parse(contents: &str, path: &Path) -> Result<ToolConfig> {
        let invalid = |message: String| Error::ToolConfig {
            path: path.to_path_buf(),
            message,
        };
        let config: ToolConfig = toml::from_str(contents).map_err(|e| invalid(e.to_string()))?;
        if config.sources.extensions.is_empty() {
            return Err(invalid("sources.extensions must not be empty".to_string()));
        }
        if config.descriptor.file.is_empty() {
            return Err(invalid("descriptor.file must not be empty".to_string()));
        }
        Ok(config)
    }
}

/// Locations of the application's user-scoped state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppDirs {
    home: PathBuf,
}

impl AppDirs {
    /// Resolves the application home from `MESONGO_HOME` or the platform data directory
    pub fn discover() -> Result<AppDirs> {
        if let Some(home) = std::env::var_os(HOME_ENV).filter(|value| !value.is_empty()) {
            return Ok(AppDirs::at(home));
        }
        ProjectDirs::from("", "", "mesongo")
            .map(|dirs| AppDirs::at(dirs.data_dir()))
            .ok_or(Error::NoHomeDirectory)
    }

    pub fn at(home: impl Into<PathBuf>) -> AppDirs {
        AppDirs { home: home.into() }
    }

    pub fn config_file(&self) -> PathBuf {
        self.home.join(CONFIG_FILE)
    }

    pub fn template_store(&self) -> PathBuf {
        self.home.join(TEMPLATES_DIR)
    }
}
