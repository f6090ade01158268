//! Site configuration.
//!
//! Settings are read from `template-finder.toml` in the working directory, or
//! from the file given with `--config`. Every key is optional:
//!
//! ```toml
//! # Document roots, searched in order. Relative entries are resolved against
//! # the directory containing this file.
//! roots = ["templates", "shared/templates"]
//!
//! [serve]
//! interface = "127.0.0.1"
//! port = 8000
//! ```
//!
//! A missing default file means defaults; a missing file that was named
//! explicitly is an error.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_ROOT_DIR, DEFAULT_SERVE_INTERFACE, DEFAULT_SERVE_PORT,
};
use crate::core::{DocumentRoot, FinderError};

/// Contents of `template-finder.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    /// Document root directories in search order.
    #[serde(default = "default_roots")]
    pub roots: Vec<PathBuf>,

    /// Settings for `template-finder serve`.
    #[serde(default)]
    pub serve: ServeConfig,

    /// Directory relative roots are resolved against.
    #[serde(skip)]
    base_dir: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServeConfig {
    #[serde(default = "default_interface")]
    pub interface: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            interface: default_interface(),
            port: default_port(),
        }
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            roots: default_roots(),
            serve: ServeConfig::default(),
            base_dir: PathBuf::from("."),
        }
    }
}

fn default_roots() -> Vec<PathBuf> {
    vec![PathBuf::from(DEFAULT_ROOT_DIR)]
}

fn default_interface() -> String {
    DEFAULT_SERVE_INTERFACE.to_string()
}

const fn default_port() -> u16 {
    DEFAULT_SERVE_PORT
}

impl SiteConfig {
    /// Load the configuration named on the command line, or the default file.
    ///
    /// # Errors
    ///
    /// Returns an error if `explicit` is given but missing, or if the file
    /// cannot be read or parsed.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(FinderError::ConfigError {
                        message: format!("config file not found: {}", path.display()),
                    }
                    .into());
                }
                Self::load_from(path)
            }
            None => {
                let path = Path::new(DEFAULT_CONFIG_FILE);
                if path.is_file() {
                    Self::load_from(path)
                } else {
                    debug!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    Ok(Self::default())
                }
            }
        }
    }

    /// Load configuration from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid configuration.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let mut config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        config.base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        debug!("Loaded config from {} ({} root(s))", path.display(), config.roots.len());
        Ok(config)
    }

    /// Build the document root, preferring `overrides` over configured roots.
    ///
    /// Override directories are used as given; configured relative roots are
    /// resolved against the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns [`FinderError::ConfigError`] if no root is left.
    pub fn document_root(&self, overrides: &[PathBuf]) -> Result<DocumentRoot, FinderError> {
        let dirs: Vec<PathBuf> = if overrides.is_empty() {
            self.roots
                .iter()
                .map(|root| if root.is_absolute() { root.clone() } else { self.base_dir.join(root) })
                .collect()
        } else {
            overrides.to_vec()
        };

        for dir in &dirs {
            if !dir.is_dir() {
                warn!("Document root {} is not a directory", dir.display());
            }
        }

        DocumentRoot::new(dirs)
    }
}
