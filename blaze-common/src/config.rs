//! Configuration file resolution and loading
//!
//! The config file is optional. It is located in priority order:
//! 1. Explicit path (command line)
//! 2. Environment variable
//! 3. `<user config dir>/blaze/config.toml` if it exists
//!
//! Values found in the file sit below command line and environment values and
//! above compiled defaults; merging is done by the caller.

use crate::{Error, Result};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Directory name under the platform config dir
const APP_DIR: &str = "blaze";

/// File name looked up in the platform config dir
const CONFIG_FILE: &str = "config.toml";

/// Locate the config file, if any
///
/// An explicit path or environment path is returned even when it does not
/// exist, so that loading reports the typo instead of silently ignoring it.
pub fn resolve_config_file(explicit: Option<&Path>, env_var_name: &str) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(env_var_name) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    let user_config = dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))?;
    if user_config.exists() {
        Some(user_config)
    } else {
        debug!("No config file at {}", user_config.display());
        None
    }
}

/// Parse a TOML config file into `T`
pub fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
}

/// Resolve and load the config file, falling back to `T::default()`
///
/// A missing config file is normal. A file that exists but fails to parse is
/// an error.
pub fn load_or_default<T: DeserializeOwned + Default>(
    explicit: Option<&Path>,
    env_var_name: &str,
) -> Result<T> {
    match resolve_config_file(explicit, env_var_name) {
        Some(path) if path.exists() => {
            debug!("Loading config file {}", path.display());
            load_toml(&path)
        }
        Some(path) => Err(Error::Config(format!(
            "Config file not found: {}",
            path.display()
        ))),
        None => {
            info!("No config file found; using environment and defaults");
            Ok(T::default())
        }
    }
}
