//! Storage configuration and products folder resolution
//!
//! Resolution order for both the config file and the products folder:
//! 1. Command-line argument
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default

use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Environment variable naming the config file
pub const CONFIG_ENV_VAR: &str = "WM_STORAGE_CONFIG";

/// Environment variable naming the products folder
pub const PRODUCTS_DIR_ENV_VAR: &str = "WM_PRODUCTS_DIR";

const APP_DIR: &str = "weldmaster";
const CONFIG_FILE: &str = "storage.toml";

/// Default buffer of the lazy parameter set loader channel
pub const DEFAULT_LOADER_CHANNEL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventsConfig {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}

impl Default for EventsConfig {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoaderConfig {
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,
}

fn default_channel_capacity() -> usize {
    DEFAULT_LOADER_CHANNEL_CAPACITY
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
        }
    }
}

/// Contents of `storage.toml`; every section is optional
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub products_dir: Option<PathBuf>,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub events: EventsConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
}

impl StorageConfig {
    /// Parse a TOML config file
    pub fn from_file(path: &Path) -> Result<StorageConfig> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Load the resolved config file, falling back to defaults
    ///
    /// A missing or unreadable file is not fatal.
    pub fn load(cli_arg: Option<&Path>) -> StorageConfig {
        let Some(path) = resolve_config_path(cli_arg) else {
            debug!("No storage config file found, using defaults");
            return StorageConfig::default();
        };
        match StorageConfig::from_file(&path) {
            Ok(config) => {
                debug!(path = %path.display(), "Loaded storage config");
                config
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring storage config");
                StorageConfig::default()
            }
        }
    }
}

/// Config file location, `None` when no candidate exists
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    default_config_path().filter(|path| path.exists())
}

/// `<config dir>/weldmaster/storage.toml` for the platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Products folder following the resolution order
pub fn resolve_products_dir(cli_arg: Option<&Path>, config: &StorageConfig) -> PathBuf {
    if let Some(path) = cli_arg {
        return path.to_path_buf();
    }
    if let Ok(path) = std::env::var(PRODUCTS_DIR_ENV_VAR) {
        return PathBuf::from(path);
    }
    if let Some(path) = &config.products_dir {
        return path.clone();
    }
    default_products_dir()
}

fn default_products_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join(APP_DIR).join("products"))
        .unwrap_or_else(|| PathBuf::from(APP_DIR).join("products"))
}

/// Write `contents` to `path` through a sibling temp file and a rename
///
/// Readers see either the old or the new file, never a partial write.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let mut temp_name = path.as_os_str().to_os_string();
    temp_name.push(".tmp");
    let temp_path = PathBuf::from(temp_name);

    let result = (|| -> Result<()> {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents)?;
        file.sync_all()?;
        Ok(())
    })();
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e);
    }
    fs::rename(&temp_path, path).map_err(|e| {
        let _ = fs::remove_file(&temp_path);
        Error::Io(e)
    })
}

/// Serialize `config` and write it atomically, creating parent folders
///
/// On Unix the file is restricted to the owner (0600).
pub fn write_toml_config(config: &StorageConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    write_atomic(path, content.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_for_empty_file() {
        let config: StorageConfig = toml::from_str("").unwrap();
        assert_eq!(config, StorageConfig::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.events.capacity, DEFAULT_EVENT_CAPACITY);
        assert_eq!(config.loader.channel_capacity, DEFAULT_LOADER_CHANNEL_CAPACITY);
    }

    #[test]
    fn test_partial_sections() {
        let config: StorageConfig = toml::from_str(
            "products_dir = \"/srv/products\"\n[logging]\nlevel = \"debug\"\n[events]\ncapacity = 8\n",
        )
        .unwrap();
        assert_eq!(config.products_dir, Some(PathBuf::from("/srv/products")));
        assert_eq!(config.logging.level, "debug");
        assert!(config.logging.file.is_none());
        assert_eq!(config.events.capacity, 8);
        assert_eq!(config.loader, LoaderConfig::default());
    }

    #[test]
    fn test_write_atomic_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("data.json");
        write_atomic(&target, b"first").unwrap();
        write_atomic(&target, b"second").unwrap();
        assert_eq!(fs::read_to_string(&target).unwrap(), "second");
        assert!(!temp_dir.path().join("data.json.tmp").exists());
    }

    #[test]
    fn test_cli_argument_wins() {
        let config = StorageConfig {
            products_dir: Some(PathBuf::from("/from/toml")),
            ..Default::default()
        };
        let dir = resolve_products_dir(Some(Path::new("/from/cli")), &config);
        assert_eq!(dir, PathBuf::from("/from/cli"));
    }

    #[test]
    fn test_from_file_reports_parse_errors() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("storage.toml");
        fs::write(&path, "events = 3").unwrap();
        assert!(matches!(StorageConfig::from_file(&path), Err(Error::Config(_))));
    }
}
