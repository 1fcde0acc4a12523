//! Configuration loading and data folder resolution
//!
//! Every setting resolves through the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable (`GIFTSCAN_*`)
//! 3. TOML config file
//! 4. Compiled default (fallback)
//!
//! Bad values never abort startup: an unparseable environment variable or
//! config file is logged as a warning and the next priority level applies.

use crate::lookup::ResolverKind;
use crate::storage::StorageKind;
use serde::Deserialize;
use std::path::PathBuf;
use std::str::FromStr;
use tracing::warn;

/// Default HTTP listen port
pub const DEFAULT_PORT: u16 = 8080;

/// Fully resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding the database or JSON store
    pub data_dir: PathBuf,
    /// HTTP listen port
    pub port: u16,
    /// Storage backend selection
    pub storage: StorageKind,
    /// Product resolver selection
    pub resolver: ResolverKind,
}

/// Settings supplied on the command line, all optional
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub data_dir: Option<PathBuf>,
    pub port: Option<u16>,
    pub storage: Option<StorageKind>,
    pub resolver: Option<ResolverKind>,
}

/// Optional settings read from the TOML config file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    pub data_dir: Option<String>,
    pub port: Option<u16>,
    pub storage: Option<String>,
    pub resolver: Option<String>,
}

impl FileConfig {
    /// Load the first config file found, if any
    ///
    /// Candidate locations, in order: the user config directory
    /// (`~/.config/giftscan/config.toml` on Linux), then the system-wide
    /// `/etc/giftscan/config.toml` on Unix. A file that exists but does not
    /// parse is reported and skipped.
    pub fn load() -> Option<FileConfig> {
        for path in candidate_config_paths() {
            if !path.exists() {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(contents) => match toml::from_str::<FileConfig>(&contents) {
                    Ok(config) => return Some(config),
                    Err(e) => {
                        warn!(path = %path.display(), error = %e, "Ignoring unparseable config file");
                    }
                },
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Ignoring unreadable config file");
                }
            }
        }
        None
    }
}

fn candidate_config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        paths.push(dir.join("giftscan").join("config.toml"));
    }
    if cfg!(unix) {
        paths.push(PathBuf::from("/etc/giftscan/config.toml"));
    }
    paths
}

/// OS-dependent default data folder
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("giftscan"))
        .unwrap_or_else(|| PathBuf::from("./giftscan_data"))
}

/// Read an environment variable and parse it, warning on bad values
fn env_parse<T: FromStr>(name: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = std::env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(var = name, value = %raw, error = %e, "Ignoring unparseable environment variable");
            None
        }
    }
}

/// Parse a string from the config file, warning on bad values
fn file_parse<T: FromStr>(key: &str, raw: Option<&str>) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    let raw = raw?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(key, value = %raw, error = %e, "Ignoring unparseable config file value");
            None
        }
    }
}

impl Config {
    /// Resolve the runtime configuration from all sources
    pub fn resolve(overrides: Overrides) -> Config {
        Self::resolve_with(FileConfig::load(), overrides)
    }

    fn resolve_with(file: Option<FileConfig>, overrides: Overrides) -> Config {
        let file = file.unwrap_or_default();

        let data_dir = overrides
            .data_dir
            .or_else(|| std::env::var("GIFTSCAN_DATA_DIR").ok().map(PathBuf::from))
            .or_else(|| file.data_dir.as_ref().map(PathBuf::from))
            .unwrap_or_else(default_data_dir);

        let port = overrides
            .port
            .or_else(|| env_parse::<u16>("GIFTSCAN_PORT"))
            .or(file.port)
            .unwrap_or(DEFAULT_PORT);

        let storage = overrides
            .storage
            .or_else(|| env_parse::<StorageKind>("GIFTSCAN_STORAGE"))
            .or_else(|| file_parse::<StorageKind>("storage", file.storage.as_deref()))
            .unwrap_or(StorageKind::Sqlite);

        let resolver = overrides
            .resolver
            .or_else(|| env_parse::<ResolverKind>("GIFTSCAN_RESOLVER"))
            .or_else(|| file_parse::<ResolverKind>("resolver", file.resolver.as_deref()))
            .unwrap_or(ResolverKind::Catalog);

        Config {
            data_dir,
            port,
            storage,
            resolver,
        }
    }
}
