use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::version::key::VersionKey;
use crate::version::resolver::{DEFAULT_PARTS, UpdateOptions};

// =============================================================================
// Time-related constants
// =============================================================================

/// Default lifetime of a cached index in milliseconds (24 hours)
pub const DEFAULT_REFRESH_INTERVAL_MS: i64 = 24 * 60 * 60 * 1000;

/// Timeout for fetch operations in milliseconds (30 seconds)
pub const FETCH_TIMEOUT_MS: u64 = 30_000;

// =============================================================================
// Remote indexes
// =============================================================================

/// Root of the prebuilt rubies served to Travis CI
pub const TRAVIS_ROOT_URL: &str = "https://rubies.travis-ci.org/";

/// Versions RVM knows how to install
pub const RVM_KNOWN_STRINGS_URL: &str =
    "https://raw.githubusercontent.com/rvm/rvm/stable/config/known_strings";

/// Configuration file checked when no path is given
pub const DEFAULT_TRAVIS_YML: &str = ".travis.yml";

/// Tool configuration, read from an optional JSON file
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    pub update: UpdateConfig,
    pub cache: CacheConfig,
    pub sources: SourcesConfig,
}

/// Candidate selection settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpdateConfig {
    /// Granularities (number of leading version parts kept)
    pub parts: Vec<usize>,
    pub allow_pre: bool,
    pub intermediary: bool,
    /// Versions whose lines should never be suggested
    pub exclude: Vec<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            parts: DEFAULT_PARTS.to_vec(),
            allow_pre: false,
            intermediary: true,
            exclude: Vec::new(),
        }
    }
}

impl UpdateConfig {
    pub fn to_options(&self) -> UpdateOptions {
        UpdateOptions {
            parts: self.parts.clone(),
            allow_pre: self.allow_pre,
            intermediary: self.intermediary,
            exclude: self.exclude.iter().map(|s| VersionKey::parse(s)).collect(),
        }
    }
}

/// Cache-related configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    pub enabled: bool,
    /// Cache refresh interval in milliseconds
    pub refresh_interval: i64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            refresh_interval: DEFAULT_REFRESH_INTERVAL_MS,
        }
    }
}

/// Version source configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct SourcesConfig {
    pub travis: TravisSourceConfig,
    pub rvm: SourceConfig,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct TravisSourceConfig {
    pub enabled: bool,
    /// Platform directory under the index root, detected when absent
    pub base_url: Option<String>,
}

impl Default for TravisSourceConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SourceConfig {
    pub enabled: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl Config {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

/// Whether the process runs inside a Travis CI build
pub fn on_travis() -> bool {
    on_travis_with_env(std::env::var_os("TRAVIS"))
}

/// Returns the path to the cache directory for travis-rubies.
/// Uses $XDG_CACHE_HOME/travis-rubies if XDG_CACHE_HOME is set,
/// otherwise falls back to ~/.cache/travis-rubies,
/// or ./travis-rubies if neither is available.
pub fn cache_dir() -> PathBuf {
    cache_dir_with_env(std::env::var("XDG_CACHE_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the database file.
pub fn db_path() -> PathBuf {
    cache_dir().join("indexes.db")
}

fn on_travis_with_env(travis: Option<OsString>) -> bool {
    travis.is_some()
}

fn cache_dir_with_env(xdg_cache_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let cache_dir = xdg_cache_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".cache")))
        .unwrap_or_else(|| PathBuf::from("."));

    cache_dir.join("travis-rubies")
}
