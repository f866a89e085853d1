//! Application configuration for UserDB.
//!
//! User config lives at `~/.userdb/userdb.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, UserDbError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "userdb.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".userdb";

// ---------------------------------------------------------------------------
// Config structs (matching userdb.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Registry endpoints.
    #[serde(default)]
    pub sources: SourcesConfig,

    /// HTTP client timeouts.
    #[serde(default)]
    pub http: HttpConfig,

    /// Feed sanity thresholds.
    #[serde(default)]
    pub sanity: SanityConfig,
}

/// Output layout written by the CLI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Length-prefixed layout read by md380tools.
    #[default]
    Md380Tools,
    /// Plain layout read by the MD-2017 CPS.
    Md2017,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Layout used when the CLI is not told otherwise.
    #[serde(default)]
    pub format: OutputFormat,
}

/// `[sources]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Hand-maintained corrections (unquoted `id,callsign`).
    #[serde(default = "default_fixed_url")]
    pub fixed_url: Url,

    /// ham-digital.org quoted CSV.
    #[serde(default = "default_hamdigital_url")]
    pub hamdigital_url: Url,

    /// radioid.net quoted CSV.
    #[serde(default = "default_radioid_url")]
    pub radioid_url: Url,

    /// Reflector list (`id@callsign@...`).
    #[serde(default = "default_reflector_url")]
    pub reflector_url: Url,

    /// JSON directory of special-registry nodes.
    #[serde(default = "default_special_directory_url")]
    pub special_directory_url: Url,

    /// Path requested from every special node.
    #[serde(default = "default_special_path")]
    pub special_path: String,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            fixed_url: default_fixed_url(),
            hamdigital_url: default_hamdigital_url(),
            radioid_url: default_radioid_url(),
            reflector_url: default_reflector_url(),
            special_directory_url: default_special_directory_url(),
            special_path: default_special_path(),
        }
    }
}

fn builtin_url(s: &str) -> Url {
    Url::parse(s).expect("built-in URL is valid")
}
fn default_fixed_url() -> Url {
    builtin_url("https://raw.githubusercontent.com/travisgoodspeed/md380tools/master/db/fixed.csv")
}
fn default_hamdigital_url() -> Url {
    builtin_url("https://ham-digital.org/status/users_quoted.csv")
}
fn default_radioid_url() -> Url {
    builtin_url("https://www.radioid.net/static/users_quoted.csv")
}
fn default_reflector_url() -> Url {
    builtin_url("http://registry.dstar.su/reflector.db")
}
fn default_special_directory_url() -> Url {
    builtin_url("http://registry.dstar.su/api/node.php")
}
fn default_special_path() -> String {
    "md380tools/special_IDs.csv".into()
}

/// `[http]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect and TLS handshake bound, in seconds.
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    /// Whole-request bound, in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout_secs: default_connect_timeout(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    20
}
fn default_request_timeout() -> u64 {
    300
}

/// `[sanity]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SanityConfig {
    /// Minimum line count accepted from each quoted CSV feed.
    #[serde(default = "default_min_quoted_lines")]
    pub min_quoted_lines: usize,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            min_quoted_lines: default_min_quoted_lines(),
        }
    }
}

fn default_min_quoted_lines() -> usize {
    50_000
}

impl AppConfig {
    /// Reject values that would make every run fail.
    pub fn validate(&self) -> Result<()> {
        if self.http.connect_timeout_secs == 0 || self.http.request_timeout_secs == 0 {
            return Err(UserDbError::config("HTTP timeouts must be greater than zero"));
        }
        if self.sources.special_path.trim_matches('/').is_empty() {
            return Err(UserDbError::config("sources.special_path must not be empty"));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.userdb/`).
pub fn config_dir() -> Result<PathBuf> {
    let home =
        dirs::home_dir().ok_or_else(|| UserDbError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.userdb/userdb.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| UserDbError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content)
        .map_err(|e| UserDbError::config(format!("failed to parse {}: {e}", path.display())))?;
    config.validate()?;
    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| UserDbError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| UserDbError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| UserDbError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
