use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{CellsealError, CellsealResult};

/// Top-level configuration (loaded from cellseal.toml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CellsealConfig {
    pub keys: KeysConfig,
    pub log: LogConfig,
    pub store: StoreConfig,
    /// Warn if the config file is world-readable (default: true)
    #[serde(default = "default_true")]
    pub config_file_mode_check: bool,
}

fn default_true() -> bool {
    true
}

impl Default for CellsealConfig {
    fn default() -> Self {
        Self {
            keys: KeysConfig::default(),
            log: LogConfig::default(),
            store: StoreConfig::default(),
            config_file_mode_check: default_true(),
        }
    }
}

/// How a primary key that is not exactly 32 bytes is treated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimaryKeyPolicy {
    /// Reject anything but 32 bytes
    #[default]
    Strict,
    /// NUL-pad short keys and truncate long ones (historical cipher binding)
    LegacyPad,
}

/// Where the MAC authentication secret comes from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthMode {
    /// Caller passes the secret on every encrypt/decrypt call
    #[default]
    PerCall,
    /// Secret is loaded once and held by the box (replaceable at runtime)
    Held,
}

/// MAC key derivation applied to the authentication secret
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MacDerivation {
    /// hex(RIPEMD-128(secret)); required to read existing envelopes
    #[default]
    LegacyRipemd128,
    /// HKDF-SHA-512; for newly provisioned deployments only
    HkdfSha512,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KeysConfig {
    /// Environment variable holding the primary key (checked first)
    pub primary_key_env: String,
    /// File holding the primary key
    pub primary_key_file: Option<PathBuf>,
    /// Inline primary key; discouraged, logged as a warning when used
    pub primary_key: Option<String>,
    pub primary_key_policy: PrimaryKeyPolicy,
    pub auth_mode: AuthMode,
    /// Environment variable holding the held auth secret
    pub auth_secret_env: String,
    /// Inline held auth secret
    pub auth_secret: Option<String>,
    pub mac_derivation: MacDerivation,
    /// Accept an empty auth secret ("no authentication context" mode)
    pub allow_empty_auth_secret: bool,
}

impl Default for KeysConfig {
    fn default() -> Self {
        Self {
            primary_key_env: "CELLSEAL_PRIMARY_KEY".into(),
            primary_key_file: None,
            primary_key: None,
            primary_key_policy: PrimaryKeyPolicy::default(),
            auth_mode: AuthMode::default(),
            auth_secret_env: "CELLSEAL_AUTH_SECRET".into(),
            auth_secret: None,
            mac_derivation: MacDerivation::default(),
            allow_empty_auth_secret: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level (default: info)
    pub level: String,
    /// Log format: "json" or "text"
    pub format: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "text".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// JSON file backing the column store
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("~/.local/share/cellseal/store.json"),
        }
    }
}

impl CellsealConfig {
    /// Load configuration from `path`, falling back to defaults when the file
    /// does not exist.
    ///
    /// Does not log the permission check; call [`Self::warn_if_world_readable`]
    /// once a subscriber is installed.
    pub fn load(path: &Path) -> CellsealResult<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: CellsealConfig = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject combinations that cannot produce a working box.
    pub fn validate(&self) -> CellsealResult<()> {
        if self.keys.primary_key_env.is_empty()
            && self.keys.primary_key_file.is_none()
            && self.keys.primary_key.is_none()
        {
            return Err(CellsealError::Config(
                "no primary key source configured".into(),
            ));
        }
        if !matches!(self.log.format.as_str(), "text" | "json") {
            return Err(CellsealError::Config(format!(
                "unknown log format '{}' (expected \"text\" or \"json\")",
                self.log.format
            )));
        }
        Ok(())
    }

    /// Warn when the config file at `path` is world-readable, unless
    /// `config_file_mode_check` is off. Returns whether a warning was issued.
    pub fn warn_if_world_readable(&self, path: &Path) -> bool {
        if !self.config_file_mode_check {
            return false;
        }
        match world_readable_mode(path) {
            Some(mode) => {
                tracing::warn!(
                    path = %path.display(),
                    mode = %format!("{mode:o}"),
                    "config file is world-readable; it may contain key material"
                );
                true
            }
            None => false,
        }
    }
}

/// Permission bits of `path` when other users can read it.
#[cfg(unix)]
pub fn world_readable_mode(path: &Path) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;

    let mode = std::fs::metadata(path).ok()?.permissions().mode() & 0o777;
    (mode & 0o004 != 0).then_some(mode)
}

#[cfg(not(unix))]
pub fn world_readable_mode(_path: &Path) -> Option<u32> {
    None
}
