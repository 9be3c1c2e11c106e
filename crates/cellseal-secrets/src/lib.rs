//! cellseal-secrets: key material discovery
//!
//! Primary key discovery chain (first hit wins):
//!   1. env var named by `keys.primary_key_env` (default $CELLSEAL_PRIMARY_KEY)
//!   2. `keys.primary_key_file` (trailing newline trimmed)
//!   3. inline `keys.primary_key` in the config file (warns)
//!
//! Held auth secret (only for `auth_mode = "held"`):
//!   1. env var named by `keys.auth_secret_env` (default $CELLSEAL_AUTH_SECRET)
//!   2. inline `keys.auth_secret`

pub mod encoding;

use anyhow::{bail, Context, Result};
use secrecy::{ExposeSecret, SecretSlice};
use std::path::Path;

use cellseal_core::config::{AuthMode, KeysConfig, MacDerivation, PrimaryKeyPolicy};
use cellseal_crypto::{AuthSecret, CryptoBox, MacKeyDerivation, PrimaryKey};

pub use encoding::decode_key_value;

/// Key material resolved from configuration, ready to build a box.
pub struct KeyMaterial {
    primary: SecretSlice<u8>,
    auth_secret: Option<SecretSlice<u8>>,
    config: KeysConfig,
    /// Where the primary key came from (for logs / `config show`)
    pub source: String,
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("source", &self.source)
            .field("auth_mode", &self.config.auth_mode)
            .field("has_auth_secret", &self.auth_secret.is_some())
            .finish()
    }
}

impl KeyMaterial {
    /// Load key material using the process environment.
    pub fn load(config: &KeysConfig) -> Result<Self> {
        Self::load_with(config, |name| std::env::var(name).ok())
    }

    /// Load key material with an explicit environment lookup.
    pub fn load_with(config: &KeysConfig, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let (primary, source) = resolve_primary(config, &env)?;

        let auth_secret = match config.auth_mode {
            AuthMode::Held => Some(resolve_held_secret(config, &env)?),
            AuthMode::PerCall => {
                if config.auth_secret.is_some() {
                    tracing::warn!("auth_secret is set but auth_mode is per-call; ignoring it");
                }
                None
            }
        };

        tracing::debug!(source = %source, auth_mode = ?config.auth_mode, "key material loaded");

        Ok(KeyMaterial {
            primary,
            auth_secret,
            config: config.clone(),
            source,
        })
    }

    /// Build the CryptoBox described by the configuration.
    pub fn into_crypto_box(self) -> Result<CryptoBox> {
        let bytes = self.primary.expose_secret();
        let primary = match self.config.primary_key_policy {
            PrimaryKeyPolicy::Strict => {
                PrimaryKey::from_slice(bytes).context("primary key (policy: strict)")?
            }
            PrimaryKeyPolicy::LegacyPad => PrimaryKey::from_legacy_slice(bytes),
        };

        let derivation = match self.config.mac_derivation {
            MacDerivation::LegacyRipemd128 => MacKeyDerivation::Legacy,
            MacDerivation::HkdfSha512 => MacKeyDerivation::HkdfSha512,
        };

        let mut builder = CryptoBox::builder(primary)
            .derivation(derivation)
            .allow_empty_auth_secret(self.config.allow_empty_auth_secret);

        builder = match (&self.config.auth_mode, &self.auth_secret) {
            (AuthMode::Held, Some(secret)) => {
                let secret = secret.expose_secret();
                if secret.is_empty() && !self.config.allow_empty_auth_secret {
                    bail!(
                        "held auth secret is empty; set allow_empty_auth_secret = true \
                         if no authentication context is intended"
                    );
                }
                builder.held(AuthSecret::from(secret))
            }
            (AuthMode::Held, None) => bail!("auth_mode is held but no auth secret was loaded"),
            (AuthMode::PerCall, _) => builder.per_call(),
        };

        Ok(builder.build())
    }
}

fn resolve_primary(
    config: &KeysConfig,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<(SecretSlice<u8>, String)> {
    if !config.primary_key_env.is_empty() {
        if let Some(value) = env(&config.primary_key_env) {
            let bytes = decode_key_value(&value)
                .with_context(|| format!("decoding ${}", config.primary_key_env))?;
            return Ok((SecretSlice::from(bytes.to_vec()), format!("env:{}", config.primary_key_env)));
        }
    }

    if let Some(path) = &config.primary_key_file {
        let bytes = read_key_file(path)?;
        return Ok((SecretSlice::from(bytes.to_vec()), format!("file:{}", path.display())));
    }

    if let Some(inline) = &config.primary_key {
        tracing::warn!("primary key is stored inline in the config file; prefer an env var or key file");
        let bytes = decode_key_value(inline).context("decoding inline primary_key")?;
        return Ok((SecretSlice::from(bytes.to_vec()), "config".to_string()));
    }

    bail!(
        "no primary key found (checked ${}, primary_key_file, primary_key)",
        config.primary_key_env
    )
}

fn resolve_held_secret(
    config: &KeysConfig,
    env: &impl Fn(&str) -> Option<String>,
) -> Result<SecretSlice<u8>> {
    if !config.auth_secret_env.is_empty() {
        if let Some(value) = env(&config.auth_secret_env) {
            let bytes = decode_key_value(&value)
                .with_context(|| format!("decoding ${}", config.auth_secret_env))?;
            return Ok(SecretSlice::from(bytes.to_vec()));
        }
    }

    if let Some(inline) = &config.auth_secret {
        tracing::warn!("auth secret is stored inline in the config file; prefer an env var");
        let bytes = decode_key_value(inline).context("decoding inline auth_secret")?;
        return Ok(SecretSlice::from(bytes.to_vec()));
    }

    bail!(
        "auth_mode is held but no auth secret found (checked ${}, auth_secret)",
        config.auth_secret_env
    )
}

fn read_key_file(path: &Path) -> Result<zeroize::Zeroizing<Vec<u8>>> {
    let content = zeroize::Zeroizing::new(
        std::fs::read_to_string(path)
            .with_context(|| format!("reading key file: {}", path.display()))?,
    );
    let trimmed = content.trim_end_matches(['\n', '\r']);
    decode_key_value(trimmed).with_context(|| format!("decoding key file: {}", path.display()))
}
