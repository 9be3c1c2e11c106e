//! cellseal: seal and open column values from the command line
//!
//! Commands:
//!   hash-password [PASSWORD]   - SHA-512 hex digest, the usual per-user auth secret
//!   keygen                     - generate a primary key (hex: prefixed)
//!   encrypt [--input FILE]     - seal stdin or a file, print the envelope
//!   decrypt ENVELOPE           - open an envelope, write the plaintext to stdout
//!   store put|get|rm KEY       - sealed values in the JSON column store
//!   config show                - display current configuration (secrets redacted)

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use zeroize::Zeroizing;

use cellseal_core::config::{AuthMode, CellsealConfig};
use cellseal_crypto::{hash_password, CryptoBox, PrimaryKey};
use cellseal_secrets::KeyMaterial;
use cellseal_store::{ColumnStore, JsonFileStore, SealedStore, StoreError};

// ── CLI structure ──────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(
    name = "cellseal",
    version,
    about = "Tamper-evident column encryption",
    long_about = "cellseal: AES-256-CTR + HMAC-SHA-512 envelopes for sensitive column values"
)]
struct Cli {
    /// Path to cellseal.toml configuration file
    #[arg(long, short = 'c', env = "CELLSEAL_CONFIG", default_value = "/etc/cellseal/config.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Where a per-call auth secret comes from.
#[derive(clap::Args, Debug, Default)]
struct AuthArgs {
    /// Read the per-call auth secret from this environment variable
    /// (prompted for when omitted)
    #[arg(long, value_name = "VAR")]
    auth_secret_env: Option<String>,

    /// Treat the supplied secret as a password and hash it first
    #[arg(long)]
    hash_secret: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the SHA-512 hex digest of a password
    #[command(name = "hash-password")]
    HashPassword {
        /// Password to hash (prompted for without echo when omitted)
        password: Option<String>,
    },

    /// Generate a random 256-bit primary key
    Keygen,

    /// Seal plaintext from stdin or a file and print the envelope
    Encrypt {
        /// Read plaintext from this file instead of stdin
        #[arg(long, short = 'i')]
        input: Option<PathBuf>,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Open an envelope and write the plaintext to stdout
    Decrypt {
        /// Base64 envelope
        envelope: String,

        #[command(flatten)]
        auth: AuthArgs,
    },

    /// Sealed values in the JSON column store
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum StoreAction {
    /// Seal VALUE and store it under KEY
    Put {
        key: String,
        value: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Open the value stored under KEY
    Get {
        key: String,
        #[command(flatten)]
        auth: AuthArgs,
    },
    /// Remove KEY from the store
    Rm { key: String },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the active configuration (merged defaults + config file)
    Show,
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = CellsealConfig::load(&cli.config)
        .with_context(|| format!("loading config: {}", cli.config.display()))?;
    init_logging(&config.log.level, &config.log.format);
    config.warn_if_world_readable(&cli.config);

    match cli.command {
        Commands::HashPassword { password } => cmd_hash_password(password),
        Commands::Keygen => cmd_keygen(),
        Commands::Encrypt { input, auth } => cmd_encrypt(&config, input.as_deref(), &auth),
        Commands::Decrypt { envelope, auth } => cmd_decrypt(&config, &envelope, &auth),
        Commands::Store { action } => match action {
            StoreAction::Put { key, value, auth } => cmd_store_put(&config, &key, &value, &auth),
            StoreAction::Get { key, auth } => cmd_store_get(&config, &key, &auth),
            StoreAction::Rm { key } => cmd_store_rm(&config, &key),
        },
        Commands::Config { action: ConfigAction::Show } => cmd_config_show(&config, &cli.config),
    }
}

// ── Logging ───────────────────────────────────────────────────────────────────

/// Logs go to stderr so stdout carries only command output.
fn init_logging(level: &str, format: &str) {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }
}

// ── Key material helpers ──────────────────────────────────────────────────────

fn build_crypto_box(config: &CellsealConfig) -> Result<CryptoBox> {
    let material = KeyMaterial::load(&config.keys).context("loading key material")?;
    tracing::debug!(source = %material.source, "primary key resolved");
    material.into_crypto_box()
}

/// Resolve the per-call auth secret for this invocation.
///
/// Held mode takes no per-call secret; passing one is an error rather than
/// silently ignored.
fn resolve_auth_secret(
    config: &CellsealConfig,
    args: &AuthArgs,
) -> Result<Option<Zeroizing<Vec<u8>>>> {
    if config.keys.auth_mode == AuthMode::Held {
        if args.auth_secret_env.is_some() || args.hash_secret {
            bail!("auth_mode is held; the box uses its configured secret, do not pass one");
        }
        return Ok(None);
    }

    let raw = match &args.auth_secret_env {
        Some(var) => Zeroizing::new(
            std::env::var(var).with_context(|| format!("auth secret env var {var} is not set"))?,
        ),
        None => Zeroizing::new(
            rpassword::prompt_password("Auth secret: ").context("reading auth secret")?,
        ),
    };

    let secret = if args.hash_secret {
        hash_password(&raw).into_bytes()
    } else {
        raw.as_bytes().to_vec()
    };
    Ok(Some(Zeroizing::new(secret)))
}

fn expand_tilde(path: &Path) -> PathBuf {
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_default();
        PathBuf::from(format!("{home}/{rest}"))
    } else {
        path.to_path_buf()
    }
}

// ── `cellseal hash-password` ──────────────────────────────────────────────────

fn cmd_hash_password(password: Option<String>) -> Result<()> {
    let password = match password {
        Some(p) => Zeroizing::new(p),
        None => Zeroizing::new(rpassword::prompt_password("Password: ").context("reading password")?),
    };
    println!("{}", hash_password(&password));
    Ok(())
}

// ── `cellseal keygen` ─────────────────────────────────────────────────────────

fn cmd_keygen() -> Result<()> {
    let key = PrimaryKey::generate().context("generating primary key")?;
    let encoded = Zeroizing::new(hex::encode(key.as_bytes()));
    println!("hex:{}", encoded.as_str());
    Ok(())
}

// ── `cellseal encrypt` / `cellseal decrypt` ───────────────────────────────────

fn cmd_encrypt(config: &CellsealConfig, input: Option<&Path>, auth: &AuthArgs) -> Result<()> {
    let plaintext = Zeroizing::new(match input {
        Some(path) => {
            std::fs::read(path).with_context(|| format!("reading input: {}", path.display()))?
        }
        None => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .context("reading plaintext from stdin")?;
            buf
        }
    });

    let crypto = build_crypto_box(config)?;
    let secret = resolve_auth_secret(config, auth)?;
    let envelope = crypto
        .encrypt(&plaintext, secret.as_deref().map(Vec::as_slice))
        .context("sealing plaintext")?;

    println!("{envelope}");
    Ok(())
}

fn cmd_decrypt(config: &CellsealConfig, envelope: &str, auth: &AuthArgs) -> Result<()> {
    let crypto = build_crypto_box(config)?;
    let secret = resolve_auth_secret(config, auth)?;

    let plaintext = match crypto.decrypt(envelope, secret.as_deref().map(Vec::as_slice)) {
        Ok(p) => Zeroizing::new(p),
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "open failed");
            bail!("decryption failed");
        }
    };

    std::io::stdout()
        .write_all(&plaintext)
        .context("writing plaintext")?;
    Ok(())
}

// ── `cellseal store` ──────────────────────────────────────────────────────────

fn open_sealed_store(config: &CellsealConfig) -> Result<SealedStore<JsonFileStore>> {
    let crypto = build_crypto_box(config)?;
    let path = expand_tilde(&config.store.path);
    let store = JsonFileStore::open(&path)
        .with_context(|| format!("opening store: {}", path.display()))?;
    Ok(SealedStore::new(store, Arc::new(crypto)))
}

fn cmd_store_put(config: &CellsealConfig, key: &str, value: &str, auth: &AuthArgs) -> Result<()> {
    let mut store = open_sealed_store(config)?;
    let secret = resolve_auth_secret(config, auth)?;

    store
        .put_sealed(key, value.as_bytes(), secret.as_deref().map(Vec::as_slice))
        .with_context(|| format!("storing '{key}'"))?;
    store.inner_mut().flush().context("flushing store")?;

    println!("stored: {key}");
    Ok(())
}

fn cmd_store_get(config: &CellsealConfig, key: &str, auth: &AuthArgs) -> Result<()> {
    let store = open_sealed_store(config)?;
    let secret = resolve_auth_secret(config, auth)?;

    match store.get_opened(key, secret.as_deref().map(Vec::as_slice)) {
        Ok(Some(plaintext)) => {
            let plaintext = Zeroizing::new(plaintext);
            std::io::stdout()
                .write_all(&plaintext)
                .context("writing plaintext")?;
            Ok(())
        }
        Ok(None) => bail!("no value stored under '{key}'"),
        Err(StoreError::Open(_)) => bail!("decryption failed"),
        Err(e) => Err(e).with_context(|| format!("reading '{key}'")),
    }
}

fn cmd_store_rm(config: &CellsealConfig, key: &str) -> Result<()> {
    let path = expand_tilde(&config.store.path);
    let mut store = JsonFileStore::open(&path)
        .with_context(|| format!("opening store: {}", path.display()))?;

    if store.remove(key)? {
        store.flush().context("flushing store")?;
        println!("removed: {key}");
    } else {
        println!("not present: {key}");
    }
    Ok(())
}

// ── `cellseal config show` ────────────────────────────────────────────────────

/// Copy of `config` with inline key material replaced.
fn redacted(config: &CellsealConfig) -> CellsealConfig {
    let mut shown = config.clone();
    if shown.keys.primary_key.is_some() {
        shown.keys.primary_key = Some("[REDACTED]".into());
    }
    if shown.keys.auth_secret.is_some() {
        shown.keys.auth_secret = Some("[REDACTED]".into());
    }
    shown
}

fn cmd_config_show(config: &CellsealConfig, config_path: &Path) -> Result<()> {
    if config_path.exists() {
        println!("# Configuration from: {}", config_path.display());
    } else {
        println!("# Configuration: defaults (no file at {})", config_path.display());
    }
    println!();
    let rendered = toml::to_string_pretty(&redacted(config)).context("serializing config to TOML")?;
    print!("{rendered}");
    Ok(())
}
