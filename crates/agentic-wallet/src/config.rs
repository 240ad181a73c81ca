//! Wallet configuration.
//!
//! A wallet is a named directory. By convention the default root is
//! `~/.agentic/wallets/`, overridable with `AGENTIC_WALLET_HOME`:
//!
//! ```text
//! ~/.agentic/wallets/
//! └── {name}/
//!     ├── wallet.json      — this configuration
//!     └── records/         — FileBackend root
//! ```

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::backend::FileBackend;
use crate::error::{Result, WalletError};
use crate::validation::{require_non_empty, ValidationError};

/// Environment variable overriding the wallets root directory.
pub const WALLET_HOME_ENV: &str = "AGENTIC_WALLET_HOME";

/// Wallet name used when none is given.
pub const DEFAULT_WALLET_NAME: &str = "default";

const CONFIG_FILE: &str = "wallet.json";
const RECORDS_DIR: &str = "records";

/// Location and identity of a wallet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    pub name: String,
    /// Directory holding everything this wallet persists.
    pub storage_dir: PathBuf,
}

impl WalletConfig {
    /// Config for wallet `name` under the default root.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let storage_dir = default_home()?.join(&name);
        Self::with_storage_dir(name, storage_dir)
    }

    /// Config for wallet `name` stored in `storage_dir`.
    pub fn with_storage_dir(name: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self {
            name,
            storage_dir: storage_dir.into(),
        })
    }

    pub fn records_dir(&self) -> PathBuf {
        self.storage_dir.join(RECORDS_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.storage_dir.join(CONFIG_FILE)
    }

    /// Write `wallet.json`, creating the wallet directory if needed.
    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.storage_dir)?;
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| WalletError::SerializationError(e.to_string()))?;
        std::fs::write(self.config_path(), json.as_bytes())?;
        Ok(())
    }

    /// Read a `wallet.json` file.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        let config: Self = serde_json::from_slice(&bytes)
            .map_err(|e| WalletError::Config(format!("failed to parse {}: {e}", path.display())))?;
        validate_name(&config.name)?;
        Ok(config)
    }

    /// Load `{storage_dir}/wallet.json` if present, otherwise build and save
    /// a fresh config for that directory.
    pub fn open(name: impl Into<String>, storage_dir: impl Into<PathBuf>) -> Result<Self> {
        let fresh = Self::with_storage_dir(name, storage_dir)?;
        let path = fresh.config_path();
        if path.exists() {
            let loaded = Self::load(&path)?;
            if loaded.name != fresh.name {
                return Err(WalletError::Config(format!(
                    "{} belongs to wallet '{}', not '{}'",
                    path.display(),
                    loaded.name,
                    fresh.name
                )));
            }
            return Ok(loaded);
        }
        fresh.save()?;
        Ok(fresh)
    }

    /// The storage backend for this wallet's records.
    pub async fn file_backend(&self) -> Result<FileBackend> {
        Ok(FileBackend::open(self.records_dir()).await?)
    }
}

/// Root directory for wallets: `$AGENTIC_WALLET_HOME`, else
/// `$HOME/.agentic/wallets`.
pub fn default_home() -> Result<PathBuf> {
    resolve_home(
        std::env::var_os(WALLET_HOME_ENV),
        std::env::var_os("HOME"),
    )
}

fn resolve_home(wallet_home: Option<OsString>, home: Option<OsString>) -> Result<PathBuf> {
    if let Some(dir) = wallet_home.filter(|d| !d.is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    match home.filter(|d| !d.is_empty()) {
        Some(home) => Ok(PathBuf::from(home).join(".agentic").join("wallets")),
        None => Err(WalletError::Config(format!(
            "neither {WALLET_HOME_ENV} nor HOME is set"
        ))),
    }
}

fn validate_name(name: &str) -> Result<()> {
    require_non_empty("name", name)?;
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ValidationError::new("name", "must be a plain directory name").into());
    }
    Ok(())
}
