//! Client configuration: JSON file, then environment overrides.
//!
//! Recognized environment variables: `SPRING_RPC_URL`, `SPRING_PACKAGE_ID`,
//! `SPRING_POOL_ID`, `SPRING_POOL_TYPE`, `SPRING_WEIGHT_HOOK_ID` and
//! `SPRING_OUTBOX`. Command-line flags are applied on top by the binary.

use crate::types::{ObjectId, PoolDescriptor};
use serde::Deserialize;
use std::{
    error::Error,
    fmt, fs,
    path::{Path, PathBuf},
};

/// Full node used when nothing else is configured.
pub const DEFAULT_RPC_URL: &str = "https://fullnode.testnet.sui.io";

/// Pool object used when nothing else is configured.
pub const DEFAULT_POOL_ID: &str = "0x4b7b661cb29e49557cd8118d34357b2d09e2e959c37188143feac31a9f2f3e79";

/// LST type of [`DEFAULT_POOL_ID`].
pub const DEFAULT_POOL_TYPE: &str =
    "0x1e20267bbc14a1c19399473165685a409f36f161583650e09981ef936560ee44::ripleys::RIPLEYS";

/// Errors raised while assembling a [`ClientConfig`].
#[derive(Debug, Clone)]
pub enum ConfigError {
    /// Config file could not be read.
    Io(String),
    /// Config file is not valid JSON for [`ConfigFile`].
    Parse(String),
    /// A setting had an unusable value.
    InvalidValue {
        /// Setting name (file key or environment variable).
        key: String,
        /// What was wrong with it.
        message: String,
    },
    /// No contract package id was configured.
    MissingPackageId,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "config I/O error: {err}"),
            Self::Parse(err) => write!(f, "config parse error: {err}"),
            Self::InvalidValue { key, message } => write!(f, "invalid {key}: {message}"),
            Self::MissingPackageId => {
                write!(f, "no package id configured (set SPRING_PACKAGE_ID or --package-id)")
            }
        }
    }
}

impl Error for ConfigError {}

/// On-disk configuration; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// JSON-RPC endpoint.
    pub rpc_url: Option<String>,
    /// Contract package id.
    pub package_id: Option<String>,
    /// Pool object id.
    pub pool_id: Option<String>,
    /// Pool LST type.
    pub pool_type: Option<String>,
    /// Weight hook object id.
    pub weight_hook_id: Option<String>,
    /// Plan outbox file.
    pub outbox: Option<PathBuf>,
}

impl ConfigFile {
    /// Reads `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = fs::read(path)
            .map_err(|err| ConfigError::Io(format!("{}: {err}", path.display())))?;
        serde_json::from_slice(&bytes).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// JSON-RPC endpoint.
    pub rpc_url: String,
    /// Contract package id, when known.
    pub package_id: Option<ObjectId>,
    /// Pool the commands act on.
    pub pool: PoolDescriptor,
    /// Plan outbox; plans go to stdout when unset.
    pub outbox: Option<PathBuf>,
}

impl ClientConfig {
    /// Loads `path` (if any) and applies process environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => ConfigFile::load(path)?,
            None => ConfigFile::default(),
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merges `file` with overrides looked up through `env`.
    pub fn resolve(
        file: ConfigFile,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let pick = |key: &str, from_file: Option<String>| {
            env(key).filter(|value| !value.trim().is_empty()).or(from_file)
        };

        let rpc_url =
            pick("SPRING_RPC_URL", file.rpc_url).unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let package_id = pick("SPRING_PACKAGE_ID", file.package_id)
            .map(|raw| parse_id("SPRING_PACKAGE_ID", &raw))
            .transpose()?;
        let pool_id = parse_id(
            "SPRING_POOL_ID",
            &pick("SPRING_POOL_ID", file.pool_id).unwrap_or_else(|| DEFAULT_POOL_ID.to_string()),
        )?;
        let pool_type = pick("SPRING_POOL_TYPE", file.pool_type)
            .unwrap_or_else(|| DEFAULT_POOL_TYPE.to_string());
        let mut pool = PoolDescriptor::new(pool_id, pool_type);
        if let Some(raw) = pick("SPRING_WEIGHT_HOOK_ID", file.weight_hook_id) {
            pool = pool.with_weight_hook(parse_id("SPRING_WEIGHT_HOOK_ID", &raw)?);
        }
        let outbox = env("SPRING_OUTBOX")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from)
            .or(file.outbox);

        Ok(Self {
            rpc_url,
            package_id,
            pool,
            outbox,
        })
    }

    /// Package id, or `MissingPackageId`.
    pub fn package_id(&self) -> Result<ObjectId, ConfigError> {
        self.package_id.ok_or(ConfigError::MissingPackageId)
    }
}

/// Parses an object id setting, naming `key` on failure.
pub fn parse_id(key: &str, raw: &str) -> Result<ObjectId, ConfigError> {
    raw.parse().map_err(|err: crate::error::ComposeError| ConfigError::InvalidValue {
        key: key.to_string(),
        message: err.to_string(),
    })
}
