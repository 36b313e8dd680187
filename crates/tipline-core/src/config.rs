use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{TiplineError, TiplineResult};

/// Top-level service configuration (loaded from tipline.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TiplineConfig {
    pub crypto: CryptoConfig,
    pub access: AccessConfig,
    pub log: LogConfig,
}

impl TiplineConfig {
    /// Load configuration from a TOML file. Missing sections fall back to
    /// defaults; a malformed file is a fatal startup condition.
    pub fn load(path: &Path) -> TiplineResult<Self> {
        let raw = std::fs::read_to_string(path)?;
        toml::from_str(&raw)
            .map_err(|e| TiplineError::Config(format!("{}: {e}", path.display())))
    }
}

/// Field-encryption configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CryptoConfig {
    /// Tenant key version used for new encryptions. Older versions stay
    /// readable; bumping this rotates all future writes only.
    pub key_version: u32,
    /// Path to the base64-encoded 32-byte master secret. Checked after the
    /// systemd credential directory and the TIPLINE_MASTER_SECRET env var.
    pub master_secret_file: Option<PathBuf>,
}

impl Default for CryptoConfig {
    fn default() -> Self {
        Self {
            key_version: 1,
            master_secret_file: None,
        }
    }
}

/// Access-verification limits, enforced per case id and per client origin
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AccessConfig {
    /// Verify attempts allowed per key within one window (default: 5)
    pub max_attempts: u32,
    /// Rate-limit window in seconds (default: 900 = 15 min)
    pub window_secs: u64,
}

impl Default for AccessConfig {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            window_secs: 900,
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
            format: "json".into(),
        }
    }
}
