//! Master secret loading and validation
//!
//! The master secret is the only process-wide key material: 32 bytes,
//! provided base64-encoded, read exactly once at startup and immutable for
//! the process lifetime. Rotation means a new process generation, not
//! in-place mutation. A missing or malformed secret is a fatal startup
//! condition — the process must not serve requests.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use std::path::PathBuf;
use zeroize::Zeroize;

use tipline_core::config::CryptoConfig;
use tipline_core::{TiplineError, TiplineResult, KEY_SIZE};

/// The 256-bit process-wide master secret.
///
/// Zeroized on drop to prevent key material lingering in memory. Per-tenant
/// keys are derived from it; it is never used to encrypt data directly.
#[derive(Clone)]
pub struct MasterSecret {
    bytes: [u8; KEY_SIZE],
}

impl MasterSecret {
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self { bytes }
    }

    /// Decode a base64-encoded master secret, requiring exactly 32 bytes.
    pub fn from_base64(encoded: &str) -> TiplineResult<Self> {
        let mut decoded = STANDARD
            .decode(encoded.trim())
            .map_err(|e| TiplineError::Config(format!("master secret is not valid base64: {e}")))?;

        if decoded.len() != KEY_SIZE {
            let got = decoded.len();
            decoded.zeroize();
            return Err(TiplineError::Config(format!(
                "master secret must be exactly {KEY_SIZE} bytes, got {got}"
            )));
        }

        let mut bytes = [0u8; KEY_SIZE];
        bytes.copy_from_slice(&decoded);
        decoded.zeroize();
        Ok(Self { bytes })
    }

    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }
}

impl Drop for MasterSecret {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasterSecret")
            .field("bytes", &"[REDACTED]")
            .finish()
    }
}

/// Discover and load the master secret using the priority chain:
///   1. $CREDENTIALS_DIRECTORY/master-secret  (systemd credential injection)
///   2. $TIPLINE_MASTER_SECRET  (base64 literal in env var)
///   3. config.master_secret_file path (from tipline.toml)
pub fn load_master_secret(config: &CryptoConfig) -> TiplineResult<MasterSecret> {
    // 1. systemd credentials directory
    if let Ok(cred_dir) = std::env::var("CREDENTIALS_DIRECTORY") {
        let path = PathBuf::from(&cred_dir).join("master-secret");
        if path.exists() {
            let encoded = std::fs::read_to_string(&path)?;
            tracing::debug!(source = %path.display(), "loaded master secret from systemd credential");
            return MasterSecret::from_base64(&encoded);
        }
    }

    // 2. env var (base64 literal)
    if let Ok(encoded) = std::env::var("TIPLINE_MASTER_SECRET") {
        if !encoded.is_empty() {
            tracing::debug!(source = "TIPLINE_MASTER_SECRET", "loaded master secret from env");
            return MasterSecret::from_base64(&encoded);
        }
    }

    // 3. explicit config path
    if let Some(path) = &config.master_secret_file {
        if path.exists() {
            let encoded = std::fs::read_to_string(path)?;
            tracing::debug!(source = %path.display(), "loaded master secret from file");
            return MasterSecret::from_base64(&encoded);
        }
        return Err(TiplineError::Config(format!(
            "master secret file not found: {}",
            path.display()
        )));
    }

    Err(TiplineError::Config(
        "no master secret configured: set CREDENTIALS_DIRECTORY/master-secret, \
         TIPLINE_MASTER_SECRET, or crypto.master_secret_file"
            .into(),
    ))
}
