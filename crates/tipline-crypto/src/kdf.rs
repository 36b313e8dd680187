//! Tenant key derivation: HKDF-SHA256 from the master secret
//!
//! Each organization's key is derived, never stored. HKDF Extract-and-Expand
//! with the master secret as IKM, a versioned salt, and the tenant id as the
//! `info` context gives domain separation: no pair of tenant identifiers can
//! collide in derived key, even short or numeric ones. Bumping the version
//! rotates all future encryptions; old versions remain re-derivable so
//! historical payloads stay readable.

use hkdf::Hkdf;
use sha2::Sha256;
use zeroize::Zeroize;

use tipline_core::{TiplineError, TiplineResult, KEY_SIZE};

use crate::secret::MasterSecret;

/// A 256-bit symmetric key scoped to one tenant at one key version.
///
/// Zeroized on drop.
#[derive(Clone)]
pub struct TenantKey {
    bytes: [u8; KEY_SIZE],
    version: u32,
}

impl TenantKey {
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.bytes
    }

    /// The key version this key was derived at.
    pub fn version(&self) -> u32 {
        self.version
    }
}

impl Drop for TenantKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

impl std::fmt::Debug for TenantKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TenantKey")
            .field("bytes", &"[REDACTED]")
            .field("version", &self.version)
            .finish()
    }
}

/// Derive the tenant key for `(tenant_id, version)`.
///
/// Deterministic: the same inputs always yield the identical key. The tenant
/// id enters as the HKDF `info` parameter, the version through the salt.
pub fn derive_tenant_key(
    master: &MasterSecret,
    tenant_id: &str,
    version: u32,
) -> TiplineResult<TenantKey> {
    let salt = format!("tipline-tenant-key/v{version}");
    let hkdf = Hkdf::<Sha256>::new(Some(salt.as_bytes()), master.as_bytes());

    let mut okm = [0u8; KEY_SIZE];
    hkdf.expand(tenant_id.as_bytes(), &mut okm)
        .map_err(|e| TiplineError::Crypto(format!("HKDF expand failed: {e}")))?;

    Ok(TenantKey {
        bytes: okm,
        version,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_master() -> MasterSecret {
        MasterSecret::from_bytes([42u8; KEY_SIZE])
    }

    #[test]
    fn test_derivation_deterministic() {
        let master = test_master();
        let k1 = derive_tenant_key(&master, "acme", 1).unwrap();
        let k2 = derive_tenant_key(&master, "acme", 1).unwrap();

        assert_eq!(k1.as_bytes(), k2.as_bytes(), "derivation must be deterministic");
    }

    #[test]
    fn test_different_tenants_different_keys() {
        let master = test_master();
        let k1 = derive_tenant_key(&master, "acme", 1).unwrap();
        let k2 = derive_tenant_key(&master, "other-tenant", 1).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_similar_tenant_ids_separate() {
        // Concatenation-style collisions must be impossible: "1" + "2" vs "12"
        let master = test_master();
        let k1 = derive_tenant_key(&master, "12", 1).unwrap();
        let k2 = derive_tenant_key(&master, "1", 1).unwrap();
        let k3 = derive_tenant_key(&master, "2", 1).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.as_bytes(), k3.as_bytes());
        assert_ne!(k2.as_bytes(), k3.as_bytes());
    }

    #[test]
    fn test_different_versions_different_keys() {
        let master = test_master();
        let k1 = derive_tenant_key(&master, "acme", 1).unwrap();
        let k2 = derive_tenant_key(&master, "acme", 2).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_eq!(k1.version(), 1);
        assert_eq!(k2.version(), 2);
    }

    #[test]
    fn test_different_masters_different_keys() {
        let m1 = MasterSecret::from_bytes([1u8; KEY_SIZE]);
        let m2 = MasterSecret::from_bytes([2u8; KEY_SIZE]);

        let k1 = derive_tenant_key(&m1, "acme", 1).unwrap();
        let k2 = derive_tenant_key(&m2, "acme", 1).unwrap();

        assert_ne!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_old_version_still_derivable_after_rotation() {
        let master = test_master();
        let v1_before = derive_tenant_key(&master, "acme", 1).unwrap();

        // Tenant rotates: new writes use v2, but v1 must stay reproducible
        let _v2 = derive_tenant_key(&master, "acme", 2).unwrap();
        let v1_after = derive_tenant_key(&master, "acme", 1).unwrap();

        assert_eq!(v1_before.as_bytes(), v1_after.as_bytes());
    }
}
