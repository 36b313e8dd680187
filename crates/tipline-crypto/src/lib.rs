//! tipline-crypto: tenant-scoped field encryption for the intake platform
//!
//! Key hierarchy:
//! ```text
//! Master Secret (256-bit, base64 from systemd credential / env / file)
//!   └── Tenant Key (per-organization, HKDF-SHA256,
//!                   salt="tipline-tenant-key/v{n}", info=tenant_id)
//!       └── Field AEAD: AES-256-GCM (iv=random_96bit, tag=128bit,
//!                       AAD=semantic slot, e.g. "case:{id}:message:{id}")
//! ```
//!
//! Case credentials sit beside the hierarchy: the case key is an independent
//! 12-word secret whose SHA-256 digest is the only thing at rest.

pub mod cipher;
pub mod credentials;
pub mod kdf;
pub mod secret;

pub use cipher::{decrypt, encrypt};
pub use credentials::{generate_case_id, generate_case_key, hash_case_key};
pub use kdf::{derive_tenant_key, TenantKey};
pub use secret::{load_master_secret, MasterSecret};
