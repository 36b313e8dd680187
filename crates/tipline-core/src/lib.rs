//! tipline-core: shared types, config schema, and error taxonomy for the
//! tipline field-encryption and capability-access subsystem.

pub mod config;
pub mod error;
pub mod types;

pub use error::{TiplineError, TiplineResult};
pub use types::{
    CaseKeyDigest, CaseRecord, EncryptedPayload, MessageRecord, Sender, DIGEST_SIZE, IV_SIZE,
    KEY_SIZE, TAG_SIZE,
};
