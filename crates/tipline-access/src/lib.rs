//! tipline-access: anonymous capability access over encrypted case threads
//!
//! Consumes the tipline-crypto primitives and the storage/rate-limit
//! collaborator contracts to implement the intake data flow: submission →
//! credential minting → field encryption → persistence, and later access:
//! (case id, case key) → verification → thread decryption. No session or
//! token is minted; every request re-verifies.

pub mod intake;
pub mod ratelimit;
pub mod store;
pub mod thread;
pub mod verifier;

pub use intake::{decrypt_contact, submit, IssuedCredentials, Submission};
pub use ratelimit::{FixedWindowLimiter, RateLimiter};
pub use store::{CaseStore, MemoryStore};
pub use thread::{append_reply, decode_thread, encode_message, DecodedMessage, MessageBody};
pub use verifier::AccessVerifier;
