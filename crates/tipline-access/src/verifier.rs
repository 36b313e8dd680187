//! Capability access verification
//!
//! A reporter re-authenticates to a case with only the public case id and
//! the secret case key. Every failure collapses to one generic denial:
//! neither the response shape nor (as far as this layer controls it) the
//! timing reveals whether the case id exists.

use secrecy::SecretString;

use tipline_core::{CaseKeyDigest, CaseRecord, TiplineError, TiplineResult};
use tipline_crypto::hash_case_key;

use crate::ratelimit::RateLimiter;
use crate::store::CaseStore;

pub struct AccessVerifier<'a, S: CaseStore, R: RateLimiter> {
    store: &'a S,
    limiter: &'a R,
    /// Comparison target for unknown case ids, so the miss path performs
    /// the same hash-and-compare work as a wrong-key attempt.
    dummy_digest: CaseKeyDigest,
}

impl<'a, S: CaseStore, R: RateLimiter> AccessVerifier<'a, S, R> {
    pub fn new(store: &'a S, limiter: &'a R) -> Self {
        let dummy_digest = hash_case_key(&SecretString::from(
            "tipline verifier dummy comparison target",
        ));
        Self {
            store,
            limiter,
            dummy_digest,
        }
    }

    /// Authenticate a presented `(case_id, case_key)` pair.
    ///
    /// Rate limits are charged per case id and per client origin before any
    /// hash work. Unknown case id and wrong case key both return
    /// [`TiplineError::AccessDenied`], indistinguishable in shape and
    /// message. The supplied key is never logged.
    pub fn verify(
        &self,
        case_id: &str,
        supplied_key: &SecretString,
        origin: &str,
    ) -> TiplineResult<CaseRecord> {
        self.limiter.check(&format!("case:{case_id}"))?;
        self.limiter.check(&format!("origin:{origin}"))?;

        let supplied = hash_case_key(supplied_key);
        let case = self.store.get_case(case_id)?;

        let stored = case
            .as_ref()
            .map(|c| &c.key_digest)
            .unwrap_or(&self.dummy_digest);
        let matched = supplied.matches(stored);

        match (case, matched) {
            (Some(record), true) => {
                tracing::debug!(case_id, "access verified");
                Ok(record)
            }
            _ => {
                tracing::warn!(case_id, "access verification failed");
                Err(TiplineError::AccessDenied)
            }
        }
    }
}
