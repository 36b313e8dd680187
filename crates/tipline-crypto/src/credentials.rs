//! Case credential issuing: public case id, one-time case key, digest
//!
//! A reporter gets exactly two things back at submission: a public case id
//! (lookup key, safe to display) and a secret case key (a BIP-39 word
//! sequence, shown once and never retrievable again). Only the case key's
//! SHA-256 digest is persisted; losing the key means losing access, by
//! design.

use bip39::Mnemonic;
use rand::{Rng, RngCore};
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use tipline_core::{CaseKeyDigest, DIGEST_SIZE};

/// Crockford base32 alphabet: no I, L, O, U, so ids survive being read
/// aloud or written down.
const CASE_ID_ALPHABET: &[u8] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";

/// Case id shape: 4 groups of 4 symbols, 80 bits of entropy.
const CASE_ID_GROUPS: usize = 4;
const CASE_ID_GROUP_LEN: usize = 4;

/// Case key entropy: 128 bits = 12 BIP-39 words.
const CASE_KEY_ENTROPY: usize = 16;

/// Domain prefix for the case-key digest, so the digest can never be
/// confused with any other SHA-256 use in the system.
const CASE_KEY_DIGEST_DOMAIN: &[u8] = b"tipline-case-key-digest/v1\0";

/// Generate a public case identifier, e.g. `7Q4M-XK2R-09AZ-NPT3`.
///
/// High-entropy enough that enumeration is infeasible, but not a secret:
/// it is purely a lookup key.
pub fn generate_case_id() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(CASE_ID_GROUPS * (CASE_ID_GROUP_LEN + 1) - 1);

    for group in 0..CASE_ID_GROUPS {
        if group > 0 {
            id.push('-');
        }
        for _ in 0..CASE_ID_GROUP_LEN {
            let idx = rng.gen_range(0..CASE_ID_ALPHABET.len());
            id.push(CASE_ID_ALPHABET[idx] as char);
        }
    }
    id
}

/// Generate the one-time secret case key: a 12-word BIP-39 mnemonic
/// (128 bits of entropy).
///
/// Returned to the caller exactly once; the system retains only its digest.
pub fn generate_case_key() -> anyhow::Result<SecretString> {
    let mut entropy = [0u8; CASE_KEY_ENTROPY];
    rand::thread_rng().fill_bytes(&mut entropy);

    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| anyhow::anyhow!("BIP-39 case key generation failed: {e}"))?;

    Ok(SecretString::from(mnemonic.to_string()))
}

/// One-way digest of a case key, for equality checks only.
///
/// Deterministic and unsalted: the digest is never used as a key, only for
/// matching, and its fixed width leaks neither length nor byte positions.
/// Input is whitespace-normalized and lowercased so a retyped word sequence
/// with stray spacing still matches.
pub fn hash_case_key(case_key: &SecretString) -> CaseKeyDigest {
    let normalized = normalize(case_key.expose_secret());

    let mut hasher = Sha256::new();
    hasher.update(CASE_KEY_DIGEST_DOMAIN);
    hasher.update(normalized.as_bytes());

    let mut digest = [0u8; DIGEST_SIZE];
    digest.copy_from_slice(&hasher.finalize());
    CaseKeyDigest(digest)
}

fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_case_id_shape() {
        let id = generate_case_id();
        assert_eq!(id.len(), 19, "4 groups of 4 plus 3 dashes");

        for (i, c) in id.chars().enumerate() {
            if i % 5 == 4 {
                assert_eq!(c, '-');
            } else {
                assert!(
                    CASE_ID_ALPHABET.contains(&(c as u8)),
                    "unexpected symbol {c:?} in case id"
                );
            }
        }
    }

    #[test]
    fn test_case_ids_unique() {
        let a = generate_case_id();
        let b = generate_case_id();
        assert_ne!(a, b, "random case ids must differ");
    }

    #[test]
    fn test_case_id_avoids_ambiguous_symbols() {
        for _ in 0..50 {
            let id = generate_case_id();
            assert!(!id.contains(['I', 'L', 'O', 'U']), "ambiguous symbol in {id}");
        }
    }

    #[test]
    fn test_case_key_is_twelve_words() {
        let key = generate_case_key().unwrap();
        let word_count = key.expose_secret().split_whitespace().count();
        assert_eq!(word_count, 12);
    }

    #[test]
    fn test_case_key_is_valid_mnemonic() {
        let key = generate_case_key().unwrap();
        let parsed: Result<Mnemonic, _> = key.expose_secret().parse();
        assert!(parsed.is_ok());
    }

    #[test]
    fn test_case_keys_unique() {
        let k1 = generate_case_key().unwrap();
        let k2 = generate_case_key().unwrap();
        assert_ne!(k1.expose_secret(), k2.expose_secret());
    }

    #[test]
    fn test_digest_deterministic() {
        let key = SecretString::from("correct horse battery staple");
        let d1 = hash_case_key(&key);
        let d2 = hash_case_key(&key);
        assert!(d1.matches(&d2));
    }

    #[test]
    fn test_digest_differs_per_key() {
        let d1 = hash_case_key(&SecretString::from("alpha bravo charlie"));
        let d2 = hash_case_key(&SecretString::from("alpha bravo delta"));
        assert!(!d1.matches(&d2));
    }

    #[test]
    fn test_digest_normalizes_whitespace_and_case() {
        let canonical = hash_case_key(&SecretString::from("alpha bravo charlie"));
        let retyped = hash_case_key(&SecretString::from("  Alpha   bravo\tCHARLIE "));
        assert!(canonical.matches(&retyped));
    }

    #[test]
    fn test_generated_key_digest_roundtrip() {
        let key = generate_case_key().unwrap();
        let stored = hash_case_key(&key);
        let presented = hash_case_key(&key);
        assert!(stored.matches(&presented));
    }
}
