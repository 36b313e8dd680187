use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Size of an AES-256-GCM key in bytes (256-bit)
pub const KEY_SIZE: usize = 32;

/// Size of an AES-GCM IV (96-bit)
pub const IV_SIZE: usize = 12;

/// Size of a GCM authentication tag
pub const TAG_SIZE: usize = 16;

/// Size of a case-key digest (SHA-256)
pub const DIGEST_SIZE: usize = 32;

/// An authenticated ciphertext record for a single sensitive field.
///
/// Self-describing: `version` records the tenant key version the field was
/// sealed under, so historical records remain decryptable after the tenant
/// rotates to a newer version for fresh writes.
///
/// Wire/storage shape (JSON): `{v, iv, tag, ct, aad?}` with byte fields
/// base64-encoded. Round-trips byte-exact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedPayload {
    /// Tenant key version used to seal this payload
    #[serde(rename = "v")]
    pub version: u32,
    /// Random 96-bit IV, fresh per encryption
    #[serde(with = "b64_arr")]
    pub iv: [u8; IV_SIZE],
    /// Detached 128-bit GCM authentication tag
    #[serde(with = "b64_arr")]
    pub tag: [u8; TAG_SIZE],
    /// Ciphertext (same length as the plaintext)
    #[serde(rename = "ct", with = "b64_vec")]
    pub ciphertext: Vec<u8>,
    /// Associated data the payload was bound to, if any (authenticated, not
    /// encrypted — stored so records are self-describing)
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "b64_opt_vec"
    )]
    pub aad: Option<Vec<u8>>,
}

/// One-way digest of a case key, used for equality checks only.
///
/// Fixed-width output leaks neither length nor byte positions of the
/// passphrase; comparison is constant-time.
#[derive(Clone, Serialize, Deserialize)]
pub struct CaseKeyDigest(#[serde(with = "b64_arr")] pub [u8; DIGEST_SIZE]);

impl CaseKeyDigest {
    /// Constant-time equality against another digest.
    pub fn matches(&self, other: &CaseKeyDigest) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

// No derived equality: `==` must not hand callers a short-circuiting
// byte comparison next to the constant-time one.
impl PartialEq for CaseKeyDigest {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for CaseKeyDigest {}

impl std::fmt::Debug for CaseKeyDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CaseKeyDigest").field(&"[REDACTED]").finish()
    }
}

/// Which side of the conversation authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sender {
    Reporter,
    Handler,
}

/// A stored intake case.
///
/// `case_id` is a public lookup key, not a secret. The plaintext case key is
/// never persisted anywhere; only `key_digest` exists at rest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseRecord {
    pub case_id: String,
    pub tenant_id: String,
    pub key_digest: CaseKeyDigest,
    /// Optional reporter contact details, sealed and AAD-bound to this case
    pub encrypted_contact: Option<EncryptedPayload>,
    pub created_at_ms: u64,
}

/// A single message in a case thread.
///
/// Each message is its own ciphertext record: appends are O(1) and one
/// corrupted record cannot take down the rest of the thread. Ciphertext is
/// never updated or deleted in place — replies are new records.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: Uuid,
    pub case_id: String,
    pub sender: Sender,
    pub body: EncryptedPayload,
    pub created_at_ms: u64,
}

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

mod b64_arr {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<const N: usize, S: Serializer>(
        bytes: &[u8; N],
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, const N: usize, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<[u8; N], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = STANDARD.decode(&s).map_err(serde::de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|b: Vec<u8>| {
                serde::de::Error::custom(format!("expected {} bytes, got {}", N, b.len()))
            })
    }
}

mod b64_vec {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}

mod b64_opt_vec {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        bytes: &Option<Vec<u8>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match bytes {
            Some(b) => serializer.serialize_some(&STANDARD.encode(b)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<Vec<u8>>, D::Error> {
        let s: Option<String> = Option::deserialize(deserializer)?;
        s.map(|s| STANDARD.decode(&s).map_err(serde::de::Error::custom))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_payload() -> EncryptedPayload {
        EncryptedPayload {
            version: 1,
            iv: [7u8; IV_SIZE],
            tag: [9u8; TAG_SIZE],
            ciphertext: vec![1, 2, 3, 4, 5],
            aad: Some(b"message:123".to_vec()),
        }
    }

    #[test]
    fn test_payload_wire_roundtrip() {
        let payload = sample_payload();
        let json = serde_json::to_string(&payload).unwrap();
        let restored: EncryptedPayload = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_payload_wire_field_names() {
        let json = serde_json::to_value(sample_payload()).unwrap();
        let obj = json.as_object().unwrap();
        assert!(obj.contains_key("v"));
        assert!(obj.contains_key("iv"));
        assert!(obj.contains_key("tag"));
        assert!(obj.contains_key("ct"));
        assert!(obj.contains_key("aad"));
    }

    #[test]
    fn test_payload_no_aad_omitted_on_wire() {
        let payload = EncryptedPayload {
            aad: None,
            ..sample_payload()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.as_object().unwrap().get("aad").is_none());

        let restored: EncryptedPayload = serde_json::from_value(json).unwrap();
        assert_eq!(restored, payload);
    }

    #[test]
    fn test_payload_rejects_wrong_iv_length() {
        let mut json = serde_json::to_value(sample_payload()).unwrap();
        json["iv"] = serde_json::Value::String("AAAA".into());
        let result: Result<EncryptedPayload, _> = serde_json::from_value(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_digest_constant_time_matches() {
        let a = CaseKeyDigest([1u8; DIGEST_SIZE]);
        let b = CaseKeyDigest([1u8; DIGEST_SIZE]);
        let c = CaseKeyDigest([2u8; DIGEST_SIZE]);
        assert!(a.matches(&b));
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_digest_eq_agrees_with_constant_time_matches() {
        let a = CaseKeyDigest([1u8; DIGEST_SIZE]);
        let b = CaseKeyDigest([1u8; DIGEST_SIZE]);
        // differs only in the last byte, where a short-circuiting compare
        // would bail earliest
        let mut tail = [1u8; DIGEST_SIZE];
        tail[DIGEST_SIZE - 1] ^= 0x01;
        let c = CaseKeyDigest(tail);

        assert!(a == b);
        assert!(a != c);
        assert_eq!(a == b, a.matches(&b));
        assert_eq!(a == c, a.matches(&c));
    }

    #[test]
    fn test_digest_debug_redacted() {
        let digest = CaseKeyDigest([0xAAu8; DIGEST_SIZE]);
        let rendered = format!("{digest:?}");
        assert!(rendered.contains("REDACTED"));
        assert!(!rendered.contains("170"));
    }
}
