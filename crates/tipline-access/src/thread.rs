//! Thread codec: per-message encryption and fault-isolated decryption
//!
//! Each message in a reporter↔handler conversation is its own AEAD record,
//! AAD-bound to `case:{case_id}:message:{message_id}` so a ciphertext cannot
//! be replayed into another slot. Decoding walks the stored order and turns
//! a per-message authentication failure into an explicit placeholder instead
//! of aborting the thread.

use std::collections::HashMap;

use tipline_core::types::now_ms;
use tipline_core::{EncryptedPayload, MessageRecord, Sender, TiplineResult};
use tipline_crypto::{decrypt, derive_tenant_key, encrypt, MasterSecret, TenantKey};
use uuid::Uuid;

/// AAD for a message body slot.
pub fn message_aad(case_id: &str, message_id: &Uuid) -> Vec<u8> {
    format!("case:{case_id}:message:{message_id}").into_bytes()
}

/// AAD for a case's reporter-contact slot.
pub fn contact_aad(case_id: &str) -> Vec<u8> {
    format!("case:{case_id}:contact").into_bytes()
}

/// Encrypt one message body, bound to its case and message id.
pub fn encode_message(
    key: &TenantKey,
    case_id: &str,
    message_id: &Uuid,
    body: &str,
) -> TiplineResult<EncryptedPayload> {
    encrypt(key, body.as_bytes(), Some(&message_aad(case_id, message_id)))
}

/// Encrypt a reply at the current key version and append it to the case.
pub fn append_reply<S: crate::store::CaseStore>(
    store: &S,
    master: &MasterSecret,
    key_version: u32,
    case_id: &str,
    tenant_id: &str,
    sender: Sender,
    body: &str,
) -> TiplineResult<MessageRecord> {
    let key = derive_tenant_key(master, tenant_id, key_version)?;
    let id = Uuid::new_v4();
    let record = MessageRecord {
        id,
        case_id: case_id.to_string(),
        sender,
        body: encode_message(&key, case_id, &id, body)?,
        created_at_ms: now_ms(),
    };
    store.append_message(record.clone())?;
    Ok(record)
}

/// A decrypted (or undecryptable) entry of a thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedMessage {
    pub id: Uuid,
    pub sender: Sender,
    pub body: MessageBody,
    pub created_at_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageBody {
    Text(String),
    /// Authentication failed for this record; no partial plaintext exists.
    Undecryptable,
}

impl std::fmt::Display for MessageBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MessageBody::Text(text) => f.write_str(text),
            MessageBody::Undecryptable => f.write_str("[undecryptable]"),
        }
    }
}

/// Decrypt a stored message set into a plaintext thread.
///
/// Order is preserved exactly as given (creation-time ascending from the
/// store); no reordering or deduplication. Each record is decrypted with the
/// tenant key at the version the record was sealed under, so old records
/// stay readable after rotation. A failed record becomes
/// [`MessageBody::Undecryptable`] and decoding continues.
pub fn decode_thread(
    master: &MasterSecret,
    tenant_id: &str,
    messages: &[MessageRecord],
) -> Vec<DecodedMessage> {
    let mut keys: HashMap<u32, TenantKey> = HashMap::new();

    messages
        .iter()
        .map(|record| {
            let body = decode_body(master, tenant_id, &mut keys, record);
            DecodedMessage {
                id: record.id,
                sender: record.sender,
                body,
                created_at_ms: record.created_at_ms,
            }
        })
        .collect()
}

fn decode_body(
    master: &MasterSecret,
    tenant_id: &str,
    keys: &mut HashMap<u32, TenantKey>,
    record: &MessageRecord,
) -> MessageBody {
    use std::collections::hash_map::Entry;

    let version = record.body.version;
    let key = match keys.entry(version) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => match derive_tenant_key(master, tenant_id, version) {
            Ok(key) => entry.insert(key),
            Err(_) => {
                tracing::warn!(message_id = %record.id, "tenant key derivation failed");
                return MessageBody::Undecryptable;
            }
        },
    };

    let aad = message_aad(&record.case_id, &record.id);
    match decrypt(key, &record.body, Some(&aad)) {
        Ok(plaintext) => match String::from_utf8(plaintext) {
            Ok(text) => MessageBody::Text(text),
            Err(_) => {
                tracing::warn!(message_id = %record.id, "decrypted body is not UTF-8");
                MessageBody::Undecryptable
            }
        },
        Err(_) => {
            tracing::warn!(message_id = %record.id, "message failed authentication");
            MessageBody::Undecryptable
        }
    }
}
