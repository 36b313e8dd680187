//! Intake flow: mint credentials, seal the submission, persist atomically
//!
//! Submission path: CredentialIssuer mints the (case id, case key) pair, the
//! tenant key is derived at the current version, the first message body and
//! optional reporter contact are sealed, and the case plus its first message
//! land in the store as one atomic write. The plaintext case key is returned
//! exactly once and retained nowhere.

use secrecy::SecretString;
use uuid::Uuid;

use tipline_core::types::now_ms;
use tipline_core::{CaseRecord, MessageRecord, Sender, TiplineResult};
use tipline_crypto::{
    decrypt, derive_tenant_key, encrypt, generate_case_id, generate_case_key, hash_case_key,
    MasterSecret,
};

use crate::store::CaseStore;
use crate::thread::{contact_aad, encode_message};

/// A new submission from an anonymous or identified reporter.
pub struct Submission<'a> {
    pub tenant_id: &'a str,
    /// The report text; becomes the first message of the thread.
    pub body: &'a str,
    /// Optional contact details; sealed and bound to the case's contact slot.
    pub contact: Option<&'a str>,
}

/// The credential pair handed back to the reporter. Display once; the
/// case key is not retrievable afterwards.
pub struct IssuedCredentials {
    pub case_id: String,
    pub case_key: SecretString,
}

/// Accept a submission: issue credentials, encrypt, persist.
pub fn submit<S: CaseStore>(
    store: &S,
    master: &MasterSecret,
    key_version: u32,
    submission: Submission<'_>,
) -> TiplineResult<IssuedCredentials> {
    let case_id = generate_case_id();
    let case_key = generate_case_key()?;
    let key_digest = hash_case_key(&case_key);

    let tenant_key = derive_tenant_key(master, submission.tenant_id, key_version)?;

    let encrypted_contact = submission
        .contact
        .map(|contact| encrypt(&tenant_key, contact.as_bytes(), Some(&contact_aad(&case_id))))
        .transpose()?;

    let message_id = Uuid::new_v4();
    let first_message = MessageRecord {
        id: message_id,
        case_id: case_id.clone(),
        sender: Sender::Reporter,
        body: encode_message(&tenant_key, &case_id, &message_id, submission.body)?,
        created_at_ms: now_ms(),
    };

    let case = CaseRecord {
        case_id: case_id.clone(),
        tenant_id: submission.tenant_id.to_string(),
        key_digest,
        encrypted_contact,
        created_at_ms: now_ms(),
    };

    store.create_case(case, first_message)?;
    tracing::info!(case_id, tenant_id = submission.tenant_id, "case created");

    Ok(IssuedCredentials { case_id, case_key })
}

/// Decrypt a case's reporter contact, if one was provided at submission.
pub fn decrypt_contact(
    master: &MasterSecret,
    case: &CaseRecord,
) -> TiplineResult<Option<String>> {
    let Some(payload) = &case.encrypted_contact else {
        return Ok(None);
    };

    let key = derive_tenant_key(master, &case.tenant_id, payload.version)?;
    let plaintext = decrypt(&key, payload, Some(&contact_aad(&case.case_id)))?;
    let contact = String::from_utf8(plaintext).map_err(|_| tipline_core::TiplineError::Integrity)?;
    Ok(Some(contact))
}
