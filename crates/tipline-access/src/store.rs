//! Persistence contract for cases and messages
//!
//! The cryptographic core never talks to a database directly; it goes
//! through [`CaseStore`]. Real deployments plug in a SQL or object-store
//! backend; [`MemoryStore`] ships for tests and embedding.

use std::collections::HashMap;
use std::sync::RwLock;

use tipline_core::{CaseRecord, MessageRecord, TiplineError, TiplineResult};

/// Storage collaborator for case and message rows.
///
/// Messages are append-only: nothing ever updates or deletes a message's
/// ciphertext in place. `messages` returns creation order.
pub trait CaseStore: Send + Sync {
    /// Persist a new case together with its first message, atomically.
    /// Fails if the case id already exists.
    fn create_case(&self, case: CaseRecord, first_message: MessageRecord) -> TiplineResult<()>;

    fn get_case(&self, case_id: &str) -> TiplineResult<Option<CaseRecord>>;

    /// Append a message to an existing case.
    fn append_message(&self, message: MessageRecord) -> TiplineResult<()>;

    /// All messages for a case, creation-time ascending.
    fn messages(&self, case_id: &str) -> TiplineResult<Vec<MessageRecord>>;
}

/// In-memory store: RwLock'd maps, insertion order preserved per case.
#[derive(Default)]
pub struct MemoryStore {
    cases: RwLock<HashMap<String, CaseRecord>>,
    messages: RwLock<HashMap<String, Vec<MessageRecord>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CaseStore for MemoryStore {
    fn create_case(&self, case: CaseRecord, first_message: MessageRecord) -> TiplineResult<()> {
        let mut cases = self
            .cases
            .write()
            .map_err(|_| TiplineError::Storage("case map lock poisoned".into()))?;
        let mut messages = self
            .messages
            .write()
            .map_err(|_| TiplineError::Storage("message map lock poisoned".into()))?;

        if cases.contains_key(&case.case_id) {
            return Err(TiplineError::Storage(format!(
                "case id collision: {}",
                case.case_id
            )));
        }

        messages.insert(case.case_id.clone(), vec![first_message]);
        cases.insert(case.case_id.clone(), case);
        Ok(())
    }

    fn get_case(&self, case_id: &str) -> TiplineResult<Option<CaseRecord>> {
        let cases = self
            .cases
            .read()
            .map_err(|_| TiplineError::Storage("case map lock poisoned".into()))?;
        Ok(cases.get(case_id).cloned())
    }

    fn append_message(&self, message: MessageRecord) -> TiplineResult<()> {
        let mut messages = self
            .messages
            .write()
            .map_err(|_| TiplineError::Storage("message map lock poisoned".into()))?;
        match messages.get_mut(&message.case_id) {
            Some(thread) => {
                thread.push(message);
                Ok(())
            }
            None => Err(TiplineError::Storage(format!(
                "no such case: {}",
                message.case_id
            ))),
        }
    }

    fn messages(&self, case_id: &str) -> TiplineResult<Vec<MessageRecord>> {
        let messages = self
            .messages
            .read()
            .map_err(|_| TiplineError::Storage("message map lock poisoned".into()))?;
        Ok(messages.get(case_id).cloned().unwrap_or_default())
    }
}
