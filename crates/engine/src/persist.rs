//! State persistence - versioned envelope over a key/value store.
//!
//! Saving never fails the caller: store errors are logged. Loading treats a
//! missing or malformed payload as "no saved state".

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::state::GridState;

pub const STATE_VERSION: u32 = 1;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("state store I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("state store error: {0}")]
    Backend(String),
}

/// Durable string storage addressed by key. Last write wins.
pub trait StateStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&self, key: &str, payload: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-process store. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryStateStore {
    entries: Rc<RefCell<FxHashMap<String, String>>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl StateStore for MemoryStateStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.get(key))
    }

    fn write(&self, key: &str, payload: &str) -> Result<(), StoreError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), payload.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed grid state: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported grid state version {0}")]
    UnsupportedVersion(u32),
}

#[derive(Serialize)]
struct EnvelopeRef<'a> {
    version: u32,
    state: &'a GridState,
}

#[derive(Deserialize)]
struct Envelope {
    version: u32,
    state: serde_json::Value,
}

pub fn encode_state(state: &GridState) -> serde_json::Result<String> {
    serde_json::to_string(&EnvelopeRef {
        version: STATE_VERSION,
        state,
    })
}

pub fn decode_state(payload: &str) -> Result<GridState, DecodeError> {
    let envelope: Envelope = serde_json::from_str(payload)?;
    if envelope.version != STATE_VERSION {
        return Err(DecodeError::UnsupportedVersion(envelope.version));
    }
    Ok(serde_json::from_value(envelope.state)?)
}

/// Binds a store to one grid's key.
pub struct StatePersistence {
    key: String,
    store: Box<dyn StateStore>,
}

impl StatePersistence {
    pub fn new(key: impl Into<String>, store: Box<dyn StateStore>) -> Self {
        Self {
            key: key.into(),
            store,
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn save(&self, state: &GridState) {
        let payload = match encode_state(state) {
            Ok(payload) => payload,
            Err(e) => {
                log::warn!("could not encode grid state '{}': {}", self.key, e);
                return;
            }
        };
        if let Err(e) = self.store.write(&self.key, &payload) {
            log::warn!("could not save grid state '{}': {}", self.key, e);
        }
    }

    pub fn load(&self) -> Option<GridState> {
        let payload = match self.store.read(&self.key) {
            Ok(Some(payload)) => payload,
            Ok(None) => return None,
            Err(e) => {
                log::warn!("could not read grid state '{}': {}", self.key, e);
                return None;
            }
        };
        match decode_state(&payload) {
            Ok(state) => Some(state),
            Err(e) => {
                log::warn!("ignoring saved grid state '{}': {}", self.key, e);
                None
            }
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.store.remove(&self.key) {
            log::warn!("could not remove grid state '{}': {}", self.key, e);
        }
    }
}

impl std::fmt::Debug for StatePersistence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatePersistence")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
