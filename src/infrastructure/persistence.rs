//! Key-value persistence with schema versioning.
//!
//! The store is string-keyed and string-valued, read once at startup and
//! rewritten on every set. A save that cannot reach disk no-ops and a load
//! that cannot be read yields `None`, so the application keeps running in
//! memory when storage is unavailable.
//!
//! Structured values travel through a versioned envelope
//! (`{version, savedAt, data}`); a payload whose version does not match
//! [`CURRENT_SCHEMA_VERSION`] is invalid as a whole. Boolean flags skip the
//! envelope and use a one-bit encoding: the literal `"1"` is true,
//! anything else is false.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::domain::now_iso;

pub const CURRENT_SCHEMA_VERSION: u64 = 1;

/// Storage keys, versioned independently of the envelope so unrelated
/// values never collide.
pub mod storage_keys {
    pub const TRIP_PLAN: &str = "wanderplan.trip.v1";
    pub const ONBOARDING_SEEN: &str = "wanderplan.onboarding.seen.v1";
    pub const SEEDED_SAMPLE: &str = "wanderplan.sample.seeded.v1";
    pub const AUTH_USERS: &str = "wanderplan.auth.users.v1";
    pub const AUTH_SESSION: &str = "wanderplan.auth.session.v1";
}

/// A synchronous string-keyed store. Handles are cheap clones sharing one
/// underlying map, because the state engine, the credential store and the
/// flag reads all address the same namespace.
pub trait KeyValueStore: Clone {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// In-memory store used by tests and as the degraded no-disk fallback.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// File-backed store: one JSON object of key/value pairs, rewritten in full
/// on every set. A missing or unreadable file opens as an empty store.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    entries: Rc<RefCell<HashMap<String, String>>>,
}

pub const DEFAULT_STORE_FILE: &str = "wanderplan.json";

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = fs::read_to_string(&path)
            .ok()
            .and_then(|raw| serde_json::from_str::<HashMap<String, String>>(&raw).ok())
            .unwrap_or_default();
        Self {
            path,
            entries: Rc::new(RefCell::new(entries)),
        }
    }

    fn flush(&self) {
        if let Ok(json) = serde_json::to_string_pretty(&*self.entries.borrow()) {
            let _ = fs::write(&self.path, json);
        }
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) {
        self.entries.borrow_mut().insert(key.to_string(), value.to_string());
        self.flush();
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
        self.flush();
    }
}

/// Result of reading a versioned payload.
#[derive(Debug, Clone, PartialEq)]
pub struct Unwrapped {
    pub valid: bool,
    pub version: Option<u64>,
    pub data: Option<Value>,
}

impl Unwrapped {
    fn invalid(version: Option<u64>) -> Self {
        Self { valid: false, version, data: None }
    }
}

/// Wraps a value in the versioned envelope: `{version, savedAt, data}`.
pub fn wrap_payload(data: Value) -> Value {
    json!({
        "version": CURRENT_SCHEMA_VERSION,
        "savedAt": now_iso(),
        "data": data,
    })
}

/// Validates and reads a versioned payload. Anything that is not an object
/// carrying the current version and a `data` field is invalid as a whole;
/// this never panics on malformed input.
pub fn read_payload(payload: &Value) -> Unwrapped {
    let Some(object) = payload.as_object() else {
        return Unwrapped::invalid(None);
    };
    let version = object.get("version").and_then(Value::as_u64);
    if version != Some(CURRENT_SCHEMA_VERSION) || !object.contains_key("data") {
        return Unwrapped::invalid(version);
    }
    Unwrapped {
        valid: true,
        version,
        data: object.get("data").cloned(),
    }
}

/// Loads a JSON value from the store; missing keys and unparseable values
/// both yield `None`.
pub fn load_json(store: &impl KeyValueStore, key: &str) -> Option<Value> {
    let raw = store.get(key)?;
    serde_json::from_str(&raw).ok()
}

/// Saves a JSON value to the store; serialization failures no-op.
pub fn save_json(store: &impl KeyValueStore, key: &str, value: &Value) {
    if let Ok(raw) = serde_json::to_string(value) {
        store.set(key, &raw);
    }
}

pub fn get_flag(store: &impl KeyValueStore, key: &str) -> bool {
    store.get(key).as_deref() == Some("1")
}

pub fn set_flag(store: &impl KeyValueStore, key: &str, value: bool) {
    store.set(key, if value { "1" } else { "0" });
}
