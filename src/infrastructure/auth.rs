//! Local credential storage.
//!
//! Accounts live in a users map under their own storage key, passwords are
//! hashed with Argon2 and a per-user random salt (PHC string format, salt
//! embedded), and a successful signup or login writes a session record.
//! Trip data is never touched from here.

use std::collections::HashMap;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use serde::{Deserialize, Serialize};

use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::now_iso;
use crate::infrastructure::persistence::{KeyValueStore, load_json, save_json, storage_keys};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub email: String,
    pub hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub email: String,
    pub logged_in_at: String,
}

pub struct CredentialStore<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> CredentialStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    fn users(&self) -> HashMap<String, UserRecord> {
        load_json(&self.store, storage_keys::AUTH_USERS)
            .and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    fn save_users(&self, users: &HashMap<String, UserRecord>) {
        if let Ok(value) = serde_json::to_value(users) {
            save_json(&self.store, storage_keys::AUTH_USERS, &value);
        }
    }

    fn open_session(&self, email: String) -> Session {
        let session = Session {
            email,
            logged_in_at: now_iso(),
        };
        if let Ok(value) = serde_json::to_value(&session) {
            save_json(&self.store, storage_keys::AUTH_SESSION, &value);
        }
        session
    }

    /// Creates an account and logs it in. Emails are trimmed and lowercased
    /// before lookup and storage.
    pub fn signup(&self, email: &str, password: &str) -> DomainResult<Session> {
        let email = email.trim().to_lowercase();
        if email.is_empty() || password.is_empty() {
            return Err(DomainError::MissingCredentials);
        }

        let mut users = self.users();
        if users.contains_key(&email) {
            return Err(DomainError::AccountExists);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| DomainError::HashingFailed(e.to_string()))?
            .to_string();

        users.insert(
            email.clone(),
            UserRecord {
                email: email.clone(),
                hash,
                created_at: now_iso(),
            },
        );
        self.save_users(&users);

        Ok(self.open_session(email))
    }

    /// Verifies an email/password pair and opens a session. Unknown emails
    /// and wrong passwords produce the same error.
    pub fn login(&self, email: &str, password: &str) -> DomainResult<Session> {
        let email = email.trim().to_lowercase();
        let users = self.users();
        let record = users.get(&email).ok_or(DomainError::InvalidCredentials)?;

        let parsed = PasswordHash::new(&record.hash).map_err(|_| DomainError::InvalidCredentials)?;
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .map_err(|_| DomainError::InvalidCredentials)?;

        Ok(self.open_session(email))
    }

    pub fn logout(&self) {
        self.store.remove(storage_keys::AUTH_SESSION);
    }

    pub fn session(&self) -> Option<Session> {
        load_json(&self.store, storage_keys::AUTH_SESSION)
            .and_then(|value| serde_json::from_value(value).ok())
    }

    pub fn is_authenticated(&self) -> bool {
        self.session().is_some()
    }
}
