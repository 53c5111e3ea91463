//! In-memory credential store: account records keyed by id with an email
//! index. Restart loses everything; persistence is a collaborator concern.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use super::user::User;
use crate::error::{AppError, AppResult};

#[derive(Default)]
struct Inner {
    by_id: HashMap<String, User>,
    email_index: HashMap<String, String>,
}

/// Cheaply clonable handle over the shared account map.
#[derive(Clone, Default)]
pub struct CredentialStore(Arc<RwLock<Inner>>);

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One-way digest applied to every stored and presented secret.
    pub fn hash_secret(secret: &str) -> String {
        hex::encode(Sha256::digest(secret.as_bytes()))
    }

    pub fn find_by_id(&self, id: &str) -> Option<User> {
        self.0.read().by_id.get(id).cloned()
    }

    /// Email lookup is case-sensitive, exactly as stored.
    pub fn find_by_email(&self, email: &str) -> Option<User> {
        let inner = self.0.read();
        inner.email_index.get(email).and_then(|id| inner.by_id.get(id)).cloned()
    }

    /// Insert a new account. The email existence check here runs under the
    /// store's own write lock, but callers doing their own check-then-insert
    /// still race across that pair of calls.
    pub fn insert(&self, user: User) -> AppResult<()> {
        let mut inner = self.0.write();
        if inner.email_index.contains_key(&user.email) {
            return Err(AppError::conflict("duplicate_email", "User already exists"));
        }
        inner.email_index.insert(user.email.clone(), user.id.clone());
        inner.by_id.insert(user.id.clone(), user);
        Ok(())
    }

    /// Verify a presented secret by digest comparison. Returns `None` both for
    /// an unknown email and for a wrong secret; callers cannot tell the cases
    /// apart and must not try to.
    pub fn verify_credential(&self, email: &str, secret: &str) -> Option<User> {
        let presented = Self::hash_secret(secret);
        self.find_by_email(email).filter(|u| u.password_hash == presented)
    }

    pub fn len(&self) -> usize {
        self.0.read().by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
