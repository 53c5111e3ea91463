//! Account lifecycle service over the credential store and session registry.
//! HTTP handlers stay thin JSON adapters around these operations.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use super::session::{SessionRegistry, SessionToken};
use super::store::CredentialStore;
use super::user::{Role, User};
use crate::error::{AppError, AppResult};

/// A successful login or registration: the issued token plus the subject.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: SessionToken,
    pub user: User,
}

#[derive(Clone)]
pub struct AuthService {
    pub users: CredentialStore,
    pub sessions: SessionRegistry,
}

impl AuthService {
    pub fn new(users: CredentialStore, sessions: SessionRegistry) -> Self {
        Self { users, sessions }
    }

    /// Verify credentials and issue a session. The failure is the same for an
    /// unknown email and a wrong password.
    pub fn login(&self, email: &str, password: &str) -> AppResult<LoginOutcome> {
        let Some(user) = self.users.verify_credential(email, password) else {
            return Err(AppError::auth("invalid_credentials", "Invalid email or password"));
        };
        let token = self.sessions.issue(&user.id);
        info!(user = %user.id, "login");
        Ok(LoginOutcome { token, user })
    }

    /// Register a new account and log it in. At-most-one-registration-per-email
    /// is best-effort: this check and the insert below are separate steps, so
    /// two concurrent registrations for the same email can interleave (the
    /// store's own lock narrows the window without closing it here).
    pub fn register(&self, email: &str, password: &str, name: &str) -> AppResult<LoginOutcome> {
        if self.users.find_by_email(email).is_some() {
            return Err(AppError::conflict("duplicate_email", "User already exists"));
        }
        let user = User {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            password_hash: CredentialStore::hash_secret(password),
            name: name.to_string(),
            role: Role::User,
            avatar: None,
            created_at: Utc::now(),
        };
        self.users.insert(user.clone())?;
        let token = self.sessions.issue(&user.id);
        info!(user = %user.id, email, "registered");
        Ok(LoginOutcome { token, user })
    }

    /// Issue a fresh token for an authenticated subject. The token that
    /// carried the request is left untouched and stays valid until its own
    /// expiry.
    pub fn refresh(&self, user: &User) -> SessionToken {
        self.sessions.issue(&user.id)
    }

    /// Revoke exactly the presented token; other sessions of the same subject
    /// remain valid.
    pub fn logout(&self, token: &str) {
        self.sessions.revoke(token);
    }
}
