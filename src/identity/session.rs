//! Process-wide session token registry. Tokens are opaque random strings
//! looked up (never decoded) on each request. Expired entries are evicted
//! lazily, on the next lookup of that token; nothing sweeps the map, so
//! entries for tokens never presented again persist until process restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use base64::Engine;
use parking_lot::RwLock;
use tracing::debug;

pub type SessionToken = String;

/// Default session lifetime: 24 hours.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct SessionEntry {
    subject_id: String,
    expires_at: Instant,
}

/// Owned, injectable registry: created once at startup, shared by handle
/// clones, torn down at shutdown (all sessions lost, by design).
#[derive(Clone)]
pub struct SessionRegistry {
    ttl: Duration,
    entries: Arc<RwLock<HashMap<SessionToken, SessionEntry>>>,
}

fn gen_token() -> String {
    // 256-bit random token, base64url without padding. Entropy failure is
    // unrecoverable: a zeroed buffer would mean predictable tokens.
    let mut buf = [0u8; 32];
    getrandom::getrandom(&mut buf).expect("system entropy source unavailable");
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(buf)
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl SessionRegistry {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: Arc::new(RwLock::new(HashMap::new())) }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a fresh token for a subject with the registry's configured ttl.
    /// A subject may hold any number of concurrently valid tokens.
    pub fn issue(&self, subject_id: &str) -> SessionToken {
        self.issue_with_ttl(subject_id, self.ttl)
    }

    /// Issue with an explicit ttl. The token is guaranteed unique among
    /// currently registered tokens; a collision re-draws.
    pub fn issue_with_ttl(&self, subject_id: &str, ttl: Duration) -> SessionToken {
        let mut entries = self.entries.write();
        loop {
            let token = gen_token();
            if entries.contains_key(&token) {
                continue;
            }
            entries.insert(
                token.clone(),
                SessionEntry { subject_id: subject_id.to_string(), expires_at: Instant::now() + ttl },
            );
            debug!(subject = subject_id, ttl_secs = ttl.as_secs(), "session issued");
            return token;
        }
    }

    /// Resolve a token to its subject id. `None` for unknown and for expired
    /// tokens; an expired entry is removed as a side effect of this lookup
    /// (lazy eviction).
    pub fn validate(&self, token: &str) -> Option<String> {
        let now = Instant::now();
        let mut drop_key: Option<String> = None;
        let out = {
            let entries = self.entries.read();
            match entries.get(token) {
                Some(ent) if ent.expires_at > now => Some(ent.subject_id.clone()),
                Some(_) => {
                    drop_key = Some(token.to_string());
                    None
                }
                None => None,
            }
        };
        if let Some(k) = drop_key {
            self.entries.write().remove(&k);
        }
        out
    }

    /// Idempotent removal; revoking an absent token is a no-op.
    pub fn revoke(&self, token: &str) {
        if self.entries.write().remove(token).is_some() {
            debug!("session revoked");
        }
    }

    /// Number of registered entries, stale ones included.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_then_validate_returns_subject() {
        let reg = SessionRegistry::default();
        let token = reg.issue("u1");
        assert_eq!(reg.validate(&token), Some("u1".to_string()));
        // validating does not consume a live token
        assert_eq!(reg.validate(&token), Some("u1".to_string()));
    }

    #[test]
    fn expired_token_is_invalid_and_evicted_on_lookup() {
        let reg = SessionRegistry::new(Duration::ZERO);
        let token = reg.issue("u1");
        // entry persists until someone presents the token again
        assert_eq!(reg.len(), 1);
        assert_eq!(reg.validate(&token), None);
        assert_eq!(reg.len(), 0);
    }

    #[test]
    fn unpresented_expired_entries_linger() {
        // the documented growth defect: no sweep runs independently of lookups
        let reg = SessionRegistry::new(Duration::ZERO);
        let _stale = reg.issue("u1");
        let _stale2 = reg.issue("u1");
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn tokens_are_full_entropy_base64url() {
        use base64::Engine;
        let reg = SessionRegistry::default();
        let token = reg.issue("u1");
        let bytes =
            base64::engine::general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap();
        assert_eq!(bytes.len(), 32);
        assert!(bytes.iter().any(|b| *b != 0));
    }

    #[test]
    fn revoke_is_idempotent() {
        let reg = SessionRegistry::default();
        let token = reg.issue("u1");
        reg.revoke(&token);
        assert_eq!(reg.validate(&token), None);
        reg.revoke(&token);
        reg.revoke("never-issued");
    }

    #[test]
    fn subjects_may_hold_multiple_tokens() {
        let reg = SessionRegistry::default();
        let a = reg.issue("u1");
        let b = reg.issue("u1");
        assert_ne!(a, b);
        assert_eq!(reg.validate(&a), Some("u1".to_string()));
        assert_eq!(reg.validate(&b), Some("u1".to_string()));
        reg.revoke(&a);
        assert_eq!(reg.validate(&a), None);
        assert_eq!(reg.validate(&b), Some("u1".to_string()));
    }
}
