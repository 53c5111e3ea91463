//! Central identity and session management for the admin API.
//! Keep the public surface thin and split implementation across sub-modules.

mod gate;
mod provider;
mod session;
mod store;
mod user;

pub use gate::{authenticate, bearer_token};
pub use provider::{AuthService, LoginOutcome};
pub use session::{SessionRegistry, SessionToken, DEFAULT_TTL};
pub use store::CredentialStore;
pub use user::{PublicUser, Role, User};
