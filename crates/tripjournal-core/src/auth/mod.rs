//! Authentication state for the journal client.
//!
//! This module provides:
//! - `Session`: the token cell owned by a `JournalClient`, observable via `AuthStatus`
//! - `CredentialStore`: OS keychain persistence of the last issued token

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{AuthStatus, Session, Token};
