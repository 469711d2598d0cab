use anyhow::{Context, Result};
use keyring::Entry;

use super::Token;

const SERVICE_NAME: &str = "tripjournal";

/// Keeps the last issued token in the OS keychain so a session can be
/// resumed by a later process.
pub struct CredentialStore;

impl CredentialStore {
    /// Store the token for a username in the OS keychain
    pub fn store(username: &str, token: &Token) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        let secret = serde_json::to_string(token).context("Failed to serialize token")?;
        entry
            .set_password(&secret)
            .context("Failed to store token in keychain")?;
        Ok(())
    }

    /// Retrieve the stored token for a username, if any
    pub fn load(username: &str) -> Result<Option<Token>> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        match entry.get_password() {
            Ok(secret) => {
                let token = serde_json::from_str(&secret)
                    .context("Failed to parse token stored in keychain")?;
                Ok(Some(token))
            }
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e).context("Failed to retrieve token from keychain"),
        }
    }

    /// Delete the stored token for a username. Missing entries are not an error.
    pub fn delete(username: &str) -> Result<()> {
        let entry = Entry::new(SERVICE_NAME, username)
            .context("Failed to create keyring entry")?;
        match entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e).context("Failed to delete token from keychain"),
        }
    }
}
