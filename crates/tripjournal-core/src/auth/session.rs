use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::info;

/// Bearer credential issued by `/register` and `/token`.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
}

impl Token {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: "bearer".to_string(),
        }
    }
}

// Keep the secret out of logs and panic messages
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Debug, Clone)]
struct SessionCell {
    token: Option<Token>,
    version: u64,
}

/// The single authentication cell of a journal client.
///
/// Writes go through `authenticate` and `clear`, which only the client
/// calls. Every write bumps `version`, so observers can count transitions
/// even when they are slow to look.
pub struct Session {
    cell: watch::Sender<SessionCell>,
}

impl Session {
    pub(crate) fn new() -> Self {
        let (cell, _) = watch::channel(SessionCell {
            token: None,
            version: 0,
        });
        Self { cell }
    }

    pub(crate) fn authenticate(&self, token: Token) {
        self.cell.send_modify(|cell| {
            cell.token = Some(token);
            cell.version += 1;
        });
        info!("Session authenticated");
    }

    pub(crate) fn clear(&self) {
        self.cell.send_modify(|cell| {
            cell.token = None;
            cell.version += 1;
        });
        info!("Session cleared");
    }

    /// Snapshot of the current token
    pub(crate) fn token(&self) -> Option<Token> {
        self.cell.borrow().token.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.cell.borrow().token.is_some()
    }

    pub fn subscribe(&self) -> AuthStatus {
        AuthStatus {
            rx: self.cell.subscribe(),
        }
    }
}

/// Subscription to a session's "is authenticated" flag.
#[derive(Debug, Clone)]
pub struct AuthStatus {
    rx: watch::Receiver<SessionCell>,
}

impl AuthStatus {
    pub fn is_authenticated(&self) -> bool {
        self.rx.borrow().token.is_some()
    }

    /// Number of login/register/logout transitions since the client was built
    pub fn version(&self) -> u64 {
        self.rx.borrow().version
    }

    /// Wait for the next transition and return the new flag.
    ///
    /// Returns `None` once the owning client (and all its clones) is dropped.
    pub async fn changed(&mut self) -> Option<bool> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().token.is_some())
    }
}
