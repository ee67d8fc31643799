//! Bearer token cache.

use tokio::sync::RwLock;

/// Holds the current auth token for one client.
///
/// Owned by the transport; each client starts empty.
#[derive(Debug, Default)]
pub struct TokenCache {
    token: RwLock<Option<String>>,
}

impl TokenCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self) -> Option<String> {
        self.token.read().await.clone()
    }

    pub async fn set(&self, token: String) {
        *self.token.write().await = Some(token);
    }

    /// Forget the current token.
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }
}
