//! Client lifecycle — cache lookup, validation, bounded re-login, persistence.
//!
//! `ClientManager` is the one place that holds both halves of an identity:
//! the durable session (via the store) and the secret (per call). It owns
//! every retry decision; the authentication engine itself never retries.

use crate::auth::SecretObfuscator;
use crate::captcha::CaptchaSolver;
use crate::client::EmtClient;
use crate::error::{AuthError, EmtError, HttpError};
use crate::network;
use crate::store::{FileSessionStore, SessionStore};

use std::sync::Arc;
use std::time::Duration;

/// How a cached session proves it is still usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidityPolicy {
    /// Trust the store's expiry sidecar; no network traffic on reuse.
    #[default]
    Ttl,
    /// Probe each restored session with a cheap authenticated query.
    Verify,
}

/// Manager for [`EmtClient`] instances with session persistence.
#[derive(Clone)]
pub struct ClientManager {
    store: Arc<dyn SessionStore>,
    policy: ValidityPolicy,
    default_ttl: Duration,
    base_url: String,
    quote_url: String,
    solver: Arc<dyn CaptchaSolver>,
    obfuscator: Arc<dyn SecretObfuscator>,
}

impl ClientManager {
    pub fn builder() -> ClientManagerBuilder {
        ClientManagerBuilder::default()
    }

    /// Get an authenticated client for `username`, reusing a cached session
    /// when the validity policy accepts it.
    ///
    /// Runs up to `max_retries` attempts. Retryable failures (captcha or
    /// credential rounds, stale sessions, transport) loop; structured API
    /// rejections, store and configuration failures propagate immediately.
    /// Exhaustion purges any stale record and yields `LoginFailed` with the
    /// attempt count.
    pub async fn get_client(
        &self,
        username: &str,
        password: &str,
        max_retries: u32,
    ) -> Result<EmtClient, EmtError> {
        let username = username.trim();
        let attempts = max_retries.max(1);
        let mut last_error: Option<EmtError> = None;

        for attempt in 1..=attempts {
            match self.attempt(username, password).await {
                Ok(client) => return Ok(client),
                Err(err) if is_retryable(&err) => {
                    tracing::warn!(
                        "attempt {}/{} for {} failed: {}",
                        attempt,
                        attempts,
                        username,
                        err
                    );
                    last_error = Some(err);
                }
                Err(err) => return Err(err),
            }
        }

        if let Err(err) = self.store.delete(username) {
            tracing::warn!("failed to purge stale entry for {}: {}", username, err);
        }
        Err(AuthError::RetriesExhausted {
            username: username.to_string(),
            attempts,
            last_error: last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
        }
        .into())
    }

    /// Drop the cached session for `username`. Returns whether one existed.
    pub fn invalidate(&self, username: &str) -> Result<bool, EmtError> {
        Ok(self.store.delete(username.trim())?)
    }

    /// Usernames with a currently-valid cached session.
    pub fn list_cached_users(&self) -> Result<Vec<String>, EmtError> {
        Ok(self.store.list_users()?)
    }

    async fn attempt(&self, username: &str, password: &str) -> Result<EmtClient, EmtError> {
        if let Some(snapshot) = self.store.load(username)? {
            let client = self.build_client()?;
            client.restore_session(&snapshot).await;
            // Re-arm with the secret we hold so expiry re-login works.
            client.set_credentials(username, password).await;

            match self.policy {
                ValidityPolicy::Ttl => {
                    tracing::debug!("reusing cached session for {}", username);
                    return Ok(client);
                }
                ValidityPolicy::Verify => {
                    if client.auth().verify_session().await {
                        tracing::debug!("cached session for {} verified", username);
                        return Ok(client);
                    }
                    tracing::info!("cached session for {} failed verification, purging", username);
                    self.store.delete(username)?;
                }
            }
        }

        let client = self.build_client()?;
        client.auth().login(username, password).await?;

        let ttl = matches!(self.policy, ValidityPolicy::Ttl).then_some(self.default_ttl);
        self.store.save(&client.snapshot().await, ttl)?;
        Ok(client)
    }

    fn build_client(&self) -> Result<EmtClient, EmtError> {
        EmtClient::builder()
            .base_url(&self.base_url)
            .quote_url(&self.quote_url)
            .captcha_solver(self.solver.clone())
            .obfuscator(self.obfuscator.clone())
            .build()
    }
}

/// A fresh login round can fix a misread captcha, a stale session, or a
/// transport hiccup; it cannot fix a structured API rejection or a broken
/// store.
fn is_retryable(err: &EmtError) -> bool {
    matches!(
        err,
        EmtError::Auth(AuthError::LoginFailed { .. })
            | EmtError::Http(HttpError::SessionExpired)
            | EmtError::Http(HttpError::Transport(_))
    )
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct ClientManagerBuilder {
    store: Option<Arc<dyn SessionStore>>,
    policy: ValidityPolicy,
    default_ttl: Duration,
    base_url: String,
    quote_url: String,
    solver: Option<Arc<dyn CaptchaSolver>>,
    obfuscator: Option<Arc<dyn SecretObfuscator>>,
}

impl Default for ClientManagerBuilder {
    fn default() -> Self {
        Self {
            store: None,
            policy: ValidityPolicy::default(),
            default_ttl: Duration::from_secs(1800),
            base_url: network::DEFAULT_PORTAL_URL.to_string(),
            quote_url: network::DEFAULT_QUOTE_URL.to_string(),
            solver: None,
            obfuscator: None,
        }
    }
}

impl ClientManagerBuilder {
    /// Session store. Defaults to [`FileSessionStore::from_env`].
    pub fn store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    pub fn policy(mut self, policy: ValidityPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// TTL applied when persisting under [`ValidityPolicy::Ttl`].
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = ttl;
        self
    }

    pub fn base_url(mut self, url: &str) -> Self {
        self.base_url = url.to_string();
        self
    }

    pub fn quote_url(mut self, url: &str) -> Self {
        self.quote_url = url.to_string();
        self
    }

    pub fn captcha_solver(mut self, solver: Arc<dyn CaptchaSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    pub fn obfuscator(mut self, obfuscator: Arc<dyn SecretObfuscator>) -> Self {
        self.obfuscator = Some(obfuscator);
        self
    }

    pub fn build(self) -> Result<ClientManager, EmtError> {
        let store = match self.store {
            Some(store) => store,
            None => Arc::new(FileSessionStore::from_env()?),
        };
        let solver = self
            .solver
            .ok_or_else(|| EmtError::Config("a captcha solver is required".into()))?;
        let obfuscator = self
            .obfuscator
            .ok_or_else(|| EmtError::Config("a secret obfuscator is required".into()))?;

        Ok(ClientManager {
            store,
            policy: self.policy,
            default_ttl: self.default_ttl,
            base_url: self.base_url,
            quote_url: self.quote_url,
            solver,
            obfuscator,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification_is_explicit() {
        let login_failed: EmtError = AuthError::LoginFailed {
            username: "u".into(),
            reason: "captcha".into(),
        }
        .into();
        assert!(is_retryable(&login_failed));
        assert!(is_retryable(&EmtError::Http(HttpError::SessionExpired)));

        let api: EmtError = HttpError::Api {
            message: "rejected".into(),
            status: 200,
            body: "{}".into(),
        }
        .into();
        assert!(!is_retryable(&api));
        assert!(!is_retryable(&EmtError::Config("bad".into())));
        assert!(!is_retryable(&EmtError::Store(
            crate::error::StoreError::EmptyIdentity
        )));
    }

    #[test]
    fn ttl_is_the_default_policy() {
        assert_eq!(ValidityPolicy::default(), ValidityPolicy::Ttl);
    }
}
