//! High-level client — `EmtClient` with nested sub-client accessors.
//!
//! Each domain has its own sub-client in `domain/<name>/client.rs`. This
//! module keeps the builder, the request engine, and session import/export.

use crate::auth::client::Auth;
use crate::auth::{Credentials, SecretObfuscator};
use crate::captcha::CaptchaSolver;
use crate::domain::account::client::Account;
use crate::domain::order::client::Orders;
use crate::domain::quote::client::Quote;
use crate::domain::trade::client::Trades;
use crate::error::{EmtError, HttpError};
use crate::http::{ApiBody, EmtHttp};
use crate::network::{self, RequestTag};

use async_lock::RwLock;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

// Re-export sub-client types for convenience.
pub use crate::auth::client::Auth as AuthClient;
pub use crate::domain::account::client::Account as AccountClient;
pub use crate::domain::order::client::Orders as OrdersClient;
pub use crate::domain::quote::client::Quote as QuoteClient;
pub use crate::domain::trade::client::Trades as TradesClient;

/// Everything needed to rebuild an authenticated session later: the durable
/// half of an [`EmtClient`]. The secret is deliberately not part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub username: String,
    pub validate_key: String,
    /// `name=value` cookie pairs for the portal origin.
    pub cookies: Vec<String>,
}

/// The primary entry point for the EMT SDK.
///
/// One instance per identity: the client owns its cookie channel and session
/// token exclusively, so independent identities never share state. Within one
/// identity the caller serializes operations.
#[derive(Clone)]
pub struct EmtClient {
    pub(crate) http: EmtHttp,
    pub(crate) credentials: Arc<RwLock<Credentials>>,
    pub(crate) solver: Arc<dyn CaptchaSolver>,
    pub(crate) obfuscator: Arc<dyn SecretObfuscator>,
}

impl std::fmt::Debug for EmtClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmtClient").finish_non_exhaustive()
    }
}

impl EmtClient {
    pub fn builder() -> EmtClientBuilder {
        EmtClientBuilder::default()
    }

    // ── Sub-client accessors ─────────────────────────────────────────────

    pub fn auth(&self) -> Auth<'_> {
        Auth { client: self }
    }

    pub fn account(&self) -> Account<'_> {
        Account { client: self }
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders { client: self }
    }

    pub fn trades(&self) -> Trades<'_> {
        Trades { client: self }
    }

    pub fn quote(&self) -> Quote<'_> {
        Quote { client: self }
    }

    /// Username of the identity this client was last logged in (or restored)
    /// as. Empty before the first login.
    pub async fn username(&self) -> String {
        self.credentials.read().await.username.clone()
    }

    // ── Session import/export ────────────────────────────────────────────

    /// Export the durable session state for persistence.
    pub async fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            username: self.credentials.read().await.username.clone(),
            validate_key: self.http.validate_key().await,
            cookies: self.http.cookie_strings(),
        }
    }

    /// Rehydrate a persisted session. The restored client cannot re-login on
    /// expiry until [`set_credentials`](Self::set_credentials) re-arms it.
    pub async fn restore_session(&self, snapshot: &SessionSnapshot) {
        *self.credentials.write().await = Credentials {
            username: snapshot.username.clone(),
            secret: None,
        };
        self.http.set_validate_key(&snapshot.validate_key).await;
        self.http.restore_cookies(&snapshot.cookies);
    }

    /// Arm the client with login credentials without logging in.
    pub async fn set_credentials(&self, username: &str, password: &str) {
        *self.credentials.write().await = Credentials {
            username: username.trim().to_string(),
            secret: Some(password.to_string()),
        };
    }

    // ── Request engine ───────────────────────────────────────────────────

    /// One tagged request. Logs in lazily when no token is held.
    pub(crate) async fn query(
        &self,
        tag: RequestTag,
        form: Option<Vec<(&'static str, String)>>,
    ) -> Result<ApiBody, EmtError> {
        if self.http.validate_key().await.is_empty() {
            let creds = self.credentials.read().await.clone();
            self.auth()
                .login(&creds.username, creds.secret.as_deref().unwrap_or(""))
                .await?;
        }
        let form = form.unwrap_or_else(default_page_form);
        Ok(self.http.post_tagged(tag, &form).await?)
    }

    /// [`query`](Self::query) plus the expiry-recovery policy: exactly one
    /// re-login and one retry on a stale token. A second expiry propagates,
    /// and no other error kind is ever retried here.
    pub(crate) async fn query_with_retry(
        &self,
        tag: RequestTag,
        form: Option<Vec<(&'static str, String)>>,
    ) -> Result<ApiBody, EmtError> {
        match self.query(tag, form.clone()).await {
            Err(EmtError::Http(HttpError::SessionExpired)) => {
                self.auth().relogin().await?;
                self.query(tag, form).await
            }
            other => other,
        }
    }
}

/// Default listing payload: first page, no cursor.
fn default_page_form() -> Vec<(&'static str, String)> {
    vec![("qqhs", "100".to_string()), ("dwc", String::new())]
}

// ═════════════════════════════════════════════════════════════════════════════
// Builder
// ═════════════════════════════════════════════════════════════════════════════

pub struct EmtClientBuilder {
    base_url: String,
    quote_url: String,
    solver: Option<Arc<dyn CaptchaSolver>>,
    obfuscator: Option<Arc<dyn SecretObfuscator>>,
}

impl Default for EmtClientBuilder {
    fn default() -> Self {
        Self {
            base_url: network::DEFAULT_PORTAL_URL.to_string(),
            quote_url: network::DEFAULT_QUOTE_URL.to_string(),
            solver: None,
            obfuscator: None,
        }
    }
}

impl EmtClientBuilder {
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

    pub fn build(self) -> Result<EmtClient, EmtError> {
        let solver = self
            .solver
            .ok_or_else(|| EmtError::Config("a captcha solver is required".into()))?;
        let obfuscator = self
            .obfuscator
            .ok_or_else(|| EmtError::Config("a secret obfuscator is required".into()))?;
        let origin = Url::parse(&self.base_url)
            .map_err(|e| EmtError::Config(format!("invalid portal url '{}': {e}", self.base_url)))?;

        Ok(EmtClient {
            http: EmtHttp::new(origin, &self.quote_url),
            credentials: Arc::new(RwLock::new(Credentials::default())),
            solver,
            obfuscator,
        })
    }
}
