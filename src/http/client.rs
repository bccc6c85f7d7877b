//! Low-level HTTP transport — `EmtHttp`.
//!
//! One cookie-bearing channel per authenticated identity. Every response
//! passes through [`classify`], the single gate that sorts portal traffic
//! into binary, success, session-expired, API-error, and transport-error.

use crate::auth::LoginForm;
use crate::error::HttpError;
use crate::network::{self, RequestTag};

use async_lock::RwLock;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{CONTENT_TYPE, REFERER};
use reqwest::{Client, Response, Url};
use std::sync::Arc;
use std::time::Duration;

/// Classified response body.
#[derive(Debug, Clone)]
pub(crate) enum ApiBody {
    /// Opaque bytes (captcha image). Bypasses envelope classification.
    Binary(Vec<u8>),
    /// Structured success — any JSON whose envelope `Status` is not an error.
    Json(serde_json::Value),
    /// Plain-text success (order revocation receipts, HTML pages).
    Text(String),
}

impl ApiBody {
    pub(crate) fn into_json(self) -> Result<serde_json::Value, HttpError> {
        match self {
            ApiBody::Json(value) => Ok(value),
            ApiBody::Text(_) => Err(HttpError::Decode("expected JSON, got text".into())),
            ApiBody::Binary(_) => Err(HttpError::Decode("expected JSON, got binary".into())),
        }
    }

    pub(crate) fn into_text(self) -> Result<String, HttpError> {
        match self {
            ApiBody::Text(text) => Ok(text),
            // Bare numbers and quoted strings parse as JSON; give them back as text.
            ApiBody::Json(serde_json::Value::String(s)) => Ok(s),
            ApiBody::Json(value) => Ok(value.to_string()),
            ApiBody::Binary(_) => Err(HttpError::Decode("expected text, got binary".into())),
        }
    }
}

/// Cookie-bearing HTTP channel for one portal identity.
///
/// Holds the session token behind a lock so sub-clients can share `&self`;
/// an empty token means "not authenticated".
#[derive(Clone)]
pub(crate) struct EmtHttp {
    base_url: String,
    quote_url: String,
    origin: Url,
    client: Client,
    jar: Arc<Jar>,
    validate_key: Arc<RwLock<String>>,
}

impl EmtHttp {
    pub(crate) fn new(origin: Url, quote_url: &str) -> Self {
        let jar = Arc::new(Jar::default());
        let client = Client::builder()
            .cookie_provider(jar.clone())
            .default_headers(network::BASE_HEADERS.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: origin.as_str().trim_end_matches('/').to_string(),
            quote_url: quote_url.to_string(),
            origin,
            client,
            jar,
            validate_key: Arc::new(RwLock::new(String::new())),
        }
    }

    // ── Session token ────────────────────────────────────────────────────

    pub(crate) async fn validate_key(&self) -> String {
        self.validate_key.read().await.clone()
    }

    pub(crate) async fn set_validate_key(&self, key: &str) {
        *self.validate_key.write().await = key.to_string();
    }

    pub(crate) async fn clear_validate_key(&self) {
        self.validate_key.write().await.clear();
    }

    // ── Cookies (for session persistence) ────────────────────────────────

    /// `name=value` pairs currently held for the portal origin.
    pub(crate) fn cookie_strings(&self) -> Vec<String> {
        match self.jar.cookies(&self.origin) {
            Some(header) => header
                .to_str()
                .unwrap_or_default()
                .split("; ")
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
            None => Vec::new(),
        }
    }

    pub(crate) fn restore_cookies(&self, cookies: &[String]) {
        for cookie in cookies {
            self.jar.add_cookie_str(cookie, &self.origin);
        }
    }

    // ── Portal requests ──────────────────────────────────────────────────

    /// Form-encoded POST against a token-bearing endpoint.
    pub(crate) async fn post_tagged(
        &self,
        tag: RequestTag,
        form: &[(&str, String)],
    ) -> Result<ApiBody, HttpError> {
        assert!(tag.token_bearing(), "{tag:?} does not take a session token");
        let key = self.validate_key().await;
        let url = format!("{}{}{}", self.base_url, tag.path(), key);
        tracing::debug!("(tag={:?}), (data={:?}), (url={})", tag, form, url);

        let resp = self
            .client
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .form(form)
            .send()
            .await?;
        classify(resp).await
    }

    /// Fetch a captcha image tagged with a correlation number.
    pub(crate) async fn fetch_captcha(&self, correlation: f64) -> Result<Vec<u8>, HttpError> {
        let url = format!("{}{}{}", self.base_url, RequestTag::Captcha.path(), correlation);
        let resp = self
            .client
            .get(&url)
            .timeout(Duration::from_secs(60))
            .send()
            .await?;
        match classify(resp).await? {
            ApiBody::Binary(bytes) => Ok(bytes),
            _ => Err(HttpError::Decode("captcha endpoint returned a non-image body".into())),
        }
    }

    /// POST the login form.
    pub(crate) async fn post_login(&self, form: &LoginForm<'_>) -> Result<ApiBody, HttpError> {
        let url = format!("{}{}", self.base_url, RequestTag::Login.path());
        let referer = format!("{}{}", self.base_url, network::LOGIN_REFERER_PATH);
        let resp = self
            .client
            .post(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .header(REFERER, referer)
            .form(form)
            .send()
            .await?;
        classify(resp).await
    }

    /// GET a portal page as text (token extraction reads the Buy page).
    pub(crate) async fn fetch_page(&self, path: &str) -> Result<String, HttpError> {
        let url = format!("{}{}", self.base_url, path);
        let resp = self.client.get(&url).send().await?;
        classify(resp).await?.into_text()
    }

    /// GET the market snapshot for a symbol from the quote host.
    pub(crate) async fn fetch_quote_snapshot(
        &self,
        symbol: &str,
        market: &str,
    ) -> Result<ApiBody, HttpError> {
        let resp = self
            .client
            .get(&self.quote_url)
            .query(&[("id", symbol.trim()), ("market", market)])
            .send()
            .await?;
        classify(resp).await
    }
}

/// The classification gate. Every portal response passes through here.
async fn classify(resp: Response) -> Result<ApiBody, HttpError> {
    let status = resp.status().as_u16();
    let url = resp.url().clone();
    let is_image = resp
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.contains("image"))
        .unwrap_or(false);

    if is_image {
        let bytes = resp.bytes().await?;
        return Ok(ApiBody::Binary(bytes.to_vec()));
    }

    let body = resp.text().await?;

    if status != 200 {
        tracing::error!("request {} failed, code={}, response={}", url, status, body);
        return Err(HttpError::Status { status, body });
    }

    if let Ok(json) = serde_json::from_str::<serde_json::Value>(&body) {
        match json.get("Status").and_then(|s| s.as_i64()) {
            Some(-2) => {
                tracing::warn!("session expired: {}", body);
                return Err(HttpError::SessionExpired);
            }
            Some(-1) => {
                tracing::error!("request {} failed, code={}, response={}", url, status, body);
                let message = json
                    .get("Message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| body.clone());
                return Err(HttpError::Api { message, status, body });
            }
            _ => return Ok(ApiBody::Json(json)),
        }
    }

    Ok(ApiBody::Text(body))
}
