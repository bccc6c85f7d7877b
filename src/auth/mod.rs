//! Authentication — credentials, login form, token extraction.
//!
//! ## Security model
//!
//! - The session token is an opaque string scraped from the authenticated
//!   Buy page; an empty token means "not authenticated".
//! - The plaintext secret stays in memory beside the username so that a
//!   mid-session expiry can be recovered by one re-login. It is never
//!   persisted and never appears in errors or logs.
//! - Password obfuscation is an injected capability: the portal's scheme is
//!   not implemented here.

pub mod client;

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;

/// Produces the ciphertext string the portal expects in its login form.
///
/// The output may be deterministic or randomized; the SDK only forwards it.
pub trait SecretObfuscator: Send + Sync {
    fn obfuscate(&self, secret: &str) -> String;
}

/// In-memory credentials for one portal identity.
#[derive(Clone, Default)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) secret: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Form-encoded login request.
#[derive(Debug, Serialize)]
pub(crate) struct LoginForm<'a> {
    #[serde(rename = "userId")]
    pub user_id: &'a str,
    /// Obfuscator output, never the plaintext secret.
    pub password: String,
    #[serde(rename = "randNumber")]
    pub rand_number: String,
    #[serde(rename = "identifyCode")]
    pub identify_code: String,
    /// Requested session duration in minutes.
    pub duration: u32,
    #[serde(rename = "authCode")]
    pub auth_code: &'a str,
    #[serde(rename = "type")]
    pub login_type: &'a str,
    #[serde(rename = "secInfo")]
    pub sec_info: &'a str,
}

lazy_static! {
    static ref VALIDATE_KEY_RE: Regex =
        Regex::new(r#"id="em_validatekey" type="hidden" value="(.*?)""#)
            .expect("validate-key pattern is well-formed");
}

/// Extract the session token from the authenticated landing page.
///
/// Absence of a match is an ordinary login failure (wrong captcha, or the
/// server rejected the credentials silently), not an exception.
pub(crate) fn extract_validate_key(html: &str) -> Option<String> {
    VALIDATE_KEY_RE
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|key| !key.is_empty())
}
