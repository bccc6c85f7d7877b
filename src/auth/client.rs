//! Auth sub-client — captcha challenge, login, re-login, session validation.

use rand::rngs::OsRng;
use rand::Rng;

use crate::auth::{self, Credentials, LoginForm};
use crate::client::EmtClient;
use crate::error::{AuthError, EmtError};
use crate::network::{self, RequestTag};

/// Sub-client for authentication operations.
pub struct Auth<'a> {
    pub(crate) client: &'a EmtClient,
}

impl<'a> Auth<'a> {
    /// Login with the default session duration.
    ///
    /// Empty `username`/`password` fall back to the `EM_USERNAME` /
    /// `EM_PASSWORD` environment variables. Returns the session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, EmtError> {
        self.login_with(username, password, network::DEFAULT_SESSION_DURATION_MIN)
            .await
    }

    /// Login requesting an explicit session duration in minutes.
    ///
    /// One captcha round per call: a misread captcha fails the whole attempt,
    /// and retrying is the caller's decision (`ClientManager` bounds it).
    pub async fn login_with(
        &self,
        username: &str,
        password: &str,
        duration: u32,
    ) -> Result<String, EmtError> {
        let username = if username.is_empty() {
            std::env::var("EM_USERNAME").unwrap_or_default()
        } else {
            username.to_string()
        };
        let password = if password.is_empty() {
            std::env::var("EM_PASSWORD").unwrap_or_default()
        } else {
            password.to_string()
        };
        let username = username.trim().to_string();

        // Remember the identity for persistence and the secret for re-login.
        *self.client.credentials.write().await = Credentials {
            username: username.clone(),
            secret: Some(password.clone()),
        };

        let (correlation, code) = self.captcha_challenge(&username).await?;

        let form = LoginForm {
            user_id: &username,
            password: self.client.obfuscator.obfuscate(password.trim()),
            rand_number: format!("{}", correlation),
            identify_code: code,
            duration,
            auth_code: "",
            login_type: "Z",
            sec_info: "",
        };
        self.client.http.post_login(&form).await?;

        let page = self.client.http.fetch_page(network::TRADE_BUY_PATH).await?;
        match auth::extract_validate_key(&page) {
            Some(key) => {
                tracing::info!("login succeeded for {}", username);
                self.client.http.set_validate_key(&key).await;
                Ok(key)
            }
            None => Err(AuthError::LoginFailed {
                username,
                reason: "no validation key on the landing page; check username, password and captcha"
                    .into(),
            }
            .into()),
        }
    }

    /// Re-login after session expiry using the stored identity.
    ///
    /// The secret comes from memory when the client logged in itself, or from
    /// whoever re-armed a restored client; `EM_PASSWORD` is the last resort.
    pub async fn relogin(&self) -> Result<String, EmtError> {
        tracing::info!("session expired, attempting to re-login");
        self.client.http.clear_validate_key().await;
        let creds = self.client.credentials.read().await.clone();
        let secret = creds.secret.unwrap_or_default();
        self.login(&creds.username, &secret).await
    }

    /// Whether the current session still works.
    ///
    /// A single asset/position probe without expiry-retry; any failure reads
    /// as "not valid".
    pub async fn verify_session(&self) -> bool {
        if self.client.http.validate_key().await.is_empty() {
            return false;
        }
        self.client
            .query(RequestTag::AssetAndPosition, None)
            .await
            .is_ok()
    }

    async fn captcha_challenge(&self, username: &str) -> Result<(f64, String), EmtError> {
        // Crypto-grade correlation number: concurrent logins must not collide.
        let correlation: f64 = OsRng.gen();
        let image = self.client.http.fetch_captcha(correlation).await?;
        let code = self
            .client
            .solver
            .solve(&image)
            .map_err(|e| AuthError::LoginFailed {
                username: username.to_string(),
                reason: e.to_string(),
            })?;
        Ok((correlation, code))
    }
}
