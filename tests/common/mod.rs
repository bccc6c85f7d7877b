//! Shared helpers for the wiremock-backed integration suites.

use emt_sdk::prelude::*;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const USERNAME: &str = "540975189038";
pub const PASSWORD: &str = "123731";
pub const VALIDATE_KEY: &str = "3f2b6f2c-9c4e-4d55-a7b0-5f4f6e2d1c3a";
pub const CAPTCHA_CODE: &str = "8244";

/// Solver that always answers the same code — the mocked portal accepts
/// anything, so recognition accuracy is irrelevant here.
pub struct FixedSolver(pub &'static str);

impl CaptchaSolver for FixedSolver {
    fn solve(&self, _image: &[u8]) -> Result<String, SolveError> {
        Ok(self.0.to_string())
    }
}

/// Obfuscator with a recognizable prefix so request bodies can be asserted
/// to carry the obfuscated form and never the plaintext.
pub struct TaggingObfuscator;

impl SecretObfuscator for TaggingObfuscator {
    fn obfuscate(&self, secret: &str) -> String {
        format!("obf:{secret}")
    }
}

pub fn solver() -> Arc<dyn CaptchaSolver> {
    Arc::new(FixedSolver(CAPTCHA_CODE))
}

pub fn obfuscator() -> Arc<dyn SecretObfuscator> {
    Arc::new(TaggingObfuscator)
}

pub fn build_client(server: &MockServer) -> EmtClient {
    EmtClient::builder()
        .base_url(&server.uri())
        .quote_url(&format!("{}/api/SHSZQuoteSnapshot", server.uri()))
        .captcha_solver(solver())
        .obfuscator(obfuscator())
        .build()
        .expect("client builds")
}

pub fn landing_page(key: &str) -> String {
    format!(
        r#"<html><body><form><input id="em_validatekey" type="hidden" value="{key}" /></form></body></html>"#
    )
}

/// Mount the three-step login flow: captcha image, authentication POST
/// (expected exactly `expected_logins` times), landing page with the key.
pub async fn mount_login_mocks(server: &MockServer, expected_logins: u64) {
    Mock::given(method("GET"))
        .and(path("/Login/YZM"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(&b"\x89PNG\r\n\x1a\n"[..], "image/png"))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/Login/Authentication"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"Status": 0, "Message": "ok"})),
        )
        .expect(expected_logins)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/Trade/Buy"))
        .respond_with(ResponseTemplate::new(200).set_body_string(landing_page(VALIDATE_KEY)))
        .mount(server)
        .await;
}
