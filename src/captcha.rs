//! Captcha recognition capability.
//!
//! Recognition itself lives outside this crate. The SDK hands the raw image
//! bytes to whatever implementation the embedding application injects — a
//! local OCR model, a remote solving service, a human in the loop.

use thiserror::Error;

/// Recognition failure.
///
/// Callers treat this as an ordinary login failure: a wrong guess and a
/// failed guess both surface as `LoginFailed` on the attempt.
#[derive(Debug, Error)]
#[error("Captcha recognition failed: {0}")]
pub struct SolveError(pub String);

/// Turns a captcha image into the short text the portal expects.
///
/// Implementations are stateless from the SDK's point of view and may be
/// shared process-wide behind a single `Arc` or constructed per client —
/// nothing here assumes object identity.
pub trait CaptchaSolver: Send + Sync {
    fn solve(&self, image: &[u8]) -> Result<String, SolveError>;
}
