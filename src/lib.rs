//! # EMT SDK
//!
//! A Rust client for the EMT retail web trading portal: captcha-assisted
//! login, per-session token handling, the trading query/order catalogue, and
//! disk-backed multi-user session caching.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Capabilities** — injected seams: [`captcha::CaptchaSolver`] and
//!    [`auth::SecretObfuscator`]. OCR and the portal's password scheme are
//!    not implemented here.
//! 2. **Transport** — one cookie-bearing HTTP channel per identity, with a
//!    single classification gate for every response (internal).
//! 3. **Auth** — captcha challenge, encrypted login form, token extraction
//!    from the landing page, session-expiry recovery.
//! 4. **Domain** — `account` / `order` / `trade` / `quote` sub-clients.
//! 5. **Lifecycle** — [`store`] persistence and [`manager::ClientManager`]
//!    with bounded login retry.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use emt_sdk::prelude::*;
//! use std::sync::Arc;
//!
//! let client = EmtClient::builder()
//!     .captcha_solver(Arc::new(my_ocr))
//!     .obfuscator(Arc::new(my_obfuscator))
//!     .build()?;
//!
//! client.auth().login("540975189038", "secret").await?;
//! let positions = client.account().asset_and_position().await?;
//! let receipt = client
//!     .orders()
//!     .create("000002", Direction::Buy, "SA", 5.01, 100)
//!     .await?;
//! ```
//!
//! The crate never installs a tracing subscriber; logging setup belongs to
//! the embedding application.

// ── Layer 1: Capabilities ────────────────────────────────────────────────────

/// Captcha recognition seam.
pub mod captcha;

/// Portal endpoints and shared headers.
pub mod network;

/// Unified SDK error types.
pub mod error;

// ── Layer 2: Transport ───────────────────────────────────────────────────────

pub(crate) mod http;

// ── Layer 3: Auth ────────────────────────────────────────────────────────────

/// Authentication: credentials, login form, token extraction.
pub mod auth;

// ── Layer 4: Domain ──────────────────────────────────────────────────────────

/// Domain modules (vertical slices) with their sub-clients.
pub mod domain;

/// `EmtClient` — the primary entry point.
pub mod client;

// ── Layer 5: Lifecycle ───────────────────────────────────────────────────────

/// Durable session storage.
pub mod store;

/// `ClientManager` — cached, retrying client acquisition.
pub mod manager;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Capabilities
    pub use crate::auth::SecretObfuscator;
    pub use crate::captcha::{CaptchaSolver, SolveError};

    // Domain types
    pub use crate::domain::order::Direction;

    // Errors
    pub use crate::error::{AuthError, EmtError, HttpError, StoreError};

    // Network
    pub use crate::network::{DEFAULT_PORTAL_URL, DEFAULT_QUOTE_URL};

    // Client + sub-clients
    pub use crate::client::{
        AccountClient, AuthClient, EmtClient, EmtClientBuilder, OrdersClient, QuoteClient,
        SessionSnapshot, TradesClient,
    };

    // Lifecycle
    pub use crate::manager::{ClientManager, ClientManagerBuilder, ValidityPolicy};
    pub use crate::store::{FileSessionStore, SessionStore};
}
