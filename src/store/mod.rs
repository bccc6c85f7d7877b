//! Durable session storage keyed by username.

pub mod file;

pub use file::FileSessionStore;

use crate::client::SessionSnapshot;
use crate::error::StoreError;
use std::time::Duration;

/// Capability set for persisting authenticated sessions.
///
/// One record per username. `load` must treat expired or corrupt expiry
/// metadata as absence (and clean up), never as an error — cache lookups are
/// total. Record-level I/O and deserialization failures do surface.
pub trait SessionStore: Send + Sync {
    /// Persist a snapshot, optionally bounded by a time-to-live.
    ///
    /// Fails with [`StoreError::EmptyIdentity`] when the snapshot has no
    /// username.
    fn save(&self, snapshot: &SessionSnapshot, ttl: Option<Duration>) -> Result<(), StoreError>;

    /// Fetch the snapshot for a username, `None` when missing or expired.
    fn load(&self, username: &str) -> Result<Option<SessionSnapshot>, StoreError>;

    /// Remove a record. Returns whether one existed.
    fn delete(&self, username: &str) -> Result<bool, StoreError>;

    /// Usernames with a currently-valid record. Records saved without a TTL
    /// count as valid by existence.
    fn list_users(&self) -> Result<Vec<String>, StoreError>;
}
