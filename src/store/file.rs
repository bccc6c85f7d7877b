//! File-backed session store.
//!
//! One JSON record per username plus an optional plaintext expiry sidecar
//! (`<username>.meta`, unix seconds). Both files live and die together.

use crate::client::SessionSnapshot;
use crate::error::StoreError;
use crate::store::SessionStore;

use chrono::Utc;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable overriding the storage directory.
pub const STORE_DIR_ENV: &str = "EMT_STORE_DIR";

/// Directory name under the home directory when no override is set.
const DEFAULT_DIR_NAME: &str = ".emt-sdk";

pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    /// Store rooted at an explicit directory, created if missing.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Store rooted at `$EMT_STORE_DIR`, falling back to `~/.emt-sdk`.
    pub fn from_env() -> Result<Self, StoreError> {
        let dir = match std::env::var(STORE_DIR_ENV) {
            Ok(dir) if !dir.is_empty() => PathBuf::from(dir),
            _ => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(DEFAULT_DIR_NAME),
        };
        Self::new(dir)
    }

    pub fn dir(&self) -> &std::path::Path {
        &self.dir
    }

    fn record_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{username}.json"))
    }

    fn meta_path(&self, username: &str) -> PathBuf {
        self.dir.join(format!("{username}.meta"))
    }

    /// Whether the sidecar (if any) still marks the record as fresh.
    /// A corrupt or unreadable sidecar reads as already expired.
    fn sidecar_fresh(&self, username: &str, now: i64) -> Option<bool> {
        let meta = self.meta_path(username);
        if !meta.exists() {
            return None;
        }
        let fresh = fs::read_to_string(&meta)
            .ok()
            .and_then(|s| s.trim().parse::<i64>().ok())
            .map(|expires_at| now <= expires_at)
            .unwrap_or(false);
        Some(fresh)
    }
}

impl SessionStore for FileSessionStore {
    fn save(&self, snapshot: &SessionSnapshot, ttl: Option<Duration>) -> Result<(), StoreError> {
        if snapshot.username.is_empty() {
            return Err(StoreError::EmptyIdentity);
        }

        let payload = serde_json::to_vec_pretty(snapshot)?;
        fs::write(self.record_path(&snapshot.username), payload)?;

        let meta = self.meta_path(&snapshot.username);
        match ttl {
            Some(ttl) => {
                let expires_at = Utc::now().timestamp() + ttl.as_secs() as i64;
                fs::write(meta, expires_at.to_string())?;
            }
            None => {
                if meta.exists() {
                    fs::remove_file(meta)?;
                }
            }
        }
        Ok(())
    }

    fn load(&self, username: &str) -> Result<Option<SessionSnapshot>, StoreError> {
        let record = self.record_path(username);
        if !record.exists() {
            return Ok(None);
        }

        if self.sidecar_fresh(username, Utc::now().timestamp()) == Some(false) {
            tracing::debug!("cached session for {} expired, purging", username);
            self.delete(username)?;
            return Ok(None);
        }

        let bytes = fs::read(&record)?;
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    fn delete(&self, username: &str) -> Result<bool, StoreError> {
        let record = self.record_path(username);
        if !record.exists() {
            return Ok(false);
        }
        fs::remove_file(&record)?;
        let meta = self.meta_path(username);
        if meta.exists() {
            fs::remove_file(&meta)?;
        }
        Ok(true)
    }

    fn list_users(&self) -> Result<Vec<String>, StoreError> {
        let now = Utc::now().timestamp();
        let mut users = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(OsStr::to_str) != Some("json") {
                continue;
            }
            let Some(username) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            if self.sidecar_fresh(username, now) == Some(false) {
                continue;
            }
            users.push(username.to_string());
        }
        users.sort();
        Ok(users)
    }
}
