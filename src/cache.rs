//! File-based cache for the compromised package list.
//!
//! The cache holds the raw text of the last successful remote fetch together
//! with the time it was captured. It is only consulted when the remote fetch
//! fails, and is rejected once it is older than the configured timeout.
//!
//! # Cache Location
//!
//! By default the cache lives in the system temp directory:
//! `<tmp>/pkgscan/compromised-packages.json`. Pass a different path to
//! [`RegistryCache::new`] to isolate it (tests do this).
//!
//! # File Format
//!
//! ```json
//! {"timestamp": 1726000000000, "content": "evil-pkg:1.0.0\nbadlib\n"}
//! ```
//!
//! `timestamp` is in epoch milliseconds.

use anyhow::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

const CACHE_DIR_NAME: &str = "pkgscan";
const CACHE_FILE_NAME: &str = "compromised-packages.json";

/// Default cache timeout in minutes.
pub const DEFAULT_CACHE_TIMEOUT_MINUTES: u64 = 60;

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    timestamp: i64,
    content: String,
}

/// The on-disk cache of the compromised package list.
#[derive(Debug, Clone)]
pub struct RegistryCache {
    path: PathBuf,
    ttl: Duration,
}

impl RegistryCache {
    /// Creates a cache backed by `path` that expires after `ttl`.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            ttl,
        }
    }

    /// Creates a cache at the default temp-directory location.
    ///
    /// # Example
    ///
    /// ```
    /// use pkgscan::cache::RegistryCache;
    ///
    /// let cache = RegistryCache::with_timeout_minutes(60);
    /// assert!(cache.path().ends_with("compromised-packages.json"));
    /// ```
    pub fn with_timeout_minutes(minutes: u64) -> Self {
        Self::new(
            Self::default_path(),
            Duration::from_secs(minutes.saturating_mul(60)),
        )
    }

    pub fn default_path() -> PathBuf {
        std::env::temp_dir()
            .join(CACHE_DIR_NAME)
            .join(CACHE_FILE_NAME)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the cached list text if the cache exists and is fresh.
    ///
    /// A missing, unreadable, or corrupt cache is treated the same as a
    /// stale one and yields `None`.
    pub fn read(&self) -> Option<String> {
        self.read_at(Utc::now().timestamp_millis())
    }

    /// Same as [`read`](Self::read) but evaluates staleness against `now_ms`.
    ///
    /// A cache whose age equals the timeout is still valid.
    pub fn read_at(&self, now_ms: i64) -> Option<String> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no registry cache file");
            return None;
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "could not read registry cache");
                return None;
            }
        };

        let entry: CacheEntry = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "registry cache is corrupt");
                return None;
            }
        };

        // Clock skew can put the capture time in the future.
        let age_ms = now_ms.saturating_sub(entry.timestamp).max(0) as u128;
        if age_ms > self.ttl.as_millis() {
            tracing::info!(
                age_minutes = age_ms / 60_000,
                timeout_minutes = self.ttl.as_secs() / 60,
                "registry cache is stale"
            );
            return None;
        }

        Some(entry.content)
    }

    /// Stores the list text with the current time as capture timestamp.
    pub fn write(&self, content: &str) -> Result<()> {
        self.write_at(content, Utc::now().timestamp_millis())
    }

    /// Stores the list text with an explicit capture timestamp.
    pub fn write_at(&self, content: &str, timestamp_ms: i64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let entry = CacheEntry {
            timestamp: timestamp_ms,
            content: content.to_string(),
        };
        let json = serde_json::to_string(&entry)?;
        let mut file = create_owner_only(&self.path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Removes the cache file if present.
    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}

impl Default for RegistryCache {
    fn default() -> Self {
        Self::with_timeout_minutes(DEFAULT_CACHE_TIMEOUT_MINUTES)
    }
}

/// Opens `path` for writing, truncated, readable by the owner only.
#[cfg(unix)]
fn create_owner_only(path: &Path) -> Result<fs::File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    // The creation mode does not apply to a file that already exists.
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn create_owner_only(path: &Path) -> Result<fs::File> {
    Ok(fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MINUTE_MS: i64 = 60_000;

    fn cache_in(dir: &TempDir, minutes: u64) -> RegistryCache {
        RegistryCache::new(
            dir.path().join("nested").join(CACHE_FILE_NAME),
            Duration::from_secs(minutes * 60),
        )
    }

    #[test]
    fn test_write_then_read_fresh() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);

        cache.write_at("evil-pkg:1.0.0\n", 1_000_000).unwrap();
        assert_eq!(
            cache.read_at(1_000_000 + 5 * MINUTE_MS).as_deref(),
            Some("evil-pkg:1.0.0\n")
        );
    }

    #[test]
    fn test_stale_boundary() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        let captured = 10 * MINUTE_MS;
        cache.write_at("badlib\n", captured).unwrap();

        // Exactly at the timeout is still valid.
        assert!(cache.read_at(captured + 60 * MINUTE_MS).is_some());
        // One millisecond past is stale.
        assert!(cache.read_at(captured + 60 * MINUTE_MS + 1).is_none());
    }

    #[test]
    fn test_zero_timeout_only_accepts_same_instant() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 0);
        cache.write_at("badlib\n", 5_000).unwrap();

        assert!(cache.read_at(5_000).is_some());
        assert!(cache.read_at(5_001).is_none());
    }

    #[test]
    fn test_future_timestamp_is_fresh() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 1);
        cache.write_at("badlib\n", 10 * MINUTE_MS).unwrap();

        assert!(cache.read_at(0).is_some());
    }

    #[test]
    fn test_missing_cache() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        assert!(cache.read().is_none());
    }

    #[test]
    fn test_corrupt_cache() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();

        fs::write(cache.path(), "not json").unwrap();
        assert!(cache.read().is_none());

        fs::write(cache.path(), r#"{"timestamp":"yesterday","content":"x"}"#).unwrap();
        assert!(cache.read().is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_cache_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        cache.write("badlib\n").unwrap();

        let mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn test_rewrite_tightens_existing_file() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        fs::create_dir_all(cache.path().parent().unwrap()).unwrap();
        fs::write(cache.path(), "old contents that are longer than the new entry").unwrap();
        fs::set_permissions(cache.path(), fs::Permissions::from_mode(0o644)).unwrap();

        cache.write_at("badlib\n", 1_000).unwrap();

        let mode = fs::metadata(cache.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
        assert_eq!(cache.read_at(1_000).as_deref(), Some("badlib\n"));
    }

    #[test]
    fn test_clear() {
        let dir = TempDir::new().unwrap();
        let cache = cache_in(&dir, 60);
        cache.write("badlib\n").unwrap();
        assert!(cache.path().exists());

        cache.clear().unwrap();
        assert!(!cache.path().exists());
        // Clearing twice is fine.
        cache.clear().unwrap();
    }
}
