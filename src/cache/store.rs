//! Durable key-to-bytes storage for rendered images

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use super::CacheKey;
use crate::{Result, TrackError};

static TEMP_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Storage backing the render cache
#[async_trait::async_trait]
pub trait CacheStore: Send + Sync + 'static {
    async fn exists(&self, key: &CacheKey) -> Result<bool>;

    /// `Ok(None)` when no entry exists
    async fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>>;

    /// Create or overwrite an entry
    async fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()>;

    /// Returns whether an entry was removed
    async fn delete(&self, key: &CacheKey) -> Result<bool>;
}

#[async_trait::async_trait]
impl<S: CacheStore + ?Sized> CacheStore for Arc<S> {
    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        (**self).exists(key).await
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        (**self).read(key).await
    }

    async fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        (**self).write(key, bytes).await
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        (**self).delete(key).await
    }
}

/// One `<key>.png` file per entry under a directory.
///
/// Writes go to a temporary file renamed into place, so concurrent writers of
/// the same key leave one complete image behind.
#[derive(Debug, Clone)]
pub struct FsCacheStore {
    dir: PathBuf,
}

impl FsCacheStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn entry_path(&self, key: &CacheKey) -> PathBuf {
        self.dir.join(key.file_name())
    }
}

#[async_trait::async_trait]
impl CacheStore for FsCacheStore {
    async fn exists(&self, key: &CacheKey) -> Result<bool> {
        let path = self.entry_path(key);
        tokio::fs::try_exists(&path).await.map_err(|e| TrackError::file_error(path, e))
    }

    async fn read(&self, key: &CacheKey) -> Result<Option<Vec<u8>>> {
        let path = self.entry_path(key);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TrackError::file_error(path, e)),
        }
    }

    async fn write(&self, key: &CacheKey, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(key);
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| TrackError::CachePersist { path: self.dir.clone(), source: e })?;

        let n = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
        let temp = self.dir.join(format!("{}.{}-{}.tmp", key.file_name(), std::process::id(), n));
        if let Err(e) = tokio::fs::write(&temp, bytes).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(TrackError::CachePersist { path, source: e });
        }
        if let Err(e) = tokio::fs::rename(&temp, &path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(TrackError::CachePersist { path, source: e });
        }
        Ok(())
    }

    async fn delete(&self, key: &CacheKey) -> Result<bool> {
        let path = self.entry_path(key);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(TrackError::file_error(path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::scratch_dir;
    use crate::types::{EventRef, RenderRequest};

    fn key() -> CacheKey {
        CacheKey::for_request(&RenderRequest::new(EventRef::new(2024, "Monaco").unwrap()))
    }

    #[tokio::test]
    async fn write_read_delete() {
        let store = FsCacheStore::new(scratch_dir("store").join("nested"));
        let key = key();

        assert!(!store.exists(&key).await.unwrap());
        assert_eq!(store.read(&key).await.unwrap(), None);

        // directory is created on first write
        store.write(&key, b"png").await.unwrap();
        assert!(store.exists(&key).await.unwrap());
        assert_eq!(store.read(&key).await.unwrap().as_deref(), Some(&b"png"[..]));
        assert!(store.entry_path(&key).ends_with(format!("{}.png", key.as_str())));

        store.write(&key, b"newer").await.unwrap();
        assert_eq!(store.read(&key).await.unwrap().as_deref(), Some(&b"newer"[..]));

        assert!(store.delete(&key).await.unwrap());
        assert!(!store.delete(&key).await.unwrap());
    }

    #[tokio::test]
    async fn no_temp_files_left_behind() {
        let dir = scratch_dir("store-temp");
        let store = FsCacheStore::new(&dir);
        store.write(&key(), b"png").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(&dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec![key().file_name()]);
    }

    #[tokio::test]
    async fn unwritable_location_is_persist_error() {
        let dir = scratch_dir("store-blocked");
        let blocker = dir.join("file");
        std::fs::write(&blocker, b"not a directory").unwrap();

        let err = FsCacheStore::new(blocker.join("cache")).write(&key(), b"png").await.unwrap_err();
        assert!(matches!(err, TrackError::CachePersist { .. }));
    }
}
