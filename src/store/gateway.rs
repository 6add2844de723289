//! Object store gateway: bounded-parallel transfers over a backend.

use super::types::{ListPage, ObjectStore, StoreError};
use bytes::Bytes;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, info};

/// Gateway over an [`ObjectStore`] backend, bound to one bucket.
///
/// Batch transfers run on a bounded pool of tokio tasks: a semaphore caps
/// in-flight operations, so a blocked network call suspends only its own
/// task. The batch policy is fail-fast — the first failure aborts all
/// remaining scheduled transfers and is returned to the caller. This is a
/// deliberate simplicity trade-off; a hardened variant would collect
/// per-item outcomes instead.
pub struct ObjectStoreGateway<S> {
    store: Arc<S>,
    bucket: String,
}

impl<S> Clone for ObjectStoreGateway<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            bucket: self.bucket.clone(),
        }
    }
}

impl<S: ObjectStore> ObjectStoreGateway<S> {
    /// Creates a gateway over `store`, addressing `bucket`.
    pub fn new(store: Arc<S>, bucket: impl Into<String>) -> Self {
        Self {
            store,
            bucket: bucket.into(),
        }
    }

    /// The bucket this gateway addresses.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Stores a single object (idempotent overwrite).
    pub async fn put_bytes(&self, key: &str, data: Bytes) -> Result<(), StoreError> {
        self.store.put(&self.bucket, key, data).await
    }

    /// Fetches a single object's bytes.
    pub async fn get_bytes(&self, key: &str) -> Result<Bytes, StoreError> {
        self.store.get(&self.bucket, key).await
    }

    /// Uploads local files to object keys over a bounded worker pool.
    ///
    /// # Arguments
    ///
    /// * `pairs` - `(local path, object key)` per file
    /// * `concurrency` - maximum in-flight uploads (clamped to at least 1)
    ///
    /// # Errors
    ///
    /// Fail-fast: the first failed read or put aborts the remaining
    /// scheduled uploads and is returned.
    pub async fn upload_many(
        &self,
        pairs: Vec<(PathBuf, String)>,
        concurrency: usize,
    ) -> Result<(), StoreError> {
        info!(
            count = pairs.len(),
            bucket = %self.bucket,
            "uploading files to object store"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (local, key) in pairs {
            let store = Arc::clone(&self.store);
            let bucket = self.bucket.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| StoreError::TransferTask(e.to_string()))?;
                debug!(path = %local.display(), key, "uploading");
                let data = tokio::fs::read(&local).await.map_err(|source| {
                    StoreError::LocalIo {
                        path: local.clone(),
                        source,
                    }
                })?;
                store.put(&bucket, &key, Bytes::from(data)).await
            });
        }

        drain_fail_fast(tasks).await
    }

    /// Downloads object keys to local files over a bounded worker pool.
    ///
    /// Missing parent directories are created idempotently, so re-running
    /// a worker over the same batch is safe.
    ///
    /// # Errors
    ///
    /// Fail-fast, as [`upload_many`](Self::upload_many).
    pub async fn download_many(
        &self,
        pairs: Vec<(String, PathBuf)>,
        concurrency: usize,
    ) -> Result<(), StoreError> {
        info!(
            count = pairs.len(),
            bucket = %self.bucket,
            "downloading objects from object store"
        );

        let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
        let mut tasks = JoinSet::new();

        for (key, local) in pairs {
            let store = Arc::clone(&self.store);
            let bucket = self.bucket.clone();
            let semaphore = Arc::clone(&semaphore);
            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| StoreError::TransferTask(e.to_string()))?;
                debug!(key, path = %local.display(), "downloading");
                let data = store.get(&bucket, &key).await?;
                if let Some(parent) = local.parent() {
                    tokio::fs::create_dir_all(parent).await.map_err(|source| {
                        StoreError::LocalIo {
                            path: parent.to_path_buf(),
                            source,
                        }
                    })?;
                }
                tokio::fs::write(&local, &data)
                    .await
                    .map_err(|source| StoreError::LocalIo {
                        path: local.clone(),
                        source,
                    })
            });
        }

        drain_fail_fast(tasks).await
    }

    /// Lists every key under a prefix.
    ///
    /// Drives [`ObjectStore::list_page`] until the backend returns no
    /// continuation token. The result length is unbounded; callers that
    /// need lazy consumption can drive `list_page` themselves.
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        loop {
            let page: ListPage = self
                .store
                .list_page(&self.bucket, prefix, continuation.as_deref())
                .await?;
            keys.extend(page.keys);
            match page.continuation {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }
        debug!(prefix, count = keys.len(), "listed keys");
        Ok(keys)
    }

    /// Deletes every object under a prefix. Returns the number deleted.
    pub async fn delete_by_prefix(&self, prefix: &str) -> Result<usize, StoreError> {
        let keys = self.list(prefix).await?;
        if keys.is_empty() {
            return Ok(0);
        }
        info!(prefix, count = keys.len(), bucket = %self.bucket, "deleting objects");
        self.store.delete_many(&self.bucket, &keys).await?;
        Ok(keys.len())
    }
}

/// Awaits all transfer tasks, aborting the rest on the first failure.
async fn drain_fail_fast(mut tasks: JoinSet<Result<(), StoreError>>) -> Result<(), StoreError> {
    while let Some(joined) = tasks.join_next().await {
        let failure = match joined {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => err,
            Err(join_err) if join_err.is_cancelled() => continue,
            Err(join_err) => StoreError::TransferTask(join_err.to_string()),
        };
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}
        return Err(failure);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryObjectStore;

    fn gateway_with(page_size: usize) -> ObjectStoreGateway<InMemoryObjectStore> {
        ObjectStoreGateway::new(Arc::new(InMemoryObjectStore::new(page_size)), "test-bucket")
    }

    #[tokio::test]
    async fn test_put_get_round_trip() {
        let gateway = gateway_with(100);
        gateway
            .put_bytes("g/meta.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();
        let data = gateway.get_bytes("g/meta.json").await.unwrap();
        assert_eq!(&data[..], b"{}");
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let gateway = gateway_with(100);
        let err = gateway.get_bytes("absent").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_upload_download_files() {
        let gateway = gateway_with(100);
        let dir = tempfile::tempdir().unwrap();

        let mut uploads = Vec::new();
        for i in 0..5 {
            let path = dir.path().join(format!("tile-{i}.png"));
            std::fs::write(&path, format!("tile data {i}")).unwrap();
            uploads.push((path, format!("g/source/{i:03}.png")));
        }
        gateway.upload_many(uploads, 2).await.unwrap();

        // download into nested directories that do not exist yet
        let downloads: Vec<(String, PathBuf)> = (0..5)
            .map(|i| {
                (
                    format!("g/source/{i:03}.png"),
                    dir.path().join("work").join("g").join(format!("{i:03}.png")),
                )
            })
            .collect();
        gateway.download_many(downloads.clone(), 2).await.unwrap();

        for (i, (_, path)) in downloads.iter().enumerate() {
            assert_eq!(
                std::fs::read_to_string(path).unwrap(),
                format!("tile data {i}")
            );
        }
    }

    #[tokio::test]
    async fn test_download_is_idempotent_under_rerun() {
        let gateway = gateway_with(100);
        let dir = tempfile::tempdir().unwrap();
        gateway
            .put_bytes("g/a.png", Bytes::from_static(b"abc"))
            .await
            .unwrap();

        let pairs = vec![("g/a.png".to_string(), dir.path().join("out").join("a.png"))];
        gateway.download_many(pairs.clone(), 4).await.unwrap();
        gateway.download_many(pairs.clone(), 4).await.unwrap();
        assert_eq!(std::fs::read(dir.path().join("out/a.png")).unwrap(), b"abc");
    }

    #[tokio::test]
    async fn test_upload_fails_fast_on_missing_file() {
        let gateway = gateway_with(100);
        let dir = tempfile::tempdir().unwrap();

        let good = dir.path().join("good.png");
        std::fs::write(&good, b"ok").unwrap();
        let pairs = vec![
            (good, "g/good.png".to_string()),
            (dir.path().join("missing.png"), "g/missing.png".to_string()),
        ];
        let err = gateway.upload_many(pairs, 2).await.unwrap_err();
        assert!(matches!(err, StoreError::LocalIo { .. }));
    }

    #[tokio::test]
    async fn test_download_fails_fast_on_missing_object() {
        let gateway = gateway_with(100);
        let dir = tempfile::tempdir().unwrap();
        gateway
            .put_bytes("g/present.png", Bytes::from_static(b"x"))
            .await
            .unwrap();

        let pairs = vec![
            ("g/present.png".to_string(), dir.path().join("present.png")),
            ("g/absent.png".to_string(), dir.path().join("absent.png")),
        ];
        let err = gateway.download_many(pairs, 2).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_walks_all_pages() {
        // page size 3 forces pagination over 10 keys
        let gateway = gateway_with(3);
        for i in 0..10 {
            gateway
                .put_bytes(&format!("g/source/{i:03}.png"), Bytes::from_static(b"t"))
                .await
                .unwrap();
        }
        gateway
            .put_bytes("other/thing.png", Bytes::from_static(b"t"))
            .await
            .unwrap();

        let keys = gateway.list("g/source/").await.unwrap();
        assert_eq!(keys.len(), 10);
        assert_eq!(keys[0], "g/source/000.png");
        assert_eq!(keys[9], "g/source/009.png");
    }

    #[tokio::test]
    async fn test_list_empty_prefix_terminates() {
        let gateway = gateway_with(3);
        assert!(gateway.list("nothing/").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_by_prefix() {
        let gateway = gateway_with(2);
        for i in 0..5 {
            gateway
                .put_bytes(&format!("g/mask/{i:03}.png"), Bytes::from_static(b"m"))
                .await
                .unwrap();
        }
        gateway
            .put_bytes("g/meta.json", Bytes::from_static(b"{}"))
            .await
            .unwrap();

        let deleted = gateway.delete_by_prefix("g/mask/").await.unwrap();
        assert_eq!(deleted, 5);
        assert!(gateway.list("g/mask/").await.unwrap().is_empty());
        // unrelated keys survive
        assert!(gateway.get_bytes("g/meta.json").await.is_ok());
    }
}
