//! In-memory object store.
//!
//! A substitutable test double with the same observable contract as a real
//! backend: lexicographic listing, continuation-token pagination, and
//! idempotent overwrites. The page size is configurable (and small in
//! tests) so pagination is actually exercised.

use super::types::{ListPage, ObjectStore, StoreError};
use bytes::Bytes;
use std::collections::BTreeMap;
use std::sync::Mutex;

/// Default keys per listing page.
pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// In-memory [`ObjectStore`] implementation.
pub struct InMemoryObjectStore {
    // (bucket, key) -> value; BTreeMap gives lexicographic listing order
    objects: Mutex<BTreeMap<(String, String), Bytes>>,
    page_size: usize,
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}

impl InMemoryObjectStore {
    /// Creates an empty store listing `page_size` keys per page.
    pub fn new(page_size: usize) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            page_size: page_size.max(1),
        }
    }

    /// Number of stored objects across all buckets.
    pub fn object_count(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    /// Whether an object exists.
    pub fn contains(&self, bucket: &str, key: &str) -> bool {
        self.objects
            .lock()
            .unwrap()
            .contains_key(&(bucket.to_string(), key.to_string()))
    }
}

impl ObjectStore for InMemoryObjectStore {
    async fn put(&self, bucket: &str, key: &str, data: Bytes) -> Result<(), StoreError> {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), data);
        Ok(())
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Bytes, StoreError> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            })
    }

    async fn list_page(
        &self,
        bucket: &str,
        prefix: &str,
        continuation: Option<&str>,
    ) -> Result<ListPage, StoreError> {
        let objects = self.objects.lock().unwrap();
        let mut matching = objects
            .keys()
            .filter(|(b, k)| b == bucket && k.starts_with(prefix))
            .map(|(_, k)| k.as_str())
            // the continuation token is the last key of the previous page
            .skip_while(|k| match continuation {
                Some(token) => *k <= token,
                None => false,
            });

        let keys: Vec<String> = matching.by_ref().take(self.page_size).map(String::from).collect();
        let continuation = if matching.next().is_some() {
            keys.last().cloned()
        } else {
            None
        };
        Ok(ListPage { keys, continuation })
    }

    async fn delete_many(&self, bucket: &str, keys: &[String]) -> Result<(), StoreError> {
        let mut objects = self.objects.lock().unwrap();
        for key in keys {
            objects.remove(&(bucket.to_string(), key.clone()));
        }
        Ok(())
    }
}
