use super::ObjectStore;
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq)]
pub struct StoredObject {
    pub data: Vec<u8>,
    pub content_type: String,
}

type ObjectKey = (String, String);

#[derive(Clone, Default)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<ObjectKey, StoredObject>>>,
    failing_puts: Arc<Mutex<HashSet<ObjectKey>>>,
    get_count: Arc<Mutex<usize>>,
    put_count: Arc<Mutex<usize>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_object(self, bucket: &str, key: &str, data: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(
            (bucket.to_string(), key.to_string()),
            StoredObject {
                data,
                content_type: "application/octet-stream".to_string(),
            },
        );
        self
    }

    /// Make every upload to `bucket/key` fail.
    pub fn with_failing_put(self, bucket: &str, key: &str) -> Self {
        self.failing_puts
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()));
        self
    }

    pub fn get_object_entry(&self, bucket: &str, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn get_count(&self) -> usize {
        *self.get_count.lock().unwrap()
    }

    pub fn put_count(&self) -> usize {
        *self.put_count.lock().unwrap()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn get_object(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        *self.get_count.lock().unwrap() += 1;

        let objects = self.objects.lock().unwrap();
        match objects.get(&(bucket.to_string(), key.to_string())) {
            Some(object) => Ok(object.data.clone()),
            None => Err(Error::Fetch {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "object not found".to_string(),
            }),
        }
    }

    async fn put_object(
        &self,
        bucket: &str,
        key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> Result<()> {
        *self.put_count.lock().unwrap() += 1;

        let object_key = (bucket.to_string(), key.to_string());
        if self.failing_puts.lock().unwrap().contains(&object_key) {
            return Err(Error::Store {
                bucket: bucket.to_string(),
                key: key.to_string(),
                reason: "Mock failure".to_string(),
            });
        }

        self.objects.lock().unwrap().insert(
            object_key,
            StoredObject {
                data,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_store_put_and_get() {
        let store = MockObjectStore::new();

        store
            .put_object("b", "wip/d/0.png", b"png bytes".to_vec(), "image/png")
            .await
            .unwrap();
        assert_eq!(store.put_count(), 1);

        let data = store.get_object("b", "wip/d/0.png").await.unwrap();
        assert_eq!(data, b"png bytes");
        assert_eq!(store.get_count(), 1);

        let entry = store.get_object_entry("b", "wip/d/0.png").unwrap();
        assert_eq!(entry.content_type, "image/png");
    }

    #[tokio::test]
    async fn test_mock_store_buckets_are_separate() {
        let store = MockObjectStore::new().with_object("a", "k", b"data".to_vec());

        assert!(store.get_object("a", "k").await.is_ok());
        assert!(store.get_object("b", "k").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_store_missing_object() {
        let store = MockObjectStore::new();
        let result = store.get_object("b", "missing.png").await;

        assert!(matches!(result, Err(Error::Fetch { ref reason, .. }) if reason == "object not found"));
    }

    #[tokio::test]
    async fn test_mock_store_failing_put() {
        let store = MockObjectStore::new().with_failing_put("b", "k");
        let result = store.put_object("b", "k", vec![1], "image/png").await;

        assert!(matches!(result, Err(Error::Store { .. })));
        assert!(store.get_object_entry("b", "k").is_none());
    }
}
