//! Test utilities for the handler modules.
//!
//! Provides in-memory and always-failing `ItemStore`s plus request builders
//! that carry valid Basic credentials.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lambda_http::{http, Body, Request, Response};
use serde_json::Value;
use shared::{Config, Document, Error, ItemStore, Key, Result};

use crate::AppState;

pub const USERNAME: &str = "tester";
pub const PASSWORD: &str = "let-me-in";

/// Collections of documents keyed by primary key value.
#[derive(Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, BTreeMap<String, Document>>>,
    writes: AtomicUsize,
}

impl MemoryStore {
    /// Number of put/update/delete calls made so far.
    pub fn writes(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    pub fn len(&self, collection: &str) -> usize {
        self.collections
            .lock()
            .unwrap()
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

fn key_value(item: &Document, attribute: &str) -> String {
    match item.get(attribute) {
        Some(Value::String(value)) => value.clone(),
        other => panic!("item has no string key {}: {:?}", attribute, other),
    }
}

#[async_trait]
impl ItemStore for MemoryStore {
    async fn put_item(&self, collection: &str, item: Document) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let key = key_value(&item, "id");
        self.collections
            .lock()
            .unwrap()
            .entry(collection.to_string())
            .or_default()
            .insert(key, item);
        Ok(())
    }

    async fn get_item(&self, collection: &str, key: &Key) -> Result<Option<Document>> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .and_then(|items| items.get(&key.value))
            .cloned())
    }

    async fn query_index(
        &self,
        collection: &str,
        _index: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        Ok(self
            .collections
            .lock()
            .unwrap()
            .get(collection)
            .map(|items| {
                items
                    .values()
                    .filter(|item| item.get(attribute).and_then(Value::as_str) == Some(value))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update_item(&self, collection: &str, key: &Key, fields: Document) -> Result<Document> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        let mut collections = self.collections.lock().unwrap();
        let item = collections
            .entry(collection.to_string())
            .or_default()
            .entry(key.value.clone())
            .or_insert_with(|| {
                let mut item = Document::new();
                item.insert(key.attribute.clone(), Value::String(key.value.clone()));
                item
            });
        item.extend(fields);
        Ok(item.clone())
    }

    async fn delete_item(&self, collection: &str, key: &Key) -> Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        if let Some(items) = self.collections.lock().unwrap().get_mut(collection) {
            items.remove(&key.value);
        }
        Ok(())
    }
}

/// Fails every call the way a throttled or unreachable store would.
pub struct FailingStore;

#[async_trait]
impl ItemStore for FailingStore {
    async fn put_item(&self, _: &str, _: Document) -> Result<()> {
        Err(Error::Store("ProvisionedThroughputExceededException".to_string()))
    }

    async fn get_item(&self, _: &str, _: &Key) -> Result<Option<Document>> {
        Err(Error::Store("ProvisionedThroughputExceededException".to_string()))
    }

    async fn query_index(&self, _: &str, _: &str, _: &str, _: &str) -> Result<Vec<Document>> {
        Err(Error::Store("ProvisionedThroughputExceededException".to_string()))
    }

    async fn update_item(&self, _: &str, _: &Key, _: Document) -> Result<Document> {
        Err(Error::Store("ProvisionedThroughputExceededException".to_string()))
    }

    async fn delete_item(&self, _: &str, _: &Key) -> Result<()> {
        Err(Error::Store("ProvisionedThroughputExceededException".to_string()))
    }
}

/// Store handle that can be shared between the state and the test.
pub struct SharedStore(pub Arc<MemoryStore>);

#[async_trait]
impl ItemStore for SharedStore {
    async fn put_item(&self, collection: &str, item: Document) -> Result<()> {
        self.0.put_item(collection, item).await
    }

    async fn get_item(&self, collection: &str, key: &Key) -> Result<Option<Document>> {
        self.0.get_item(collection, key).await
    }

    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        self.0.query_index(collection, index, attribute, value).await
    }

    async fn update_item(&self, collection: &str, key: &Key, fields: Document) -> Result<Document> {
        self.0.update_item(collection, key, fields).await
    }

    async fn delete_item(&self, collection: &str, key: &Key) -> Result<()> {
        self.0.delete_item(collection, key).await
    }
}

pub fn test_config() -> Config {
    let vars: HashMap<&str, &str> = [("BASIC_USERNAME", USERNAME), ("BASIC_PASSWORD", PASSWORD)]
        .into_iter()
        .collect();
    Config::from_lookup(|key| vars.get(key).map(|v| v.to_string())).unwrap()
}

/// State backed by a fresh in-memory store the test can inspect.
pub fn memory_state() -> (Arc<AppState>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let state = AppState::with_store(Box::new(SharedStore(Arc::clone(&store))), &test_config());
    (Arc::new(state), store)
}

pub fn failing_state() -> Arc<AppState> {
    Arc::new(AppState::with_store(Box::new(FailingStore), &test_config()))
}

pub fn request(method: &str, path: &str, body: Option<Value>) -> Request {
    let authorization = format!(
        "Basic {}",
        STANDARD.encode(format!("{}:{}", USERNAME, PASSWORD))
    );
    let body = match body {
        Some(value) => Body::from(value.to_string()),
        None => Body::Empty,
    };
    http::Request::builder()
        .method(method)
        .uri(path)
        .header("authorization", authorization)
        .header("content-type", "application/json")
        .body(body)
        .unwrap()
}

pub fn body_json(response: &Response<Body>) -> Value {
    serde_json::from_slice(response.body().as_ref()).unwrap()
}
