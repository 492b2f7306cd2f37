//! Key-value store capability boundary.
//!
//! Every method is exactly one round trip to the underlying store. There are
//! no retries, batches or transactions; failures come back as
//! [`Error::Store`](crate::Error::Store).

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::models::KEY_ATTRIBUTE;
use crate::Result;

/// A stored item: attribute name to JSON value.
pub type Document = Map<String, Value>;

/// Primary key of a single item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key {
    pub attribute: String,
    pub value: String,
}

impl Key {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Key on the `id` attribute shared by both collections.
    pub fn id(value: impl Into<String>) -> Self {
        Self::new(KEY_ATTRIBUTE, value)
    }
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Write `item`, replacing any item with the same key.
    async fn put_item(&self, collection: &str, item: Document) -> Result<()>;

    /// Point lookup by primary key.
    async fn get_item(&self, collection: &str, key: &Key) -> Result<Option<Document>>;

    /// All items whose `attribute` equals `value` in secondary index `index`.
    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Document>>;

    /// Set each of `fields` on the item at `key` and return its new state.
    /// The item is not required to exist beforehand.
    async fn update_item(&self, collection: &str, key: &Key, fields: Document) -> Result<Document>;

    /// Remove the item at `key`. Succeeds when nothing is stored there.
    async fn delete_item(&self, collection: &str, key: &Key) -> Result<()>;
}
