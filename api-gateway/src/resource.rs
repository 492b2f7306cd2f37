//! Store-operation mapping shared by the user and schedule handlers.
//!
//! Each function issues exactly one store call and converts between stored
//! documents and typed records.

use lambda_http::{Body, Error, Response};
use serde::Serialize;
use serde_json::Value;
use shared::http::{error_response, json_response, rejection_response};
use shared::models::KEY_ATTRIBUTE;
use shared::{Document, ItemStore, Key, KeyPolicy, Resource, Result};
use tracing::error;
use uuid::Uuid;

/// Serialize a record into a store document.
pub fn to_document<T: Serialize>(record: &T) -> Result<Document> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => Err(shared::Error::Internal(format!(
            "record serialized to {}, not an object",
            other
        ))),
    }
}

/// Apply the resource's key policy to a validated document.
pub fn assign_key<R: Resource>(mut item: Document) -> Result<Document> {
    match R::KEY_POLICY {
        KeyPolicy::Generated => {
            item.insert(
                KEY_ATTRIBUTE.to_string(),
                Value::String(Uuid::new_v4().to_string()),
            );
        }
        KeyPolicy::CallerSupplied => {
            let has_key = matches!(item.get(KEY_ATTRIBUTE), Some(Value::String(id)) if !id.is_empty());
            if !has_key {
                return Err(shared::Error::BadRequest(format!(
                    "{} requires a caller-supplied {}",
                    R::NAME,
                    KEY_ATTRIBUTE
                )));
            }
        }
    }
    Ok(item)
}

/// Write a new item and return it as stored. No existence check is made.
pub async fn create<R: Resource>(store: &dyn ItemStore, collection: &str, item: Document) -> Result<R> {
    let item = assign_key::<R>(item)?;
    store.put_item(collection, item.clone()).await?;
    Ok(serde_json::from_value(Value::Object(item))?)
}

pub async fn get<R: Resource>(store: &dyn ItemStore, collection: &str, id: &str) -> Result<R> {
    match store.get_item(collection, &Key::id(id)).await? {
        Some(item) => Ok(serde_json::from_value(Value::Object(item))?),
        None => Err(shared::Error::NotFound(format!("{} not found", R::NAME))),
    }
}

pub async fn query<R: Resource>(
    store: &dyn ItemStore,
    collection: &str,
    index: &str,
    attribute: &str,
    value: &str,
) -> Result<Vec<R>> {
    store
        .query_index(collection, index, attribute, value)
        .await?
        .into_iter()
        .map(|item| serde_json::from_value(Value::Object(item)).map_err(shared::Error::from))
        .collect()
}

/// Set every field in `fields` on the item at `id`; the key itself is never
/// rewritten.
pub async fn update<R: Resource>(
    store: &dyn ItemStore,
    collection: &str,
    id: &str,
    mut fields: Document,
) -> Result<R> {
    fields.remove(KEY_ATTRIBUTE);
    let item = store.update_item(collection, &Key::id(id), fields).await?;
    Ok(serde_json::from_value(Value::Object(item))?)
}

/// Delete by key. Deleting a key that was never stored still succeeds.
pub async fn delete(store: &dyn ItemStore, collection: &str, id: &str) -> Result<()> {
    store.delete_item(collection, &Key::id(id)).await
}

/// Map an operation outcome to a response.
///
/// Rejected input and missing items keep their own status; anything else is
/// logged and reported with `failure` so store details never reach clients.
pub fn respond<T: Serialize>(
    outcome: Result<T>,
    status: u16,
    failure: &str,
) -> std::result::Result<Response<Body>, Error> {
    match outcome {
        Ok(body) => json_response(status, &body),
        Err(shared::Error::NotFound(message)) => error_response(404, message),
        Err(e) if e.status_code() == 400 => rejection_response(&e),
        Err(e) => {
            error!(error = %e, "{}", failure);
            error_response(500, failure)
        }
    }
}
