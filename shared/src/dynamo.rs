//! DynamoDB implementation of [`ItemStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{AttributeValue, ReturnValue};
use aws_sdk_dynamodb::Client;
use serde_json::{Number, Value};

use crate::store::{Document, ItemStore, Key};
use crate::{Error, Result};

/// Native item representation in the SDK.
pub type Attributes = HashMap<String, AttributeValue>;

/// `ItemStore` backed by a DynamoDB client.
#[derive(Debug, Clone)]
pub struct DynamoStore {
    client: Client,
}

impl DynamoStore {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

fn store_error<E: std::error::Error>(operation: &str, collection: &str, err: E) -> Error {
    Error::Store(format!(
        "{} on {} failed: {}",
        operation,
        collection,
        DisplayErrorContext(err)
    ))
}

#[async_trait]
impl ItemStore for DynamoStore {
    async fn put_item(&self, collection: &str, item: Document) -> Result<()> {
        self.client
            .put_item()
            .table_name(collection)
            .set_item(Some(to_attributes(&item)))
            .send()
            .await
            .map_err(|e| store_error("PutItem", collection, e))?;

        Ok(())
    }

    async fn get_item(&self, collection: &str, key: &Key) -> Result<Option<Document>> {
        let output = self
            .client
            .get_item()
            .table_name(collection)
            .key(&key.attribute, AttributeValue::S(key.value.clone()))
            .send()
            .await
            .map_err(|e| store_error("GetItem", collection, e))?;

        output.item().map(from_attributes).transpose()
    }

    async fn query_index(
        &self,
        collection: &str,
        index: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<Document>> {
        let output = self
            .client
            .query()
            .table_name(collection)
            .index_name(index)
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", attribute)
            .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
            .send()
            .await
            .map_err(|e| store_error("Query", collection, e))?;

        output.items().iter().map(from_attributes).collect()
    }

    async fn update_item(&self, collection: &str, key: &Key, fields: Document) -> Result<Document> {
        let update = UpdateExpression::set_fields(&fields)?;

        let output = self
            .client
            .update_item()
            .table_name(collection)
            .key(&key.attribute, AttributeValue::S(key.value.clone()))
            .update_expression(update.expression)
            .set_expression_attribute_names(Some(update.names))
            .set_expression_attribute_values(Some(update.values))
            .return_values(ReturnValue::AllNew)
            .send()
            .await
            .map_err(|e| store_error("UpdateItem", collection, e))?;

        output
            .attributes()
            .map(from_attributes)
            .transpose()?
            .ok_or_else(|| Error::Store(format!("UpdateItem on {} returned no attributes", collection)))
    }

    async fn delete_item(&self, collection: &str, key: &Key) -> Result<()> {
        self.client
            .delete_item()
            .table_name(collection)
            .key(&key.attribute, AttributeValue::S(key.value.clone()))
            .send()
            .await
            .map_err(|e| store_error("DeleteItem", collection, e))?;

        Ok(())
    }
}

/// `SET` expression with name and value placeholders, so attribute names
/// never collide with DynamoDB reserved words (`type`, `name`, ...).
#[derive(Debug, PartialEq)]
pub struct UpdateExpression {
    pub expression: String,
    pub names: HashMap<String, String>,
    pub values: Attributes,
}

impl UpdateExpression {
    /// One `#field = :field` clause per field, in sorted field order.
    pub fn set_fields(fields: &Document) -> Result<Self> {
        if fields.is_empty() {
            return Err(Error::BadRequest("No fields to update".to_string()));
        }

        let mut names: Vec<&String> = fields.keys().collect();
        names.sort();

        let clauses: Vec<String> = names
            .iter()
            .map(|name| format!("#{0} = :{0}", name))
            .collect();

        Ok(Self {
            expression: format!("SET {}", clauses.join(", ")),
            names: fields
                .keys()
                .map(|name| (format!("#{}", name), name.clone()))
                .collect(),
            values: fields
                .iter()
                .map(|(name, value)| (format!(":{}", name), to_attribute(value)))
                .collect(),
        })
    }
}

pub fn to_attributes(document: &Document) -> Attributes {
    document
        .iter()
        .map(|(name, value)| (name.clone(), to_attribute(value)))
        .collect()
}

pub fn to_attribute(value: &Value) -> AttributeValue {
    match value {
        Value::Null => AttributeValue::Null(true),
        Value::Bool(b) => AttributeValue::Bool(*b),
        Value::Number(n) => AttributeValue::N(n.to_string()),
        Value::String(s) => AttributeValue::S(s.clone()),
        Value::Array(items) => AttributeValue::L(items.iter().map(to_attribute).collect()),
        Value::Object(map) => AttributeValue::M(to_attributes(map)),
    }
}

pub fn from_attributes(attributes: &Attributes) -> Result<Document> {
    attributes
        .iter()
        .map(|(name, attr)| Ok((name.clone(), from_attribute(attr)?)))
        .collect()
}

pub fn from_attribute(attr: &AttributeValue) -> Result<Value> {
    match attr {
        AttributeValue::S(s) => Ok(Value::String(s.clone())),
        AttributeValue::N(n) => parse_number(n),
        AttributeValue::Bool(b) => Ok(Value::Bool(*b)),
        AttributeValue::Null(_) => Ok(Value::Null),
        AttributeValue::L(items) => items.iter().map(from_attribute).collect::<Result<_>>().map(Value::Array),
        AttributeValue::M(map) => from_attributes(map).map(Value::Object),
        AttributeValue::Ss(items) => Ok(Value::Array(items.iter().cloned().map(Value::String).collect())),
        AttributeValue::Ns(items) => items.iter().map(|n| parse_number(n)).collect::<Result<_>>().map(Value::Array),
        other => Err(Error::Store(format!("Unsupported attribute type: {:?}", other))),
    }
}

fn parse_number(n: &str) -> Result<Value> {
    if let Ok(int) = n.parse::<i64>() {
        return Ok(Value::from(int));
    }

    n.parse::<f64>()
        .ok()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .ok_or_else(|| Error::Store(format!("Invalid number attribute: {}", n)))
}
