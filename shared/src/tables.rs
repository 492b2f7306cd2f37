//! Collection schemas and the startup provisioning routine.

use aws_sdk_dynamodb::error::DisplayErrorContext;
use aws_sdk_dynamodb::types::{
    AttributeDefinition, GlobalSecondaryIndex, KeySchemaElement, KeyType, Projection,
    ProjectionType, ProvisionedThroughput, ScalarAttributeType,
};
use aws_sdk_dynamodb::Client;
use tracing::info;

use crate::models::KEY_ATTRIBUTE;
use crate::{Error, Result};

/// Secondary index on `User.password`.
pub const PASS_INDEX: &str = "PassIndex";
/// Secondary index on `Schedules.yearmonth`.
pub const YEAR_MONTH_INDEX: &str = "YearMonthIndex";

/// Table schema. Every key attribute is a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableConfig {
    pub table_name: String,
    pub partition_key: String,
    pub gsis: Vec<GsiConfig>,
    pub throughput: Throughput,
}

/// Global secondary index projecting all attributes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GsiConfig {
    pub name: String,
    pub partition_key: String,
    pub throughput: Throughput,
}

/// Provisioned read/write capacity units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Throughput {
    pub read: i64,
    pub write: i64,
}

impl TableConfig {
    /// Attributes that need a definition: the table key then each index key,
    /// without duplicates.
    pub fn key_attributes(&self) -> Vec<&str> {
        let mut attributes = vec![self.partition_key.as_str()];
        for gsi in &self.gsis {
            if !attributes.contains(&gsi.partition_key.as_str()) {
                attributes.push(&gsi.partition_key);
            }
        }
        attributes
    }
}

pub fn user_table_config(table_name: &str) -> TableConfig {
    let throughput = Throughput { read: 2, write: 2 };
    TableConfig {
        table_name: table_name.to_string(),
        partition_key: KEY_ATTRIBUTE.to_string(),
        gsis: vec![GsiConfig {
            name: PASS_INDEX.to_string(),
            partition_key: "password".to_string(),
            throughput,
        }],
        throughput,
    }
}

pub fn schedules_table_config(table_name: &str) -> TableConfig {
    let throughput = Throughput { read: 5, write: 5 };
    TableConfig {
        table_name: table_name.to_string(),
        partition_key: KEY_ATTRIBUTE.to_string(),
        gsis: vec![GsiConfig {
            name: YEAR_MONTH_INDEX.to_string(),
            partition_key: "yearmonth".to_string(),
            throughput,
        }],
        throughput,
    }
}

/// Create each table in `tables` that does not exist yet.
///
/// Safe to call on every cold start: existing tables are left alone, and a
/// table created concurrently by another instance counts as success.
pub async fn ensure_tables(client: &Client, tables: &[TableConfig]) -> Result<()> {
    let existing: Vec<String> = client
        .list_tables()
        .into_paginator()
        .items()
        .send()
        .collect::<std::result::Result<Vec<_>, _>>()
        .await
        .map_err(|e| Error::Store(format!("ListTables failed: {}", DisplayErrorContext(e))))?;

    for table in tables {
        if existing.contains(&table.table_name) {
            info!(table = %table.table_name, "table already exists");
            continue;
        }
        create_table(client, table).await?;
    }

    Ok(())
}

async fn create_table(client: &Client, table: &TableConfig) -> Result<()> {
    let mut request = client
        .create_table()
        .table_name(&table.table_name)
        .key_schema(hash_key(&table.partition_key)?)
        .provisioned_throughput(throughput(table.throughput)?);

    for attribute in table.key_attributes() {
        request = request.attribute_definitions(
            AttributeDefinition::builder()
                .attribute_name(attribute)
                .attribute_type(ScalarAttributeType::S)
                .build()
                .map_err(build_error)?,
        );
    }

    for gsi in &table.gsis {
        request = request.global_secondary_indexes(
            GlobalSecondaryIndex::builder()
                .index_name(&gsi.name)
                .key_schema(hash_key(&gsi.partition_key)?)
                .projection(Projection::builder().projection_type(ProjectionType::All).build())
                .provisioned_throughput(throughput(gsi.throughput)?)
                .build()
                .map_err(build_error)?,
        );
    }

    match request.send().await {
        Ok(_) => {
            info!(table = %table.table_name, "table created successfully");
            Ok(())
        }
        Err(e)
            if e.as_service_error()
                .map(|se| se.is_resource_in_use_exception())
                .unwrap_or(false) =>
        {
            info!(table = %table.table_name, "table created concurrently");
            Ok(())
        }
        Err(e) => Err(Error::Store(format!(
            "CreateTable {} failed: {}",
            table.table_name,
            DisplayErrorContext(e)
        ))),
    }
}

fn hash_key(attribute: &str) -> Result<KeySchemaElement> {
    KeySchemaElement::builder()
        .attribute_name(attribute)
        .key_type(KeyType::Hash)
        .build()
        .map_err(build_error)
}

fn throughput(units: Throughput) -> Result<ProvisionedThroughput> {
    ProvisionedThroughput::builder()
        .read_capacity_units(units.read)
        .write_capacity_units(units.write)
        .build()
        .map_err(build_error)
}

fn build_error(err: aws_sdk_dynamodb::error::BuildError) -> Error {
    Error::Store(format!("Invalid table definition: {}", err))
}
