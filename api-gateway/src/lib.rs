//! Schedule app API - user and schedule CRUD behind API Gateway.
//!
//! Endpoints:
//! - POST /api/user - Create a user
//! - GET /api/user/my/{password} - Find users by password hash
//! - GET /api/user/{id} - Get a user
//! - DELETE /api/user/{id} - Delete a user
//! - POST /api/schedules - Create a schedule
//! - GET /api/schedules/ym/{yearmonth} - List schedules in a month
//! - GET /api/schedules/{id} - Get a schedule
//! - PUT /api/schedules/{id} - Update a schedule
//! - DELETE /api/schedules/{id} - Delete a schedule

pub mod auth;
pub mod cors;
pub mod resource;
pub mod router;
pub mod schedules;
pub mod user;

#[cfg(test)]
mod test_support;

use aws_sdk_dynamodb::config::{Credentials, Region};
use shared::{
    ensure_tables, schedules_table_config, user_table_config, Config, DynamoStore, Environment,
    ItemStore, Result,
};
use tracing::info;

use crate::auth::BasicCredentials;

pub use cors::cors_layer;
pub use router::handler;

/// Application state shared across requests.
pub struct AppState {
    pub store: Box<dyn ItemStore>,
    pub user_table: String,
    pub schedules_table: String,
    pub credentials: BasicCredentials,
}

impl AppState {
    /// Connect to DynamoDB and, when configured, create missing tables.
    pub async fn new(config: &Config) -> Result<Self> {
        let client = dynamodb_client(config).await;

        if config.provision_tables {
            info!("Ensuring tables exist ({})", config.environment.as_str());
            ensure_tables(
                &client,
                &[
                    user_table_config(&config.user_table),
                    schedules_table_config(&config.schedules_table),
                ],
            )
            .await?;
        }

        Ok(Self::with_store(Box::new(DynamoStore::new(client)), config))
    }

    pub fn with_store(store: Box<dyn ItemStore>, config: &Config) -> Self {
        Self {
            store,
            user_table: config.user_table.clone(),
            schedules_table: config.schedules_table.clone(),
            credentials: BasicCredentials::new(&config.basic_username, &config.basic_password),
        }
    }
}

async fn dynamodb_client(config: &Config) -> aws_sdk_dynamodb::Client {
    let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()));

    if let Some(endpoint) = &config.dynamodb_endpoint {
        info!("Using DynamoDB endpoint {}", endpoint);
        loader = loader.endpoint_url(endpoint);

        // The local emulator accepts any credentials.
        if config.environment == Environment::Development {
            loader = loader.credentials_provider(Credentials::new(
                "fakeAccessKey",
                "fakeSecretAccessKey",
                None,
                None,
                "local-emulator",
            ));
        }
    }

    aws_sdk_dynamodb::Client::new(&loader.load().await)
}
