//! Configuration management for the Lambda.

use std::env;

use crate::{Error, Result};

/// Local DynamoDB emulator used when running in development.
pub const LOCAL_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

/// Deployment environment, selected with the `ENV` variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Production => "production",
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = Error;

    fn try_from(s: String) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "development" => Ok(Self::Development),
            // Unset is treated as production, as in the deployed stack.
            "" | "production" => Ok(Self::Production),
            other => Err(Error::Config(format!(
                "{} is not a supported environment. Use either 'development' or 'production'.",
                other
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Deployment environment
    pub environment: Environment,
    /// AWS region
    pub aws_region: String,
    /// DynamoDB endpoint override (local emulator)
    pub dynamodb_endpoint: Option<String>,
    /// Name of the user collection
    pub user_table: String,
    /// Name of the schedules collection
    pub schedules_table: String,
    /// Basic auth username
    pub basic_username: String,
    /// Basic auth password
    pub basic_password: String,
    /// Create missing tables at startup
    pub provision_tables: bool,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let environment = Environment::try_from(lookup("ENV").unwrap_or_default())?;
        let is_development = environment == Environment::Development;

        let dynamodb_endpoint = lookup("DYNAMODB_ENDPOINT")
            .filter(|endpoint| !endpoint.is_empty())
            .or_else(|| is_development.then(|| LOCAL_DYNAMODB_ENDPOINT.to_string()));

        let provision_tables = match lookup("PROVISION_TABLES") {
            Some(flag) => parse_flag(&flag)?,
            None => is_development,
        };

        Ok(Self {
            environment,
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint,
            user_table: lookup("USER_TABLE").unwrap_or_else(|| "User".to_string()),
            schedules_table: lookup("SCHEDULES_TABLE").unwrap_or_else(|| "Schedules".to_string()),
            basic_username: lookup("BASIC_USERNAME").unwrap_or_default(),
            basic_password: lookup("BASIC_PASSWORD").unwrap_or_default(),
            provision_tables,
        })
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        other => Err(Error::Config(format!(
            "PROVISION_TABLES must be a boolean, got '{}'",
            other
        ))),
    }
}
