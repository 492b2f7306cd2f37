//! Shared library for the schedule app Lambda.
//!
//! This crate provides the configuration, error taxonomy, request schemas and
//! key-value store adapter used by the API handlers.

pub mod config;
pub mod dynamo;
pub mod error;
pub mod http;
pub mod models;
pub mod store;
pub mod tables;
pub mod validation;

pub use config::{Config, Environment};
pub use dynamo::DynamoStore;
pub use error::{Error, Result};
pub use models::{CreateUserRequest, KeyPolicy, Resource, Schedule, ScheduleFields, ScheduleRequest, User};
pub use store::{Document, ItemStore, Key};
pub use tables::{ensure_tables, schedules_table_config, user_table_config, TableConfig};
