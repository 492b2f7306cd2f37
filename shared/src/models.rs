//! Request schemas and stored records for users and schedules.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::validation::{validate_date, validate_time, validate_year_month, FieldReader};
use crate::{Error, Result};

/// Attribute holding the primary key in both collections.
pub const KEY_ATTRIBUTE: &str = "id";

/// Where a resource's primary key comes from on create.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPolicy {
    /// The request body carries the key.
    CallerSupplied,
    /// The handler generates a fresh random key before the write.
    Generated,
}

/// A record type stored in its own collection.
pub trait Resource: Serialize + DeserializeOwned + Send {
    /// Singular name used in response bodies and messages.
    const NAME: &'static str;
    const KEY_POLICY: KeyPolicy;
}

/// Create request for `POST /api/user`. Presence and JSON types are checked
/// by [`FieldReader`] while reading; the attributes below cover the rest.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 1, max = 30, message = "must be between 1 and 30 characters"))]
    pub id: Option<String>,
    #[validate(length(min = 60, max = 70, message = "must be between 60 and 70 characters"))]
    pub password: Option<String>,
    #[validate(length(min = 1, max = 40, message = "must be between 1 and 40 characters"))]
    pub name: Option<String>,
    #[validate(custom(function = "validate_date"))]
    pub registdate: Option<String>,
}

/// A stored user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub password: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registdate: Option<String>,
}

impl Resource for User {
    const NAME: &'static str = "user";
    const KEY_POLICY: KeyPolicy = KeyPolicy::CallerSupplied;
}

impl CreateUserRequest {
    pub fn read(reader: &mut FieldReader) -> Self {
        Self {
            id: reader.required_string("id"),
            password: reader.required_string("password"),
            name: reader.required_string("name"),
            registdate: reader.optional_string("registdate"),
        }
    }
}

impl TryFrom<Value> for User {
    type Error = Error;

    fn try_from(body: Value) -> Result<Self> {
        let mut reader = FieldReader::new(body)?;
        let request = CreateUserRequest::read(&mut reader);
        reader.check(&request)?;
        Ok(Self {
            id: required("id", request.id)?,
            password: required("password", request.password)?,
            name: required("name", request.name)?,
            registdate: request.registdate,
        })
    }
}

/// Create and update request for `/api/schedules`. Both endpoints share the
/// same shape.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ScheduleRequest {
    #[validate(length(min = 1, max = 40, message = "must be between 1 and 40 characters"))]
    pub title: Option<String>,
    #[validate(custom(function = "validate_year_month"))]
    pub yearmonth: Option<String>,
    #[validate(custom(function = "validate_time"))]
    pub starttime: Option<String>,
    #[validate(range(min = 0, max = 48, message = "must be between 0 and 48"))]
    pub startindex: Option<i64>,
    #[validate(custom(function = "validate_time"))]
    pub endtime: Option<String>,
    #[validate(range(min = 0, max = 48, message = "must be between 0 and 48"))]
    pub endindex: Option<i64>,
    #[validate(custom(function = "validate_date"))]
    pub registdate: Option<String>,
    #[validate(length(max = 400, message = "must be at most 400 characters"))]
    pub memo: Option<String>,
    #[serde(rename = "type")]
    #[validate(length(max = 10, message = "must be at most 10 characters"))]
    pub kind: Option<String>,
}

/// Schedule attributes other than the key, as written by create and update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleFields {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yearmonth: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starttime: Option<String>,
    pub startindex: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endtime: Option<String>,
    pub endindex: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registdate: Option<String>,
    pub memo: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ScheduleRequest {
    pub fn read(reader: &mut FieldReader) -> Self {
        Self {
            title: reader.required_string("title"),
            yearmonth: reader.optional_string("yearmonth"),
            starttime: reader.optional_string("starttime"),
            startindex: reader.required_integer("startindex"),
            endtime: reader.optional_string("endtime"),
            endindex: reader.required_integer("endindex"),
            registdate: reader.optional_string("registdate"),
            memo: reader.required_string("memo"),
            kind: reader.required_string("type"),
        }
    }
}

impl TryFrom<Value> for ScheduleFields {
    type Error = Error;

    fn try_from(body: Value) -> Result<Self> {
        let mut reader = FieldReader::new(body)?;
        let request = ScheduleRequest::read(&mut reader);
        reader.check(&request)?;
        Ok(Self {
            title: required("title", request.title)?,
            yearmonth: request.yearmonth,
            starttime: request.starttime,
            startindex: required("startindex", request.startindex)?,
            endtime: request.endtime,
            endindex: required("endindex", request.endindex)?,
            registdate: request.registdate,
            memo: required("memo", request.memo)?,
            kind: required("type", request.kind)?,
        })
    }
}

/// A stored schedule entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    pub id: String,
    #[serde(flatten)]
    pub fields: ScheduleFields,
}

impl Resource for Schedule {
    const NAME: &'static str = "schedule";
    const KEY_POLICY: KeyPolicy = KeyPolicy::Generated;
}

fn required<T>(field: &'static str, value: Option<T>) -> Result<T> {
    value.ok_or_else(|| {
        let mut errors = ValidationErrors::new();
        errors.add(field, ValidationError::new("required"));
        Error::Validation(errors)
    })
}
