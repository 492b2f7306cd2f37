//! Field checkers shared by the request schemas, and the field report sent
//! back to clients when a request fails validation.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{Error, Result};

static DATE_RE: OnceLock<Regex> = OnceLock::new();
static YEAR_MONTH_RE: OnceLock<Regex> = OnceLock::new();
static TIME_RE: OnceLock<Regex> = OnceLock::new();

fn pattern(cell: &'static OnceLock<Regex>, source: &str) -> &'static Regex {
    cell.get_or_init(|| {
        Regex::new(source).unwrap_or_else(|error| panic!("field pattern failed to compile: {error}"))
    })
}

/// `YYYY-MM-DD` that names a real calendar date.
pub fn validate_date(value: &str) -> std::result::Result<(), ValidationError> {
    let shape = pattern(&DATE_RE, r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$");
    if shape.is_match(value) && is_calendar_date(value) {
        Ok(())
    } else {
        Err(invalid("date", "Invalid date format. Use YYYY-MM-DD"))
    }
}

/// `YYYY-MM` with a month between 01 and 12.
pub fn validate_year_month(value: &str) -> std::result::Result<(), ValidationError> {
    let shape = pattern(&YEAR_MONTH_RE, r"^[0-9]{4}-[0-9]{2}$");
    if shape.is_match(value) && is_calendar_date(&format!("{}-01", value)) {
        Ok(())
    } else {
        Err(invalid("year_month", "Invalid date format. Use YYYY-MM"))
    }
}

/// `HH:MM`. Only the shape is checked, not the time of day.
pub fn validate_time(value: &str) -> std::result::Result<(), ValidationError> {
    if pattern(&TIME_RE, r"^[0-9]{2}:[0-9]{2}$").is_match(value) {
        Ok(())
    } else {
        Err(invalid("time", "Invalid time format. Use HH:MM"))
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

fn is_calendar_date(value: &str) -> bool {
    NaiveDate::parse_from_str(value, "%Y-%m-%d").is_ok()
}

/// Pulls typed fields out of a JSON request body.
///
/// Missing required fields, explicit `null`s and values of the wrong JSON
/// type are recorded against the field instead of aborting, so they end up
/// in the same report as the rule violations found by [`Validate`].
#[derive(Debug)]
pub struct FieldReader {
    body: Map<String, Value>,
    errors: Vec<(&'static str, ValidationError)>,
}

impl FieldReader {
    pub fn new(body: Value) -> Result<Self> {
        match body {
            Value::Object(body) => Ok(Self {
                body,
                errors: Vec::new(),
            }),
            other => Err(Error::BadRequest(format!(
                "Request body must be a JSON object, got {}",
                json_type(&other)
            ))),
        }
    }

    pub fn required_string(&mut self, field: &'static str) -> Option<String> {
        self.read(field, true, "string", |value| value.as_str().map(str::to_string))
    }

    pub fn optional_string(&mut self, field: &'static str) -> Option<String> {
        self.read(field, false, "string", |value| value.as_str().map(str::to_string))
    }

    /// Integers may be written as `5` or `5.0`, but not `5.5`.
    pub fn required_integer(&mut self, field: &'static str) -> Option<i64> {
        self.read(field, true, "integer", |value| {
            value.as_i64().or_else(|| {
                value
                    .as_f64()
                    .filter(|f| f.fract() == 0.0 && f.abs() <= i64::MAX as f64)
                    .map(|f| f as i64)
            })
        })
    }

    fn read<T>(
        &mut self,
        field: &'static str,
        required: bool,
        expected: &'static str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Option<T> {
        match self.body.get(field) {
            None if required => {
                self.reject(field, "required", format!("{} is required", field));
                None
            }
            None => None,
            Some(Value::Null) => {
                self.reject(field, "null", format!("{} must not be null", field));
                None
            }
            Some(value) => {
                let converted = convert(value);
                if converted.is_none() {
                    self.reject(
                        field,
                        "type",
                        format!("expected {} {}, got {}", article(expected), expected, json_type(value)),
                    );
                }
                converted
            }
        }
    }

    fn reject(&mut self, field: &'static str, code: &'static str, message: String) {
        self.errors
            .push((field, ValidationError::new(code).with_message(Cow::Owned(message))));
    }

    /// Run the schema rules on `request` and fold in everything recorded
    /// while reading. Fields that could not be read are `None` and so are
    /// never checked twice.
    pub fn check<T: Validate>(self, request: &T) -> Result<()> {
        let mut errors = match request.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };
        for (field, error) in self.errors {
            errors.add(field, error);
        }

        if errors.errors().is_empty() {
            Ok(())
        } else {
            Err(Error::Validation(errors))
        }
    }
}

fn article(expected: &str) -> &'static str {
    if expected.starts_with(['a', 'e', 'i', 'o', 'u']) {
        "an"
    } else {
        "a"
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Client-facing description of every violated field.
#[derive(Debug, Serialize, PartialEq)]
pub struct ValidationReport {
    pub error: String,
    pub fields: BTreeMap<String, Vec<String>>,
}

impl From<&ValidationErrors> for ValidationReport {
    fn from(errors: &ValidationErrors) -> Self {
        let fields = errors
            .field_errors()
            .into_iter()
            .map(|(field, errors)| {
                let messages = errors.iter().map(describe).collect();
                (field.to_string(), messages)
            })
            .collect();

        Self {
            error: "Validation failed".to_string(),
            fields,
        }
    }
}

fn describe(error: &ValidationError) -> String {
    match &error.message {
        Some(message) => message.to_string(),
        None => format!("failed '{}' check", error.code),
    }
}
