//! HTTP helpers for the Lambda.

use lambda_http::{Body, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::validation::ValidationReport;
use crate::{Error, Result};

/// `{"error": ...}` body used by every failure response.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// `{"message": ...}` body used by delete.
#[derive(Debug, Serialize)]
pub struct MessageBody {
    pub message: String,
}

/// Create a JSON response with the given status code and data.
pub fn json_response<T: Serialize>(status: u16, data: &T) -> std::result::Result<Response<Body>, lambda_http::Error> {
    Ok(Response::builder()
        .status(status)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(data)?))?)
}

/// Create an error response with the given status code and message.
pub fn error_response(status: u16, message: impl Into<String>) -> std::result::Result<Response<Body>, lambda_http::Error> {
    json_response(status, &ErrorBody { error: message.into() })
}

/// Response for a request that was rejected before reaching the store.
///
/// Validation failures list every offending field; other bad requests carry
/// the parser's message.
pub fn rejection_response(err: &Error) -> std::result::Result<Response<Body>, lambda_http::Error> {
    match err {
        Error::Validation(errors) => json_response(400, &ValidationReport::from(errors)),
        other => error_response(other.status_code(), other.to_string()),
    }
}

/// Parse request body as JSON.
pub fn parse_json_body<T: DeserializeOwned>(body: &Body) -> Result<T> {
    if body.as_ref().is_empty() {
        return Err(Error::BadRequest("Missing request body".to_string()));
    }

    serde_json::from_slice(body.as_ref())
        .map_err(|e| Error::BadRequest(format!("Invalid request body: {}", e)))
}
