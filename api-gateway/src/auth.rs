//! HTTP Basic authentication against the configured credential pair.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use lambda_http::http::header::{HeaderValue, AUTHORIZATION, WWW_AUTHENTICATE};
use lambda_http::{Body, Request, Response};
use shared::http::error_response;
use shared::{Error, Result};
use subtle::ConstantTimeEq;

/// The single username/password pair every request must present.
#[derive(Clone)]
pub struct BasicCredentials {
    username: String,
    password: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .finish()
    }
}

impl BasicCredentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Check the request's `Authorization` header.
    pub fn authorize(&self, event: &Request) -> Result<()> {
        let header = event
            .headers()
            .get(AUTHORIZATION)
            .ok_or_else(|| Error::Auth("The 'Authorization' header was missing".to_string()))?
            .to_str()
            .map_err(|_| Error::Auth("The 'Authorization' header is not valid ASCII".to_string()))?;

        let (username, password) = decode_basic(header)?;

        let matches = username.as_bytes().ct_eq(self.username.as_bytes())
            & password.as_bytes().ct_eq(self.password.as_bytes());

        if bool::from(matches) {
            Ok(())
        } else {
            Err(Error::Auth("Invalid username or password".to_string()))
        }
    }
}

fn decode_basic(header: &str) -> Result<(String, String)> {
    let encoded = header
        .strip_prefix("Basic ")
        .ok_or_else(|| Error::Auth("The authorization scheme was not 'Basic'".to_string()))?;

    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| Error::Auth("Failed to base64-decode 'Basic' credentials".to_string()))?;

    let credentials = String::from_utf8(decoded)
        .map_err(|_| Error::Auth("The decoded credential string is not valid UTF-8".to_string()))?;

    let (username, password) = credentials
        .split_once(':')
        .ok_or_else(|| Error::Auth("A password must be provided in 'Basic' auth".to_string()))?;

    Ok((username.to_string(), password.to_string()))
}

/// 401 with a Basic challenge.
pub fn unauthorized() -> std::result::Result<Response<Body>, lambda_http::Error> {
    let mut response = error_response(401, "Unauthorized")?;
    response.headers_mut().insert(
        WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"Secure Area\""),
    );
    Ok(response)
}
