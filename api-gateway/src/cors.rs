//! CORS policy wrapped around the request handler.
//!
//! Preflights (`OPTIONS` carrying `Access-Control-Request-Method`) are
//! answered by the layer itself. Every other request, including a bare
//! `OPTIONS`, reaches the handler and goes through authentication.

use std::time::Duration;

use lambda_http::http::{header, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// Any origin may call the API with credentials; the origin is echoed back
/// because a wildcard is not allowed alongside credentials.
pub fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::mirror_request())
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([
            Method::POST,
            Method::GET,
            Method::OPTIONS,
            Method::PUT,
            Method::DELETE,
        ])
        .expose_headers([header::CONTENT_LENGTH])
        .max_age(Duration::from_secs(600))
        .allow_credentials(true)
}
