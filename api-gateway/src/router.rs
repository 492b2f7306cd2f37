//! Path and method dispatch for every `/api` route.

use std::sync::Arc;
use std::time::Instant;

use lambda_http::{Body, Error, Request, Response};
use shared::http::error_response;
use tracing::{info, warn};

use crate::auth::unauthorized;
use crate::{schedules, user, AppState};

/// Lambda entry point: authenticate, dispatch, and log the outcome.
pub async fn handler(state: Arc<AppState>, event: Request) -> Result<Response<Body>, Error> {
    let started = Instant::now();
    let method = event.method().as_str().to_string();
    let path = event.uri().path().to_string();

    let response = if let Err(e) = state.credentials.authorize(&event) {
        warn!("Rejected {} {}: {}", method, path, e);
        unauthorized()?
    } else {
        route(&state, &event).await?
    };

    info!(
        method = %method,
        path = %path,
        status = response.status().as_u16(),
        elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        "request completed"
    );

    Ok(response)
}

async fn route(state: &AppState, event: &Request) -> Result<Response<Body>, Error> {
    let segments = match api_segments(event.uri().path()) {
        Some(segments) => segments,
        None => return not_found(),
    };
    let segments: Vec<&str> = segments.iter().map(String::as_str).collect();
    let method = event.method().as_str();

    match segments.as_slice() {
        ["user"] => match method {
            "POST" => user::create_user(state, event.body()).await,
            _ => method_not_allowed(),
        },
        ["user", "my", password] => match method {
            "GET" => user::find_users_by_password(state, password).await,
            _ => method_not_allowed(),
        },
        ["user", id] => match method {
            "GET" => user::get_user(state, id).await,
            "DELETE" => user::delete_user(state, id).await,
            _ => method_not_allowed(),
        },
        ["schedules"] => match method {
            "POST" => schedules::create_schedule(state, event.body()).await,
            _ => method_not_allowed(),
        },
        ["schedules", "ym", yearmonth] => match method {
            "GET" => schedules::list_schedules_by_month(state, yearmonth).await,
            _ => method_not_allowed(),
        },
        ["schedules", id] => match method {
            "GET" => schedules::get_schedule(state, id).await,
            "PUT" => schedules::update_schedule(state, id, event.body()).await,
            "DELETE" => schedules::delete_schedule(state, id).await,
            _ => method_not_allowed(),
        },
        _ => not_found(),
    }
}

/// Percent-decoded path segments after `/api`.
///
/// A single leading segment before `api` (the API Gateway stage) is skipped.
/// Returns `None` for paths outside `/api` or with undecodable segments.
fn api_segments(path: &str) -> Option<Vec<String>> {
    let raw: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let api = raw.iter().take(2).position(|s| *s == "api")?;

    raw.get(api + 1..)?
        .iter()
        .map(|segment| urlencoding::decode(segment).ok().map(|s| s.into_owned()))
        .collect()
}

fn not_found() -> Result<Response<Body>, Error> {
    error_response(404, "Not found")
}

fn method_not_allowed() -> Result<Response<Body>, Error> {
    error_response(405, "Method not allowed")
}
