//! `/api/user` handlers. Users carry their own `id`; there is no update.

use lambda_http::{Body, Error, Response};
use serde::Serialize;
use serde_json::Value;
use shared::http::{parse_json_body, rejection_response, MessageBody};
use shared::tables::PASS_INDEX;
use shared::User;
use tracing::info;

use crate::resource::{self, respond, to_document};
use crate::AppState;

#[derive(Debug, Serialize)]
struct UserCreated {
    message: String,
    user: User,
}

pub async fn create_user(state: &AppState, body: &Body) -> Result<Response<Body>, Error> {
    let user = match parse_json_body::<Value>(body).and_then(User::try_from) {
        Ok(user) => user,
        Err(e) => return rejection_response(&e),
    };

    let outcome = match to_document(&user) {
        Ok(item) => resource::create::<User>(state.store.as_ref(), &state.user_table, item).await,
        Err(e) => Err(e),
    };

    if let Ok(user) = &outcome {
        info!("Created user {}", user.id);
    }

    respond(
        outcome.map(|user| UserCreated {
            message: "user created successfully".to_string(),
            user,
        }),
        201,
        "Failed to create user",
    )
}

pub async fn find_users_by_password(state: &AppState, password: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::query::<User>(
        state.store.as_ref(),
        &state.user_table,
        PASS_INDEX,
        "password",
        password,
    )
    .await;

    respond(outcome, 200, "Failed to retrieve user")
}

pub async fn get_user(state: &AppState, id: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::get::<User>(state.store.as_ref(), &state.user_table, id).await;
    respond(outcome, 200, "Failed to retrieve user")
}

pub async fn delete_user(state: &AppState, id: &str) -> Result<Response<Body>, Error> {
    let outcome = resource::delete(state.store.as_ref(), &state.user_table, id)
        .await
        .map(|()| MessageBody {
            message: "user deleted successfully".to_string(),
        });

    respond(outcome, 200, "Failed to delete user")
}
