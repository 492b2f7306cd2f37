//! Schedule App Lambda - single function behind API Gateway serving the
//! user and schedule APIs.

use std::sync::Arc;

use api_gateway::{cors_layer, handler, AppState};
use lambda_http::{run, service_fn, Error};
use shared::Config;
use tower::ServiceBuilder;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env()?;
    let state = Arc::new(AppState::new(&config).await?);

    let service = ServiceBuilder::new()
        .layer(cors_layer())
        .service(service_fn(move |event| {
            let state = Arc::clone(&state);
            async move { handler(state, event).await }
        }));

    run(service).await
}
