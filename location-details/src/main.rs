//! Location Details Lambda - Resolves a postal code to its place name and region.
//!
//! Accepts `{"zipCode": "...", "countryCode": "USA" | "CAD" | "ESP"}`, bare or
//! wrapped in the callable `{"data": ...}` envelope, and answers with
//! `{"result": {...}}` or `{"error": {"status": ..., "message": ...}}`.

use std::sync::Arc;

use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use serde_json::Value;
use shared::{
    handle_callable, CallableResponse, Config, ConnectionProvider, LocationDetails, MongoConnector,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

type Provider = ConnectionProvider<MongoConnector>;

async fn handler(
    provider: Arc<Provider>,
    event: LambdaEvent<Value>,
) -> Result<CallableResponse<LocationDetails>, Error> {
    info!(request_id = %event.context.request_id, "Handling location details request");
    Ok(handle_callable(&*provider, event.payload).await)
}

/// Build the connection provider. Nothing connects here; the first
/// invocation does.
async fn build_provider(config: &Config) -> Provider {
    let secrets_client = if config.needs_secrets() {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.aws_region.clone()))
            .load()
            .await;
        Some(aws_sdk_secretsmanager::Client::new(&aws_config))
    } else {
        None
    };

    ConnectionProvider::new(MongoConnector::new(config), config.uri_source(secrets_client))
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .init();

    let config = Config::from_env();
    let provider = Arc::new(build_provider(&config).await);

    run(service_fn(move |event| {
        let provider = Arc::clone(&provider);
        async move { handler(provider, event).await }
    }))
    .await
}
