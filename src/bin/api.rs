use std::sync::Arc;

use anyhow::Context;
use lambda_runtime::{LambdaEvent, service_fn};
use prdigest::api::function_handler;
use prdigest::core::config::AppConfig;
use prdigest::dispatch::Dispatcher;
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), lambda_runtime::Error> {
    prdigest::setup_logging();

    let config = AppConfig::from_env().context("Failed to load configuration")?;
    let dispatcher = Arc::new(Dispatcher::from_config(config)?);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let dispatcher = Arc::clone(&dispatcher);
        async move { function_handler(&dispatcher, event).await }
    }))
    .await
}
