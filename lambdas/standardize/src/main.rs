use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use sig::{StandardizeConfig, StandardizeHandler};
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = StandardizeConfig::from_env()?;
    if config.api_key.is_none() {
        tracing::warn!("OPENAI_API_KEY is not set; requests will be rejected");
    }
    tracing::info!("Using model {} at {}", config.model, config.base_url);

    let handler = StandardizeHandler::from_config(&config)?;
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let span = tracing::info_span!("standardize", request_id = %event.context.request_id);
        Ok::<_, Error>(handler.handle(event.payload).instrument(span).await)
    }))
    .await
}
