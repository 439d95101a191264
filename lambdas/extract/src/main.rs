use lambda_runtime::{service_fn, Error, LambdaEvent};
use ocr::{OcrConfig, OcrHandler};
use serde_json::Value;
use tracing::Instrument;

#[tokio::main]
async fn main() -> Result<(), Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let config = OcrConfig::from_env()?;
    tracing::info!(
        "Using {} (oem {}, psm {}, lang {})",
        config.tesseract_cmd.display(),
        config.oem,
        config.psm,
        config.language
    );

    let handler = OcrHandler::from_config(&config);
    let handler = &handler;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        let span = tracing::info_span!("extract", request_id = %event.context.request_id);
        Ok::<_, Error>(handler.handle(event.payload).instrument(span).await)
    }))
    .await
}
