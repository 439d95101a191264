use axum::{
    extract::{DefaultBodyLimit, State},
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::IntoResponse,
    routing::post,
    Router,
};
use domain::Response;
use ocr::{OcrConfig, OcrHandler};
use serde_json::json;
use sig::{StandardizeConfig, StandardizeHandler};
use std::sync::Arc;

// Synchronous Lambda invocations cap the payload at 6 MB.
const MAX_BODY_BYTES: usize = 6 * 1024 * 1024;

#[derive(Clone)]
struct AppState {
    ocr: Arc<OcrHandler>,
    standardize: Arc<StandardizeHandler>,
}

#[tokio::main]
async fn main() -> Result<(), lambda_http::Error> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .without_time()
        .init();

    let ocr_config = OcrConfig::from_env()?;
    let sig_config = StandardizeConfig::from_env()?;

    let state = AppState {
        ocr: Arc::new(OcrHandler::from_config(&ocr_config)),
        standardize: Arc::new(StandardizeHandler::from_config(&sig_config)?),
    };

    let app = tower::ServiceBuilder::new()
        .layer(axum_aws_lambda::LambdaLayer::default())
        .service(router(state));

    lambda_http::run(app).await?;
    Ok(())
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/extract", post(extract))
        .route("/standardize", post(standardize))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
}

// Extract text from a base64 image
async fn extract(State(state): State<AppState>, body: String) -> impl IntoResponse {
    into_http(state.ocr.handle(json!({ "body": body })).await)
}

// Standardize prescription text
async fn standardize(State(state): State<AppState>, body: String) -> impl IntoResponse {
    into_http(state.standardize.handle(json!({ "body": body })).await)
}

fn into_http(response: Response) -> impl IntoResponse {
    let status =
        StatusCode::from_u16(response.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }

    (status, headers, response.body)
}
