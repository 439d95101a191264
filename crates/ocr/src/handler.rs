use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use derive_new::new;
use domain::{redact::redact, Error, Request, Response};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    config::OcrConfig,
    engine::{Tesseract, TextRecognizer},
    preprocess::{preprocess, PreprocessOptions},
};

#[derive(Debug, Deserialize)]
struct OcrInput {
    #[serde(default)]
    image: Option<String>,
}

/// Base64 image in, recognized text out.
#[derive(new)]
pub struct OcrHandler {
    recognizer: Arc<dyn TextRecognizer>,
    options: PreprocessOptions,
}

impl OcrHandler {
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(Arc::new(Tesseract::from_config(config)), config.preprocess)
    }

    /// Never fails: every error becomes a JSON error response.
    pub async fn handle(&self, event: Value) -> Response {
        tracing::info!("Received OCR event: {}", redact(&event));

        match self.extract(event).await {
            Ok(text) => {
                tracing::info!("Extracted {} characters", text.chars().count());
                Response::success(json!({ "text": text }))
            }
            Err(err) => {
                tracing::error!(error_type = err.kind(), "OCR failed: {:?}", err);
                Response::from_error(&err)
            }
        }
    }

    pub async fn extract(&self, event: Value) -> Result<String, Error> {
        let request = Request::from_event(event)?;
        let input: OcrInput = request.parse_body()?;
        let bytes = decode_image_data(input.image.as_deref())?;

        let options = self.options;
        let image = tokio::task::spawn_blocking(move || preprocess(&bytes, &options))
            .await
            .map_err(|e| Error::unexpected(format!("Preprocessing task failed: {}", e)))??;

        self.recognizer.recognize(&image).await
    }
}

/// Splits `"<prefix>,<base64>"` and decodes the payload.
pub fn decode_image_data(image: Option<&str>) -> Result<Vec<u8>, Error> {
    let image = image
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::validation("No image data provided"))?;

    let parts: Vec<&str> = image.split(',').collect();
    if parts.len() != 2 {
        return Err(Error::validation("Invalid image data format"));
    }

    let payload: String = parts[1]
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    STANDARD
        .decode(payload)
        .map_err(|e| Error::decode(format!("Invalid base64 payload: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use image::{DynamicImage, GrayImage, ImageFormat, Rgb, RgbImage};
    use std::{io::Cursor, sync::Mutex};

    #[derive(Default)]
    struct StubRecognizer {
        text: String,
        seen: Mutex<Vec<(u32, u32)>>,
    }

    #[async_trait]
    impl TextRecognizer for StubRecognizer {
        async fn recognize(&self, image: &GrayImage) -> Result<String, Error> {
            self.seen.lock().unwrap().push(image.dimensions());
            Ok(self.text.clone())
        }
    }

    struct FailingRecognizer;

    #[async_trait]
    impl TextRecognizer for FailingRecognizer {
        async fn recognize(&self, _image: &GrayImage) -> Result<String, Error> {
            Err(Error::engine("tessdata not found"))
        }
    }

    fn white_pixel_data_uri() -> String {
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255])))
            .write_to(&mut cursor, ImageFormat::Png)
            .unwrap();
        format!("data:image/png;base64,{}", STANDARD.encode(cursor.into_inner()))
    }

    fn handler_with(text: &str) -> (Arc<StubRecognizer>, OcrHandler) {
        let stub = Arc::new(StubRecognizer {
            text: text.to_string(),
            ..Default::default()
        });
        let handler = OcrHandler::new(stub.clone(), PreprocessOptions::default());
        (stub, handler)
    }

    fn event(image: Value) -> Value {
        json!({ "body": json!({ "image": image }).to_string() })
    }

    #[tokio::test]
    async fn white_pixel_yields_empty_text() {
        let (stub, handler) = handler_with("");
        let response = handler.handle(event(json!(white_pixel_data_uri()))).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.body_json().unwrap(),
            json!({ "text": "", "status": "success" })
        );
        assert_eq!(stub.seen.lock().unwrap().as_slice(), &[(2, 2)]);
    }

    #[tokio::test]
    async fn returns_recognized_text_verbatim() {
        let (_, handler) = handler_with("Amoxicillin 500 mg\nTake 1 cap TID\n");
        let event = json!({ "body": { "image": white_pixel_data_uri() } });
        let response = handler.handle(event).await;

        let body = response.body_json().unwrap();
        assert_eq!(body["text"], "Amoxicillin 500 mg\nTake 1 cap TID\n");
    }

    #[tokio::test]
    async fn malformed_images_are_client_or_server_errors_never_panics() {
        let cases = [
            (json!({}), 400),
            (json!({ "body": null }), 400),
            (json!({ "body": "not json" }), 400),
            (event(json!("")), 400),
            (event(json!(null)), 400),
            (event(json!(42)), 400),
            (event(json!("iVBORw0KGgo")), 400),
            (event(json!("a,b,c")), 400),
            (event(json!("data:image/png;base64,@@@not-base64@@@")), 500),
            (event(json!("data:image/png;base64,aGVsbG8gd29ybGQ=")), 500),
        ];

        let (stub, handler) = handler_with("never");
        for (event, expected) in cases {
            let response = handler.handle(event.clone()).await;
            assert_eq!(response.status_code, expected, "event: {}", event);
            assert_eq!(response.body_json().unwrap()["status"], "error");
        }
        assert!(stub.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn missing_image_reports_validation_error() {
        let (_, handler) = handler_with("");
        let response = handler.handle(json!({ "body": "{}" })).await;

        let body = response.body_json().unwrap();
        assert_eq!(body["error"], "No image data provided");
        assert_eq!(body["error_type"], "ValidationError");
    }

    #[tokio::test]
    async fn engine_failures_become_500() {
        let handler = OcrHandler::new(Arc::new(FailingRecognizer), PreprocessOptions::default());
        let response = handler.handle(event(json!(white_pixel_data_uri()))).await;

        assert_eq!(response.status_code, 500);
        let body = response.body_json().unwrap();
        assert_eq!(body["error_type"], "EngineInvocationError");
        assert!(body["error"].as_str().unwrap().contains("tessdata not found"));
    }

    #[test]
    fn decodes_payload_with_line_breaks() {
        let bytes = decode_image_data(Some("data:text/plain;base64,aGVs\nbG8=")).unwrap();
        assert_eq!(bytes, b"hello");
    }

    // Needs the Tesseract binary and language data from the Lambda layer.
    #[tokio::test]
    #[ignore]
    async fn tesseract_reads_blank_image_as_empty() {
        let config = OcrConfig::from_env().unwrap();
        let handler = OcrHandler::from_config(&config);
        let response = handler.handle(event(json!(white_pixel_data_uri()))).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(response.body_json().unwrap()["text"].as_str().unwrap().trim(), "");
    }
}
