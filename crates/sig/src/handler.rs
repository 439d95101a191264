use std::sync::Arc;

use derive_new::new;
use domain::{redact::redact, Error, MedicationRecord, Request, Response, Standardized};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    client::{ChatModel, OpenAiClient},
    config::StandardizeConfig,
    prompt::system_prompt,
};

#[derive(Debug, Deserialize)]
struct StandardizeInput {
    #[serde(default)]
    text: Option<String>,
}

/// Free-text prescription in, structured medication records out.
#[derive(new)]
pub struct StandardizeHandler {
    /// `None` when no API key was configured.
    model: Option<Arc<dyn ChatModel>>,
    json_mode: bool,
}

impl StandardizeHandler {
    pub fn from_config(config: &StandardizeConfig) -> anyhow::Result<Self> {
        let model = match &config.api_key {
            Some(api_key) => {
                let client: Arc<dyn ChatModel> = Arc::new(OpenAiClient::new(api_key, config)?);
                Some(client)
            }
            None => None,
        };

        Ok(Self::new(model, config.json_mode))
    }

    /// Never fails: every error becomes a JSON error response.
    pub async fn handle(&self, event: Value) -> Response {
        tracing::info!("Received standardize event: {}", redact(&event));
        tracing::info!("OpenAI API key present: {}", self.model.is_some());

        match self.standardize(event).await {
            Ok(outcome) => {
                match &outcome {
                    Standardized::Medications(records) => {
                        tracing::info!("Standardized {} medications", records.len())
                    }
                    Standardized::NoMedications => {
                        tracing::info!("No medications identified in the text")
                    }
                }
                Response::success(outcome.into_body())
            }
            Err(err) => {
                tracing::error!(error_type = err.kind(), "Standardization failed: {:?}", err);
                Response::from_error(&err)
            }
        }
    }

    pub async fn standardize(&self, event: Value) -> Result<Standardized, Error> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| Error::configuration("OpenAI API key not found in environment variables"))?;

        let request = Request::from_event(event)?;
        let input: StandardizeInput = request.parse_body()?;
        let text = input
            .text
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| Error::validation("No text provided"))?;

        let reply = model.complete(&system_prompt(self.json_mode), &text).await?;
        let records = parse_reply(&reply)?;

        Ok(Standardized::from_records(records))
    }
}

/// Reads the model reply as medication records.
///
/// Accepts a bare array, a `{"medications": [...]}` object (JSON-object
/// response mode) or a single record object. Every record must carry at
/// least one of the seven field names, even if null; anything else is a
/// format error rather than an empty result.
pub fn parse_reply(reply: &str) -> Result<Vec<MedicationRecord>, Error> {
    let value: Value = serde_json::from_str(reply.trim())
        .map_err(|e| Error::upstream_format(e.to_string()))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("medications") {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(Error::upstream_format(format!(
                    "expected \"medications\" to be an array, found {}",
                    other
                )))
            }
            None => vec![Value::Object(map)],
        },
        other => {
            return Err(Error::upstream_format(format!(
                "expected a JSON array of medications, found {}",
                other
            )))
        }
    };

    items.into_iter().map(parse_record).collect()
}

fn parse_record(item: Value) -> Result<MedicationRecord, Error> {
    let has_field = item
        .as_object()
        .is_some_and(|map| MedicationRecord::FIELDS.iter().any(|f| map.contains_key(*f)));
    if !has_field {
        return Err(Error::upstream_format(format!(
            "expected a medication record, found {}",
            item
        )));
    }

    serde_json::from_value(item).map_err(|e| Error::upstream_format(e.to_string()))
}
