use std::collections::BTreeMap;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Map, Value};

use crate::errors::Error;

/// Inbound HTTP-style event. `body` is either a JSON string or an
/// already-parsed object depending on the invoker.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct Request {
    #[serde(default)]
    pub body: Option<Value>,
}

impl Request {
    pub fn from_event(event: Value) -> Result<Self, Error> {
        if !event.is_object() {
            return Err(Error::validation("Event must be a JSON object"));
        }
        serde_json::from_value(event)
            .map_err(|e| Error::validation(format!("Invalid event: {}", e)))
    }

    pub fn parse_body<T: DeserializeOwned>(&self) -> Result<T, Error> {
        match &self.body {
            None | Some(Value::Null) => Err(Error::validation("No body in event")),
            Some(Value::String(raw)) => serde_json::from_str(raw)
                .map_err(|e| Error::validation(format!("Invalid JSON body: {}", e))),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| Error::validation(format!("Invalid JSON body: {}", e))),
        }
    }
}

/// Outbound envelope understood by Lambda function URLs and API Gateway
/// proxy integrations.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Response {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl Response {
    /// 200 response; `payload` fields are merged next to `status: "success"`.
    pub fn success(payload: Value) -> Self {
        let mut body = match payload {
            Value::Object(map) => map,
            other => {
                let mut map = Map::new();
                map.insert("data".to_string(), other);
                map
            }
        };
        body.insert("status".to_string(), json!("success"));

        Self::json(200, Value::Object(body))
    }

    pub fn from_error(err: &Error) -> Self {
        Self::json(
            err.status_code(),
            json!({
                "error": err.to_string(),
                "error_type": err.kind(),
                "status": "error",
            }),
        )
    }

    fn json(status_code: u16, body: Value) -> Self {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());

        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }

    /// Parsed `body`, mostly useful to callers inspecting the result.
    pub fn body_json(&self) -> Result<Value, serde_json::Error> {
        serde_json::from_str(&self.body)
    }
}
