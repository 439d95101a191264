//! Log-safe copies of inbound events.
//!
//! Credential-like keys are masked and long strings (base64 images, pasted
//! prescriptions) are cut down so a single event never floods the log.

use serde_json::{Map, Value};

const SENSITIVE_KEYS: &[&str] = &[
    "api_key",
    "apikey",
    "authorization",
    "x-api-key",
    "access_token",
    "accesstoken",
    "token",
    "secret",
    "password",
    "cookie",
];

const MAX_STRING_LEN: usize = 256;

pub fn redact(value: &Value) -> Value {
    redact_recursive(value, "")
}

fn is_sensitive_key(key: &str) -> bool {
    let key = key.to_ascii_lowercase();
    SENSITIVE_KEYS.iter().any(|k| key == *k || key.ends_with(&format!("_{}", k)))
}

fn redact_string(s: &str, key: &str) -> Value {
    if is_sensitive_key(key) && !s.is_empty() {
        let hint: String = s.chars().take(4).collect();
        return Value::String(format!("{}***", hint));
    }

    let len = s.chars().count();
    if len > MAX_STRING_LEN {
        let prefix: String = s.chars().take(MAX_STRING_LEN).collect();
        return Value::String(format!("{}…({} chars)", prefix, len));
    }

    Value::String(s.to_string())
}

fn redact_recursive(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) => redact_string(s, key),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_recursive(v, key)).collect()),
        Value::Object(map) => {
            let mut result = Map::new();
            for (k, v) in map {
                result.insert(k.clone(), redact_recursive(v, k));
            }
            Value::Object(result)
        }
        other => other.clone(),
    }
}
