use std::{env, fmt, time::Duration};

use anyhow::{Context, Result};

pub const DEFAULT_MODEL: &str = "chatgpt-4o-latest";
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Clone, PartialEq)]
pub struct StandardizeConfig {
    /// Optional at startup so a missing key surfaces as a per-request
    /// configuration error instead of a crash loop.
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    /// Ask for `response_format: json_object`.
    pub json_mode: bool,
    pub timeout: Duration,
}

impl StandardizeConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let json_mode = match get("OPENAI_JSON_MODE") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for OPENAI_JSON_MODE: {:?}", raw))?,
            None => false,
        };

        let timeout_secs: u64 = match get("OPENAI_TIMEOUT_SECS") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("Invalid value for OPENAI_TIMEOUT_SECS: {:?}", raw))?,
            None => 60,
        };

        Ok(Self {
            api_key: get("OPENAI_API_KEY").map(|k| k.trim().to_string()),
            model: get("OPENAI_MODEL").unwrap_or(DEFAULT_MODEL.to_string()),
            base_url: get("OPENAI_BASE_URL").unwrap_or(DEFAULT_BASE_URL.to_string()),
            json_mode,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

impl fmt::Debug for StandardizeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardizeConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[MASKED]"))
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .field("json_mode", &self.json_mode)
            .field("timeout", &self.timeout)
            .finish()
    }
}
