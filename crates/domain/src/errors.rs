use thiserror::Error;

/// Failure kinds a handler can report back to the caller.
#[derive(Error, Debug)]
pub enum Error {
    #[error("{message}")]
    Validation { message: String },

    #[error("{message}")]
    Configuration { message: String },

    #[error("Failed to decode image data: {message}")]
    Decode { message: String },

    #[error("OCR engine failed: {message}")]
    EngineInvocation { message: String },

    #[error("Upstream authentication failed: {message}")]
    UpstreamAuth { message: String },

    #[error("Upstream rejected the request: {message}")]
    UpstreamRequest { message: String },

    #[error("Upstream API error: {message}")]
    UpstreamApi { message: String },

    #[error("Invalid JSON response from model: {message}")]
    UpstreamFormat { message: String },

    #[error("An unexpected error occurred. Please check the logs.")]
    Unexpected { message: String },
}

impl Error {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation { message: message.into() }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration { message: message.into() }
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode { message: message.into() }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self::EngineInvocation { message: message.into() }
    }

    pub fn upstream_format(message: impl Into<String>) -> Self {
        Self::UpstreamFormat { message: message.into() }
    }

    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected { message: message.into() }
    }

    /// HTTP status code returned for this kind of failure.
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Validation { .. } => 400,
            Error::Configuration { .. } => 400,
            Error::Decode { .. } => 500,
            Error::EngineInvocation { .. } => 500,
            Error::UpstreamAuth { .. } => 401,
            Error::UpstreamRequest { .. } => 400,
            Error::UpstreamApi { .. } => 500,
            Error::UpstreamFormat { .. } => 500,
            Error::Unexpected { .. } => 500,
        }
    }

    /// Stable name reported as `error_type` in response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation { .. } => "ValidationError",
            Error::Configuration { .. } => "ConfigurationError",
            Error::Decode { .. } => "DecodeError",
            Error::EngineInvocation { .. } => "EngineInvocationError",
            Error::UpstreamAuth { .. } => "UpstreamAuthError",
            Error::UpstreamRequest { .. } => "UpstreamRequestError",
            Error::UpstreamApi { .. } => "UpstreamApiError",
            Error::UpstreamFormat { .. } => "UpstreamFormatError",
            Error::Unexpected { .. } => "UnexpectedError",
        }
    }
}
