use offie_core::{GeocodeError, ProviderError};
use thiserror::Error;

/// Errors returned by the Google Maps web service client.
#[derive(Debug, Error)]
pub enum PlacesError {
    /// Network or TLS failure. The request URL is stripped so the API key
    /// never ends up in logs.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The service answered with a non-`OK` status such as `REQUEST_DENIED`.
    #[error("Google Maps status {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: String,
        message: Option<String>,
    },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl PlacesError {
    /// Short machine-readable code used when surfacing the error to callers.
    #[must_use]
    pub fn code(&self) -> String {
        match self {
            PlacesError::Http(e) if e.is_timeout() => "TIMEOUT".to_string(),
            PlacesError::Http(_) => "NETWORK_ERROR".to_string(),
            PlacesError::Deserialize { .. } => "INVALID_RESPONSE".to_string(),
            PlacesError::Status { status, .. } => status.clone(),
            PlacesError::UnexpectedStatus { status, .. } => format!("HTTP_{status}"),
            PlacesError::InvalidBaseUrl { .. } => "INVALID_BASE_URL".to_string(),
        }
    }
}

impl From<PlacesError> for ProviderError {
    fn from(err: PlacesError) -> Self {
        let code = err.code();
        match err {
            PlacesError::Status {
                message: Some(message),
                ..
            } => ProviderError::new(code).with_message(message),
            PlacesError::Status { message: None, .. } => ProviderError::new(code),
            other => ProviderError::new(code).with_message(other.to_string()),
        }
    }
}

impl From<PlacesError> for GeocodeError {
    fn from(err: PlacesError) -> Self {
        GeocodeError::Provider { code: err.code() }
    }
}
