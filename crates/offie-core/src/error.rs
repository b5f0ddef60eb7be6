use thiserror::Error;

/// Errors raised while loading application configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },

    #[error("failed to read categories file {path}: {source}")]
    CategoriesFileIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse categories file: {0}")]
    CategoriesFileParse(#[from] serde_yaml::Error),

    #[error("categories validation error: {0}")]
    Validation(String),
}

/// Failures of the device geolocation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location lookup is not supported")]
    Unsupported,
}

/// Failures of the address geocoding collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeocodeError {
    #[error("no results for address \"{address}\"")]
    NotFound { address: String },

    #[error("geocoding provider error: {code}")]
    Provider { code: String },
}

/// A failed nearby search for one category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("place search provider error: {code}{}", .message.as_deref().map(|m| format!(" ({m})")).unwrap_or_default())]
pub struct ProviderError {
    /// Provider status, e.g. `OVER_QUERY_LIMIT` or `HTTP_503`.
    pub code: String,
    pub message: Option<String>,
}

impl ProviderError {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: None,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// User-visible search failures.
///
/// A search over zero categories is not an error; it completes with an
/// empty result.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SearchError {
    #[error("your location is unavailable: {0}")]
    LocationUnavailable(#[from] LocationError),

    #[error(
        "Sorry, we couldn't find \"{address}\". Try a more concise address, i.e. a post code or zip code."
    )]
    AddressNotFound { address: String },

    #[error("Please enter an address before searching. Alternatively, use the geolocation feature.")]
    EmptyAddress,

    #[error("search provider error: {code}")]
    Provider { code: String },
}

impl From<GeocodeError> for SearchError {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound { address } => SearchError::AddressNotFound { address },
            GeocodeError::Provider { code } => SearchError::Provider { code },
        }
    }
}

impl From<ProviderError> for SearchError {
    fn from(err: ProviderError) -> Self {
        SearchError::Provider { code: err.code }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn geocode_not_found_maps_to_address_not_found() {
        let err: SearchError = GeocodeError::NotFound {
            address: "nowhere".to_string(),
        }
        .into();
        assert_eq!(
            err,
            SearchError::AddressNotFound {
                address: "nowhere".to_string()
            }
        );
    }

    #[test]
    fn provider_error_display_includes_message() {
        let err = ProviderError::new("REQUEST_DENIED").with_message("bad key");
        assert_eq!(
            err.to_string(),
            "place search provider error: REQUEST_DENIED (bad key)"
        );
        assert_eq!(
            ProviderError::new("HTTP_503").to_string(),
            "place search provider error: HTTP_503"
        );
    }

    #[test]
    fn location_error_wraps_into_location_unavailable() {
        let err: SearchError = LocationError::PermissionDenied.into();
        assert!(matches!(
            err,
            SearchError::LocationUnavailable(LocationError::PermissionDenied)
        ));
    }
}
