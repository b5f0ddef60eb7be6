//! HTTP client for the Google Maps Geocoding and Places Nearby Search APIs.
//!
//! Wraps `reqwest` with key management, retry and typed response parsing.
//! Every endpoint checks the `"status"` field of the JSON envelope: `OK`
//! yields results, `ZERO_RESULTS` an empty answer, and anything else a
//! [`PlacesError::Status`].

use std::time::Duration;

use async_trait::async_trait;
use offie_core::{CategoryTag, Coordinate, GeocodeError, ProviderError, RawPlaceRecord};
use offie_search::{GeocodingProvider, PlaceSearchProvider};
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::retry_with_backoff;
use crate::types::{ApiResponse, GeocodeResult, NearbyResult};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";
const NEARBY_SEARCH_PATH: &str = "place/nearbysearch/json";
const GEOCODE_PATH: &str = "geocode/json";

/// Client for the Google Maps web services.
///
/// Use [`GoogleMapsClient::new`] for production or
/// [`GoogleMapsClient::with_base_url`] to point at a mock server in tests.
pub struct GoogleMapsClient {
    client: Client,
    api_key: String,
    nearby_url: Url,
    geocode_url: Url,
    open_now: bool,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl GoogleMapsClient {
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client against a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the `reqwest::Client` cannot be
    /// built, or [`PlacesError::InvalidBaseUrl`] if `base_url` does not parse.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("offie/0.1 (shop-locator)")
            .build()?;

        // Exactly one trailing slash, so joins append rather than replace the
        // last path segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| invalid_base_url(base_url, e))?;
        let nearby_url = base
            .join(NEARBY_SEARCH_PATH)
            .map_err(|e| invalid_base_url(base_url, e))?;
        let geocode_url = base
            .join(GEOCODE_PATH)
            .map_err(|e| invalid_base_url(base_url, e))?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            nearby_url,
            geocode_url,
            open_now: true,
            max_retries: 3,
            backoff_base_ms: 500,
        })
    }

    /// Sets how many times transient failures are retried and the base delay.
    #[must_use]
    pub fn with_retry_policy(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Restricts nearby searches to places open at request time.
    #[must_use]
    pub fn with_open_now(mut self, open_now: bool) -> Self {
        self.open_now = open_now;
        self
    }

    /// Finds places of type `category` within `radius_meters` of `center`.
    ///
    /// Only the first page (up to 20 places) is fetched. Results lacking a
    /// `place_id` are skipped.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Status`] for any status other than `OK` or
    ///   `ZERO_RESULTS`.
    /// - [`PlacesError::Http`] or [`PlacesError::UnexpectedStatus`] on
    ///   transport failure once retries are exhausted.
    /// - [`PlacesError::Deserialize`] if the body does not match the
    ///   expected shape.
    pub async fn nearby_search(
        &self,
        center: Coordinate,
        radius_meters: u32,
        category: &CategoryTag,
    ) -> Result<Vec<RawPlaceRecord>, PlacesError> {
        let location = center.to_string();
        let radius = radius_meters.to_string();
        let mut params = vec![
            ("location", location.as_str()),
            ("radius", radius.as_str()),
            ("type", category.as_str()),
        ];
        if self.open_now {
            params.push(("opennow", "true"));
        }
        let url = self.build_url(&self.nearby_url, &params);

        let Some(results) = self
            .fetch::<NearbyResult>(&url, "nearbysearch")
            .await?
        else {
            tracing::debug!(%category, %center, "nearby search returned no results");
            return Ok(Vec::new());
        };

        let total = results.len();
        let records: Vec<RawPlaceRecord> = results
            .into_iter()
            .filter_map(NearbyResult::into_record)
            .collect();
        if records.len() < total {
            tracing::debug!(
                %category,
                dropped = total - records.len(),
                "nearby results without place_id skipped"
            );
        }
        tracing::debug!(%category, %center, count = records.len(), "nearby search complete");
        Ok(records)
    }

    /// Resolves `address` to the location of its best match.
    ///
    /// Returns `Ok(None)` when the service has no match for the address.
    ///
    /// # Errors
    ///
    /// Same as [`GoogleMapsClient::nearby_search`].
    pub async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, PlacesError> {
        let url = self.build_url(&self.geocode_url, &[("address", address)]);
        let results = self.fetch::<GeocodeResult>(&url, "geocode").await?;

        let Some(best) = results.and_then(|r| r.into_iter().next()) else {
            tracing::debug!(address, "address not found");
            return Ok(None);
        };
        let location: Coordinate = best.geometry.location.into();
        tracing::debug!(
            address,
            matched = best.formatted_address.as_deref().unwrap_or(""),
            %location,
            "address geocoded"
        );
        Ok(Some(location))
    }

    /// Appends `key` and the endpoint parameters, percent-encoded.
    fn build_url(&self, endpoint: &Url, extra: &[(&str, &str)]) -> Url {
        let mut url = endpoint.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            for (k, v) in extra {
                pairs.append_pair(k, v);
            }
        }
        url
    }

    /// Fetches `url` with retry and unwraps the status envelope.
    ///
    /// `None` means `ZERO_RESULTS`.
    async fn fetch<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<Option<Vec<T>>, PlacesError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || async move {
            let body = self.request_json(url, context).await?;
            let envelope: ApiResponse<T> =
                serde_json::from_value(body).map_err(|e| PlacesError::Deserialize {
                    context: context.to_owned(),
                    source: e,
                })?;
            Self::check_status(envelope)
        })
        .await
    }

    /// Sends a GET request, requires a 2xx status and parses the body as JSON.
    async fn request_json(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<serde_json::Value, PlacesError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PlacesError::UnexpectedStatus {
                status: status.as_u16(),
                url: redact(url),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PlacesError::Http(e.without_url()))?;
        serde_json::from_str(&body).map_err(|e| PlacesError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    fn check_status<T>(envelope: ApiResponse<T>) -> Result<Option<Vec<T>>, PlacesError> {
        match envelope.status.as_str() {
            "OK" => Ok(Some(envelope.results)),
            "ZERO_RESULTS" => Ok(None),
            _ => Err(PlacesError::Status {
                status: envelope.status,
                message: envelope.error_message,
            }),
        }
    }
}

fn invalid_base_url(url: &str, reason: impl std::fmt::Display) -> PlacesError {
    PlacesError::InvalidBaseUrl {
        url: url.to_owned(),
        reason: reason.to_string(),
    }
}

/// The request URL without its query string, which carries the API key.
fn redact(url: &Url) -> String {
    let mut url = url.clone();
    url.set_query(None);
    url.to_string()
}

#[async_trait]
impl PlaceSearchProvider for GoogleMapsClient {
    async fn search_nearby(
        &self,
        center: Coordinate,
        radius_meters: u32,
        category: &CategoryTag,
    ) -> Result<Vec<RawPlaceRecord>, ProviderError> {
        self.nearby_search(center, radius_meters, category)
            .await
            .map_err(ProviderError::from)
    }
}

#[async_trait]
impl GeocodingProvider for GoogleMapsClient {
    async fn resolve_address(&self, address: &str) -> Result<Coordinate, GeocodeError> {
        self.geocode(address)
            .await?
            .ok_or_else(|| GeocodeError::NotFound {
                address: address.to_owned(),
            })
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
