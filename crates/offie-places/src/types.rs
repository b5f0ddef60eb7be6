//! Google Maps web service response types.
//!
//! Only the fields the locator reads are modelled. Both the Geocoding and the
//! Places Nearby Search endpoints share the `{"status", "results"}` envelope.

use offie_core::{Coordinate, RawPlaceRecord};
use serde::Deserialize;

/// Top-level envelope shared by the JSON endpoints.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    /// `OK`, `ZERO_RESULTS`, `OVER_QUERY_LIMIT`, `REQUEST_DENIED`,
    /// `INVALID_REQUEST` or `UNKNOWN_ERROR`.
    pub status: String,
    #[serde(default = "Vec::new")]
    pub results: Vec<T>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl From<LatLng> for Coordinate {
    fn from(value: LatLng) -> Self {
        Coordinate::new(value.lat, value.lng)
    }
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

// ---------------------------------------------------------------------------
// place/nearbysearch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct NearbyResult {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// Short street address, e.g. "12 High St, Oxford".
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl NearbyResult {
    /// Converts to the provider-neutral record. Results without a
    /// `place_id` cannot be deduplicated and are dropped.
    #[must_use]
    pub fn into_record(self) -> Option<RawPlaceRecord> {
        Some(RawPlaceRecord {
            place_id: self.place_id?,
            name: self.name.unwrap_or_default(),
            address: self.vicinity.unwrap_or_default(),
            rating: self.rating,
            location: self.geometry.map(|g| g.location.into()),
        })
    }
}

// ---------------------------------------------------------------------------
// geocode
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct GeocodeResult {
    #[serde(default)]
    pub formatted_address: Option<String>,
    pub geometry: Geometry,
}
