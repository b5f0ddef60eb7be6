//! Google Maps adapter for the shop locator.
//!
//! [`GoogleMapsClient`] implements [`offie_search::GeocodingProvider`] and
//! [`offie_search::PlaceSearchProvider`] on top of the Geocoding and Places
//! Nearby Search web services.

pub mod client;
pub mod error;
pub mod maps_url;
pub(crate) mod retry;
pub mod types;

pub use client::GoogleMapsClient;
pub use error::PlacesError;
pub use maps_url::maps_url;
