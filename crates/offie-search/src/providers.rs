//! Collaborators the search coordinator talks to.
//!
//! Each trait hides a platform or vendor API: device geolocation, address
//! geocoding, nearby place search and result presentation. Implementations
//! are injected into [`crate::SearchCoordinator`] at construction.

use async_trait::async_trait;
use offie_core::{
    CategoryTag, Coordinate, DistanceUnit, GeocodeError, LocationError, ProviderError,
    RawPlaceRecord, SearchError, Shop,
};

use crate::aggregator::CategoryFailure;

/// Resolves the device's current position.
#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    /// # Errors
    ///
    /// - [`LocationError::PermissionDenied`] when the user refused access.
    /// - [`LocationError::Unsupported`] when no location source exists.
    async fn current_location(&self) -> Result<Coordinate, LocationError>;
}

/// Resolves a free-text address to a coordinate.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// # Errors
    ///
    /// - [`GeocodeError::NotFound`] when the address has no match.
    /// - [`GeocodeError::Provider`] on transport or service failure.
    async fn resolve_address(&self, address: &str) -> Result<Coordinate, GeocodeError>;
}

/// Searches for places of one category around a coordinate.
#[async_trait]
pub trait PlaceSearchProvider: Send + Sync {
    /// Returns every matching place; an empty `Vec` is a normal result.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError`] carrying the provider status on failure.
    async fn search_nearby(
        &self,
        center: Coordinate,
        radius_meters: u32,
        category: &CategoryTag,
    ) -> Result<Vec<RawPlaceRecord>, ProviderError>;
}

/// One-way output channel for ranked results and user-facing failures.
pub trait PresentationSink: Send + Sync {
    fn render(&self, ranked: &[Shop], unit: DistanceUnit);

    /// A search was aborted before any results were gathered.
    fn report_error(&self, error: &SearchError);

    /// One category search failed; its siblings keep running.
    fn report_failure(&self, failure: &CategoryFailure);
}
