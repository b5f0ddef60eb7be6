use async_trait::async_trait;
use offie_core::{Coordinate, LocationError};
use offie_search::GeolocationProvider;

/// Position supplied on the command line.
///
/// A terminal has no device location, so without `--lat`/`--lng` the
/// provider reports [`LocationError::Unsupported`].
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedLocation(Option<Coordinate>);

impl FixedLocation {
    pub(crate) fn at(lat: f64, lng: f64) -> Self {
        Self(Some(Coordinate::new(lat, lng)))
    }

    pub(crate) fn unknown() -> Self {
        Self(None)
    }
}

#[async_trait]
impl GeolocationProvider for FixedLocation {
    async fn current_location(&self) -> Result<Coordinate, LocationError> {
        self.0.ok_or(LocationError::Unsupported)
    }
}
