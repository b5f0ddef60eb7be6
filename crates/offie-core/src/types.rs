use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::distance::distance;

/// A WGS84 latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6},{:.6}", self.lat, self.lng)
    }
}

/// Unit used when annotating shops with their distance from the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DistanceUnit {
    Kilometres,
    #[default]
    Miles,
}

impl DistanceUnit {
    /// Short label used after a distance value, e.g. `"km"`.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            DistanceUnit::Kilometres => "km",
            DistanceUnit::Miles => "miles",
        }
    }
}

impl fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DistanceUnit::Kilometres => write!(f, "kilometres"),
            DistanceUnit::Miles => write!(f, "miles"),
        }
    }
}

impl FromStr for DistanceUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "km" | "kilometres" | "kilometers" => Ok(DistanceUnit::Kilometres),
            "mi" | "miles" => Ok(DistanceUnit::Miles),
            other => Err(format!(
                "unknown distance unit '{other}'; expected miles or kilometres"
            )),
        }
    }
}

/// Ordering applied to an aggregated result collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    #[default]
    Distance,
    Rating,
    Name,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Distance => write!(f, "distance"),
            SortKey::Rating => write!(f, "rating"),
            SortKey::Name => write!(f, "name"),
        }
    }
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "distance" => Ok(SortKey::Distance),
            "rating" => Ok(SortKey::Rating),
            "name" => Ok(SortKey::Name),
            other => Err(format!(
                "unknown sort key '{other}'; expected distance, rating or name"
            )),
        }
    }
}

/// A place type used to partition nearby searches, e.g. `gas_station`.
///
/// The set of tags is configuration; see [`crate::load_categories`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryTag(String);

impl CategoryTag {
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One place record as returned by a Place Search Provider, before dedup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawPlaceRecord {
    /// Provider-assigned identifier, unique per place.
    pub place_id: String,
    pub name: String,
    /// Free-form address (the provider's "vicinity").
    pub address: String,
    pub rating: Option<f64>,
    pub location: Option<Coordinate>,
}

/// A deduplicated, distance-annotated place.
///
/// Created once at ingestion and never mutated afterwards; ranking produces
/// new orderings of cloned values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shop {
    pub place_id: String,
    pub name: String,
    pub address: String,
    pub location: Option<Coordinate>,
    /// `None` means the provider had no rating for this place.
    pub rating: Option<f64>,
    /// Distance from the user in the unit active when the shop was ingested.
    pub distance_from_user: f64,
}

impl Shop {
    /// Builds a shop from a raw record, computing its distance from `origin`.
    ///
    /// Returns `None` when the record carries no location, since such a
    /// record cannot be distance-annotated.
    #[must_use]
    pub fn from_raw(raw: RawPlaceRecord, origin: Coordinate, unit: DistanceUnit) -> Option<Self> {
        let location = raw.location?;
        Some(Self {
            distance_from_user: distance(origin, location, unit),
            place_id: raw.place_id,
            name: raw.name,
            address: raw.address,
            location: Some(location),
            rating: raw.rating,
        })
    }
}

/// User-facing search parameters shared by every session the coordinator runs.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchSettings {
    pub categories: Vec<CategoryTag>,
    pub radius_meters: u32,
    pub unit: DistanceUnit,
    pub sort_key: SortKey,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            categories: crate::categories::default_categories(),
            radius_meters: 1000,
            unit: DistanceUnit::default(),
            sort_key: SortKey::default(),
        }
    }
}

impl SearchSettings {
    /// Settings derived from the loaded application config and category set.
    #[must_use]
    pub fn from_config(config: &crate::AppConfig, categories: Vec<CategoryTag>) -> Self {
        Self {
            categories,
            radius_meters: config.search_radius_meters,
            unit: config.units,
            sort_key: config.sort,
        }
    }
}
