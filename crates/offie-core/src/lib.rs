//! Core value types and pure logic for the offie shop locator.
//!
//! Everything in this crate is free of network I/O: the place model, the
//! great-circle distance calculator, the result ranker, the error taxonomy
//! and configuration loading.

pub mod app_config;
pub mod categories;
pub mod config;
pub mod distance;
pub mod error;
pub mod rank;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use categories::{default_categories, load_categories, CategoriesFile};
pub use config::{load_app_config, load_app_config_from_env};
pub use distance::{distance, EARTH_RADIUS_KM, MILES_PER_KM};
pub use error::{ConfigError, GeocodeError, LocationError, ProviderError, SearchError};
pub use rank::rank;
pub use types::{
    CategoryTag, Coordinate, DistanceUnit, RawPlaceRecord, SearchSettings, Shop, SortKey,
};
