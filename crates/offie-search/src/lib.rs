//! Search orchestration for nearby storefronts.
//!
//! [`SearchCoordinator`] resolves a search origin, fans one nearby search out
//! per category through a [`PlaceSearchProvider`], and folds the answers into
//! a [`ResultAggregator`] session that completes exactly once.

pub mod aggregator;
pub mod coordinator;
pub mod providers;

pub use aggregator::{
    CategoryFailure, CompletedSession, IngestOutcome, ResultAggregator, SessionEpoch, SessionStart,
};
pub use coordinator::{Phase, RankedResults, SearchCoordinator, SearchOutcome};
pub use providers::{GeocodingProvider, GeolocationProvider, PlaceSearchProvider, PresentationSink};
