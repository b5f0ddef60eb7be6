//! Location resolution, category fan-out and result delivery.
//!
//! The coordinator is driven by search requests. Each request takes a fresh
//! request token; a request whose token is no longer current when its
//! location resolves is abandoned, and category results for a superseded
//! aggregation session are discarded by epoch. In-flight provider calls are
//! never cancelled, only ignored.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{FuturesUnordered, StreamExt};
use offie_core::{
    rank, CategoryTag, Coordinate, DistanceUnit, SearchError, SearchSettings, Shop, SortKey,
};
use tokio::sync::Mutex;

use crate::aggregator::{
    CategoryFailure, CompletedSession, IngestOutcome, ResultAggregator, SessionEpoch, SessionStart,
};
use crate::providers::{
    GeocodingProvider, GeolocationProvider, PlaceSearchProvider, PresentationSink,
};

/// Where the coordinator is in its search lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Resolving,
    Searching,
    Aggregating,
    Done,
    Errored,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::Resolving => "resolving",
            Phase::Searching => "searching",
            Phase::Aggregating => "aggregating",
            Phase::Done => "done",
            Phase::Errored => "errored",
        };
        f.write_str(name)
    }
}

/// Ranked output of one completed search.
#[derive(Debug, Clone)]
pub struct RankedResults {
    pub epoch: SessionEpoch,
    pub origin: Coordinate,
    pub unit: DistanceUnit,
    pub sort_key: SortKey,
    pub shops: Vec<Shop>,
    pub failures: Vec<CategoryFailure>,
    /// When the last category reported back.
    pub completed_at: DateTime<Utc>,
}

/// How a search request ended, when it did not fail.
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Completed(RankedResults),
    /// A newer request took over before this one finished.
    Superseded,
}

impl SearchOutcome {
    #[must_use]
    pub fn completed(self) -> Option<RankedResults> {
        match self {
            SearchOutcome::Completed(results) => Some(results),
            SearchOutcome::Superseded => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct RequestToken(u64);

struct CoordinatorState {
    phase: Phase,
    current_request: u64,
    settings: SearchSettings,
    aggregator: ResultAggregator,
    last_results: Option<CompletedSession>,
}

pub struct SearchCoordinator {
    geolocation: Arc<dyn GeolocationProvider>,
    geocoder: Arc<dyn GeocodingProvider>,
    places: Arc<dyn PlaceSearchProvider>,
    sink: Arc<dyn PresentationSink>,
    state: Mutex<CoordinatorState>,
}

impl SearchCoordinator {
    pub fn new(
        geolocation: Arc<dyn GeolocationProvider>,
        geocoder: Arc<dyn GeocodingProvider>,
        places: Arc<dyn PlaceSearchProvider>,
        sink: Arc<dyn PresentationSink>,
        settings: SearchSettings,
    ) -> Self {
        Self {
            geolocation,
            geocoder,
            places,
            sink,
            state: Mutex::new(CoordinatorState {
                phase: Phase::Idle,
                current_request: 0,
                settings,
                aggregator: ResultAggregator::new(),
                last_results: None,
            }),
        }
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase
    }

    pub async fn settings(&self) -> SearchSettings {
        self.state.lock().await.settings.clone()
    }

    /// Unit used for the next search. Results already shown keep their unit.
    pub async fn set_unit(&self, unit: DistanceUnit) {
        self.state.lock().await.settings.unit = unit;
    }

    /// Shops of the most recent completed search, in first-seen order.
    pub async fn last_results(&self) -> Option<Vec<Shop>> {
        self.state
            .lock()
            .await
            .last_results
            .as_ref()
            .map(|s| s.shops.clone())
    }

    /// Searches around the device's current position.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::LocationUnavailable`] when the position cannot
    /// be obtained. The error is also reported to the sink.
    pub async fn search_by_location(&self) -> Result<SearchOutcome, SearchError> {
        let token = self.start_request("location").await;
        let resolved = self
            .geolocation
            .current_location()
            .await
            .map_err(SearchError::from);
        self.continue_search(token, resolved).await
    }

    /// Geocodes `address` and searches around it.
    ///
    /// # Errors
    ///
    /// - [`SearchError::EmptyAddress`] for blank input; no provider is called.
    /// - [`SearchError::AddressNotFound`] when geocoding finds nothing.
    /// - [`SearchError::Provider`] when the geocoder fails.
    ///
    /// Every error is also reported to the sink.
    pub async fn search_by_address(&self, address: &str) -> Result<SearchOutcome, SearchError> {
        let address = address.trim();
        if address.is_empty() {
            let err = SearchError::EmptyAddress;
            self.sink.report_error(&err);
            return Err(err);
        }

        let token = self.start_request("address").await;
        let resolved = self
            .geocoder
            .resolve_address(address)
            .await
            .map_err(SearchError::from);
        self.continue_search(token, resolved).await
    }

    /// Re-ranks the last completed results by `key` and renders them again.
    ///
    /// The key also applies to future searches. Returns `None` when no search
    /// has completed yet.
    pub async fn resort(&self, key: SortKey) -> Option<Vec<Shop>> {
        let (ranked, unit) = {
            let mut state = self.state.lock().await;
            state.settings.sort_key = key;
            let last = state.last_results.as_ref()?;
            (rank(&last.shops, key), last.unit)
        };
        tracing::debug!(sort = %key, shops = ranked.len(), "re-rendering with new sort");
        self.sink.render(&ranked, unit);
        Some(ranked)
    }

    async fn start_request(&self, kind: &'static str) -> RequestToken {
        let mut state = self.state.lock().await;
        state.current_request += 1;
        // Late reports from the previous request must not complete while
        // this one is still resolving.
        let abandoned = state.aggregator.abandon();
        if abandoned.is_some()
            || matches!(
                state.phase,
                Phase::Resolving | Phase::Searching | Phase::Aggregating
            )
        {
            tracing::info!(
                request = state.current_request,
                previous_phase = %state.phase,
                abandoned_session = ?abandoned,
                "new search supersedes the one in progress"
            );
        }
        state.phase = Phase::Resolving;
        tracing::debug!(request = state.current_request, kind, "resolving location");
        RequestToken(state.current_request)
    }

    async fn continue_search(
        &self,
        token: RequestToken,
        resolved: Result<Coordinate, SearchError>,
    ) -> Result<SearchOutcome, SearchError> {
        let mut state = self.state.lock().await;
        if state.current_request != token.0 {
            tracing::debug!(request = token.0, "resolution finished after being superseded");
            return Ok(SearchOutcome::Superseded);
        }

        let origin = match resolved {
            Ok(origin) => origin,
            Err(err) => {
                state.phase = Phase::Errored;
                tracing::warn!(request = token.0, error = %err, "location resolution failed");
                self.sink.report_error(&err);
                state.phase = Phase::Idle;
                return Err(err);
            }
        };

        let settings = state.settings.clone();
        let epoch = match state
            .aggregator
            .begin_session(&settings.categories, origin, settings.unit)
        {
            SessionStart::Dispatch(epoch) => epoch,
            SessionStart::Complete(session) => {
                return Ok(self.deliver(&mut state, token, session));
            }
        };
        state.phase = Phase::Searching;
        drop(state);

        tracing::info!(
            %epoch,
            %origin,
            radius_meters = settings.radius_meters,
            categories = settings.categories.len(),
            "dispatching category searches"
        );
        Ok(self
            .gather(token, epoch, origin, settings.radius_meters, &settings.categories)
            .await)
    }

    /// Runs every category search concurrently and feeds completions to the
    /// aggregator in arrival order.
    async fn gather(
        &self,
        token: RequestToken,
        epoch: SessionEpoch,
        origin: Coordinate,
        radius_meters: u32,
        categories: &[CategoryTag],
    ) -> SearchOutcome {
        let mut in_flight: FuturesUnordered<_> = categories
            .iter()
            .map(|category| {
                let places = Arc::clone(&self.places);
                async move {
                    let result = places.search_nearby(origin, radius_meters, category).await;
                    (category, result)
                }
            })
            .collect();

        let mut outcome = SearchOutcome::Superseded;
        while let Some((category, result)) = in_flight.next().await {
            let mut state = self.state.lock().await;
            let ingested = match result {
                Ok(records) => {
                    tracing::debug!(
                        %epoch,
                        %category,
                        count = records.len(),
                        "category search returned"
                    );
                    state.aggregator.ingest(epoch, category, records)
                }
                Err(error) => {
                    let failure = CategoryFailure {
                        category: category.clone(),
                        error: error.clone(),
                    };
                    let ingested = state.aggregator.ingest_failure(epoch, category, error);
                    if !matches!(ingested, IngestOutcome::Stale) {
                        self.sink.report_failure(&failure);
                    }
                    ingested
                }
            };

            match ingested {
                IngestOutcome::Stale | IngestOutcome::Unexpected => {}
                IngestOutcome::Pending { remaining } => {
                    state.phase = Phase::Aggregating;
                    tracing::trace!(%epoch, remaining, "waiting for categories");
                }
                IngestOutcome::Complete(session) => {
                    outcome = self.deliver(&mut state, token, session);
                }
            }
        }
        outcome
    }

    /// Ranks a completed session, hands it to the sink and returns to idle.
    fn deliver(
        &self,
        state: &mut CoordinatorState,
        token: RequestToken,
        session: CompletedSession,
    ) -> SearchOutcome {
        if state.current_request != token.0 {
            tracing::debug!(
                epoch = %session.epoch,
                "completed session belongs to a superseded request"
            );
            return SearchOutcome::Superseded;
        }
        state.phase = Phase::Done;
        let sort_key = state.settings.sort_key;
        let ranked = rank(&session.shops, sort_key);

        self.sink.render(&ranked, session.unit);
        tracing::info!(
            epoch = %session.epoch,
            shops = ranked.len(),
            failures = session.failures.len(),
            sort = %sort_key,
            completed_at = %session.completed_at,
            "search complete"
        );

        let results = RankedResults {
            epoch: session.epoch,
            origin: session.origin,
            unit: session.unit,
            sort_key,
            shops: ranked,
            failures: session.failures.clone(),
            completed_at: session.completed_at,
        };
        state.last_results = Some(session);
        state.phase = Phase::Idle;
        SearchOutcome::Completed(results)
    }
}
