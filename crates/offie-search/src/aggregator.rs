//! Fan-in of concurrent category searches into one deduplicated collection.
//!
//! A session is opened with the set of categories about to be searched.
//! Every category reports back exactly once, either with a batch of raw
//! records or with a failure. When the last category has reported, the
//! session emits its shops and resets. Reports tagged with an epoch other
//! than the active one are discarded, so a superseded search can never leak
//! results into its successor.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use offie_core::{CategoryTag, Coordinate, DistanceUnit, ProviderError, RawPlaceRecord, Shop};

/// Identifies one aggregation session. Later sessions have larger epochs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionEpoch(u64);

impl std::fmt::Display for SessionEpoch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A category search that failed within a session.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryFailure {
    pub category: CategoryTag,
    pub error: ProviderError,
}

/// Everything a finished session produced.
#[derive(Debug, Clone)]
pub struct CompletedSession {
    pub epoch: SessionEpoch,
    pub origin: Coordinate,
    pub unit: DistanceUnit,
    /// Deduplicated shops in first-seen order.
    pub shops: Vec<Shop>,
    pub failures: Vec<CategoryFailure>,
    pub completed_at: DateTime<Utc>,
}

/// Result of opening a session.
#[derive(Debug)]
pub enum SessionStart {
    /// Searches should be dispatched and reported under this epoch.
    Dispatch(SessionEpoch),
    /// No categories were requested; the session is already complete.
    Complete(CompletedSession),
}

/// Result of reporting one category.
#[derive(Debug)]
pub enum IngestOutcome {
    /// The report belongs to a superseded or finished session and was dropped.
    Stale,
    /// The category was not dispatched in this session or already reported.
    Unexpected,
    /// Accepted; `remaining` categories are still outstanding.
    Pending { remaining: usize },
    /// Accepted and it was the last outstanding category.
    Complete(CompletedSession),
}

#[derive(Debug)]
struct Session {
    epoch: SessionEpoch,
    origin: Coordinate,
    unit: DistanceUnit,
    dispatched: HashSet<CategoryTag>,
    reported: HashSet<CategoryTag>,
    seen: HashSet<String>,
    shops: Vec<Shop>,
    failures: Vec<CategoryFailure>,
}

impl Session {
    fn remaining(&self) -> usize {
        self.dispatched.len() - self.reported.len()
    }
}

#[derive(Debug, Default)]
pub struct ResultAggregator {
    last_epoch: u64,
    session: Option<Session>,
}

impl ResultAggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The epoch of the session currently accepting reports, if any.
    #[must_use]
    pub fn epoch(&self) -> Option<SessionEpoch> {
        self.session.as_ref().map(|s| s.epoch)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Opens a new session, discarding any session still in progress.
    ///
    /// Distances are computed from `origin` in `unit` as records arrive.
    /// Duplicate tags in `categories` are dispatched once.
    pub fn begin_session(
        &mut self,
        categories: &[CategoryTag],
        origin: Coordinate,
        unit: DistanceUnit,
    ) -> SessionStart {
        if let Some(previous) = self.session.take() {
            tracing::debug!(
                epoch = %previous.epoch,
                remaining = previous.remaining(),
                "superseding incomplete aggregation session"
            );
        }

        self.last_epoch += 1;
        let epoch = SessionEpoch(self.last_epoch);
        let session = Session {
            epoch,
            origin,
            unit,
            dispatched: categories.iter().cloned().collect(),
            reported: HashSet::new(),
            seen: HashSet::new(),
            shops: Vec::new(),
            failures: Vec::new(),
        };

        if session.dispatched.is_empty() {
            tracing::info!(%epoch, "no categories configured; session completes empty");
            return SessionStart::Complete(finish(session));
        }

        tracing::debug!(
            %epoch,
            categories = session.dispatched.len(),
            "aggregation session started"
        );
        self.session = Some(session);
        SessionStart::Dispatch(epoch)
    }

    /// Drops the active session without completing it. Reports for it are
    /// `Stale` from now on. Returns the abandoned epoch, if there was one.
    pub fn abandon(&mut self) -> Option<SessionEpoch> {
        let session = self.session.take()?;
        tracing::debug!(
            epoch = %session.epoch,
            remaining = session.remaining(),
            "aggregation session abandoned"
        );
        Some(session.epoch)
    }

    /// Records a successful category search.
    ///
    /// Records whose `place_id` was already seen in this session are dropped,
    /// keeping the first copy. Records without a location are skipped.
    pub fn ingest(
        &mut self,
        epoch: SessionEpoch,
        category: &CategoryTag,
        records: Vec<RawPlaceRecord>,
    ) -> IngestOutcome {
        let Some(session) = self.accept(epoch, category) else {
            return self.rejection(epoch);
        };

        let mut added = 0usize;
        for record in records {
            if session.seen.contains(&record.place_id) {
                tracing::trace!(place_id = %record.place_id, %category, "duplicate place dropped");
                continue;
            }
            let place_id = record.place_id.clone();
            match Shop::from_raw(record, session.origin, session.unit) {
                Some(shop) => {
                    session.seen.insert(place_id);
                    session.shops.push(shop);
                    added += 1;
                }
                None => {
                    tracing::debug!(%place_id, %category, "place without location skipped");
                }
            }
        }

        tracing::debug!(%epoch, %category, added, "category results ingested");
        self.advance()
    }

    /// Records a failed category search. It still counts towards completion.
    pub fn ingest_failure(
        &mut self,
        epoch: SessionEpoch,
        category: &CategoryTag,
        error: ProviderError,
    ) -> IngestOutcome {
        let Some(session) = self.accept(epoch, category) else {
            return self.rejection(epoch);
        };

        tracing::warn!(%epoch, %category, error = %error, "category search failed");
        session.failures.push(CategoryFailure {
            category: category.clone(),
            error,
        });
        self.advance()
    }

    /// Marks `category` reported if the report is valid for the active session.
    fn accept(&mut self, epoch: SessionEpoch, category: &CategoryTag) -> Option<&mut Session> {
        let session = self.session.as_mut().filter(|s| s.epoch == epoch)?;
        if !session.dispatched.contains(category) || !session.reported.insert(category.clone()) {
            return None;
        }
        Some(session)
    }

    fn rejection(&self, epoch: SessionEpoch) -> IngestOutcome {
        if self.epoch() == Some(epoch) {
            tracing::warn!(%epoch, "unexpected or repeated category report ignored");
            IngestOutcome::Unexpected
        } else {
            tracing::debug!(%epoch, active = ?self.epoch(), "stale category report discarded");
            IngestOutcome::Stale
        }
    }

    fn advance(&mut self) -> IngestOutcome {
        let remaining = self.session.as_ref().map_or(0, Session::remaining);
        if remaining > 0 {
            return IngestOutcome::Pending { remaining };
        }
        match self.session.take() {
            Some(session) => IngestOutcome::Complete(finish(session)),
            None => IngestOutcome::Stale,
        }
    }
}

fn finish(session: Session) -> CompletedSession {
    tracing::info!(
        epoch = %session.epoch,
        shops = session.shops.len(),
        failures = session.failures.len(),
        "aggregation session complete"
    );
    CompletedSession {
        epoch: session.epoch,
        origin: session.origin,
        unit: session.unit,
        shops: session.shops,
        failures: session.failures,
        completed_at: Utc::now(),
    }
}
