use crate::error::CoreError;
use crate::models::{NewTrip, Trip, TripChanges};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub mod query_builder;
pub mod sqlite;

pub use sqlite::SqliteGateway;

/// Half-open-ended range over `scheduled_at`; both bounds inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn from(start: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: None }
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start: Some(start), end: Some(end) }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| at >= s) && self.end.map_or(true, |e| at <= e)
    }
}

/// Selection criteria for [`TripGateway::list`]. Unset fields match anything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripFilter {
    pub parent_id: Option<Uuid>,
    pub is_recurring: Option<bool>,
    pub job_number: Option<String>,
    pub scheduled: Option<DateRange>,
}

impl TripFilter {
    /// Children of a series, selected by the compound `(parent_id, job_number)`
    /// identity. Matching on `parent_id` alone is never used to pick members.
    pub fn children_of(parent: &Trip) -> Self {
        Self {
            parent_id: Some(parent.id),
            job_number: Some(parent.job_number.clone()),
            ..Default::default()
        }
    }

    /// All parents that carry a recurrence rule.
    pub fn recurring_parents() -> Self {
        Self {
            is_recurring: Some(true),
            ..Default::default()
        }
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        self.parent_id.map_or(true, |p| trip.parent_id == Some(p))
            && self.is_recurring.map_or(true, |r| trip.is_recurring == r)
            && self.job_number.as_ref().map_or(true, |j| &trip.job_number == j)
            && self.scheduled.map_or(true, |r| r.contains(trip.scheduled_at))
    }
}

/// Storage contract the series engine runs against.
///
/// Every call is independent; the engine never assumes a transaction spans
/// more than one of them.
#[async_trait]
pub trait TripGateway: Send + Sync {
    /// Persists a trip and returns the id it was assigned.
    async fn create(&self, trip: NewTrip) -> Result<Uuid, CoreError>;
    async fn find(&self, id: Uuid) -> Result<Option<Trip>, CoreError>;
    /// Trips matching `filter`, ordered by `scheduled_at`.
    async fn list(&self, filter: &TripFilter) -> Result<Vec<Trip>, CoreError>;
    async fn update(&self, id: Uuid, changes: &TripChanges) -> Result<Trip, CoreError>;
    async fn delete(&self, id: Uuid) -> Result<(), CoreError>;
}

#[async_trait]
impl<G: TripGateway + ?Sized> TripGateway for std::sync::Arc<G> {
    async fn create(&self, trip: NewTrip) -> Result<Uuid, CoreError> {
        (**self).create(trip).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Trip>, CoreError> {
        (**self).find(id).await
    }

    async fn list(&self, filter: &TripFilter) -> Result<Vec<Trip>, CoreError> {
        (**self).list(filter).await
    }

    async fn update(&self, id: Uuid, changes: &TripChanges) -> Result<Trip, CoreError> {
        (**self).update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        (**self).delete(id).await
    }
}
