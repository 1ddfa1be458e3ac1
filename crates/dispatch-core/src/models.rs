use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::{CoreError, SafetyLimitExceeded};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TripStatus {
    Scheduled,
    Assigned,
    InProgress,
    Completed,
    Cancelled,
}

impl std::fmt::Display for TripStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TripStatus::Scheduled => write!(f, "scheduled"),
            TripStatus::Assigned => write!(f, "assigned"),
            TripStatus::InProgress => write!(f, "in_progress"),
            TripStatus::Completed => write!(f, "completed"),
            TripStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid trip status: {0}")]
pub struct ParseTripStatusError(String);

impl FromStr for TripStatus {
    type Err = ParseTripStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "scheduled" => Ok(TripStatus::Scheduled),
            "assigned" => Ok(TripStatus::Assigned),
            "in_progress" | "in-progress" | "active" => Ok(TripStatus::InProgress),
            "completed" | "done" => Ok(TripStatus::Completed),
            "cancelled" | "canceled" => Ok(TripStatus::Cancelled),
            _ => Err(ParseTripStatusError(s.to_string())),
        }
    }
}

/// How far apart consecutive trips of a series are.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum RecurrencePattern {
    Daily,
    Weekly,
    Monthly,
}

impl std::fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecurrencePattern::Daily => write!(f, "daily"),
            RecurrencePattern::Weekly => write!(f, "weekly"),
            RecurrencePattern::Monthly => write!(f, "monthly"),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Unknown recurrence pattern: {0}")]
pub struct ParseRecurrencePatternError(String);

impl FromStr for RecurrencePattern {
    type Err = ParseRecurrencePatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" | "day" => Ok(RecurrencePattern::Daily),
            "weekly" | "week" => Ok(RecurrencePattern::Weekly),
            "monthly" | "month" => Ok(RecurrencePattern::Monthly),
            _ => Err(ParseRecurrencePatternError(s.to_string())),
        }
    }
}

impl From<ParseRecurrencePatternError> for CoreError {
    fn from(err: ParseRecurrencePatternError) -> Self {
        CoreError::Validation(err.to_string())
    }
}

/// One scheduled trip.
///
/// A series is one parent (`is_recurring = true`, carrying the recurrence
/// fields) plus children that point back at it through `parent_id` and share
/// its `job_number`. Standalone trips have neither.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
pub struct Trip {
    pub id: Uuid,
    pub is_recurring: bool,
    pub parent_id: Option<Uuid>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    /// Inclusive: trips on this calendar day are still generated.
    pub recurrence_end_date: Option<NaiveDate>,
    pub scheduled_at: DateTime<Utc>,
    /// The rule slot a series member was generated for. Rescheduling moves
    /// `scheduled_at` only, so the extender resumes from the rule's grid.
    /// `None` on standalone trips.
    pub occurrence_at: Option<DateTime<Utc>>,
    /// Flight or job number. Together with `parent_id` this decides series membership.
    pub job_number: String,
    pub customer_name: String,
    pub driver: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub passenger_count: u32,
    pub status: TripStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    /// True for the anchor of a series that is still generating children.
    #[inline]
    pub fn is_series_parent(&self) -> bool {
        self.is_recurring && self.parent_id.is_none()
    }

    #[inline]
    pub fn is_child(&self) -> bool {
        self.parent_id.is_some()
    }
}

/// Everything the gateway needs to persist a trip; the id and timestamps are
/// assigned on create.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTrip {
    pub is_recurring: bool,
    pub parent_id: Option<Uuid>,
    pub recurrence_pattern: Option<RecurrencePattern>,
    pub recurrence_end_date: Option<NaiveDate>,
    pub scheduled_at: DateTime<Utc>,
    pub occurrence_at: Option<DateTime<Utc>>,
    pub job_number: String,
    pub customer_name: String,
    pub driver: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub passenger_count: u32,
    pub status: TripStatus,
    pub notes: Option<String>,
}

/// Blank payload at the Unix epoch; callers always set `scheduled_at`.
impl Default for NewTrip {
    fn default() -> Self {
        Self {
            is_recurring: false,
            parent_id: None,
            recurrence_pattern: None,
            recurrence_end_date: None,
            scheduled_at: DateTime::<Utc>::default(),
            occurrence_at: None,
            job_number: String::new(),
            customer_name: String::new(),
            driver: None,
            pickup_location: String::new(),
            dropoff_location: String::new(),
            passenger_count: 1,
            status: TripStatus::Scheduled,
            notes: None,
        }
    }
}

impl From<&Trip> for NewTrip {
    fn from(trip: &Trip) -> Self {
        Self {
            is_recurring: trip.is_recurring,
            parent_id: trip.parent_id,
            recurrence_pattern: trip.recurrence_pattern,
            recurrence_end_date: trip.recurrence_end_date,
            scheduled_at: trip.scheduled_at,
            occurrence_at: trip.occurrence_at,
            job_number: trip.job_number.clone(),
            customer_name: trip.customer_name.clone(),
            driver: trip.driver.clone(),
            pickup_location: trip.pickup_location.clone(),
            dropoff_location: trip.dropoff_location.clone(),
            passenger_count: trip.passenger_count,
            status: trip.status,
            notes: trip.notes.clone(),
        }
    }
}

impl NewTrip {
    /// A generated child of `parent` at `scheduled_at`, payload copied.
    pub fn child_of(parent: &Trip, scheduled_at: DateTime<Utc>) -> Self {
        NewTrip::from(parent).child(parent.id, scheduled_at)
    }

    /// This record's payload as a child of `parent_id` at `scheduled_at`.
    pub fn child(&self, parent_id: Uuid, scheduled_at: DateTime<Utc>) -> Self {
        Self {
            is_recurring: false,
            parent_id: Some(parent_id),
            recurrence_pattern: None,
            recurrence_end_date: None,
            scheduled_at,
            occurrence_at: Some(scheduled_at),
            ..self.clone()
        }
    }
}

/// Definition of a new recurring series: the anchor trip plus its rule.
#[derive(Debug, Clone)]
pub struct NewSeriesData {
    /// The parent trip's own date; children start one pattern unit later.
    pub scheduled_at: DateTime<Utc>,
    pub pattern: RecurrencePattern,
    pub end_date: NaiveDate,
    pub job_number: String,
    pub customer_name: String,
    pub driver: Option<String>,
    pub pickup_location: String,
    pub dropoff_location: String,
    pub passenger_count: u32,
    pub notes: Option<String>,
}

impl Default for NewSeriesData {
    fn default() -> Self {
        let epoch = DateTime::<Utc>::default();
        Self {
            scheduled_at: epoch,
            pattern: RecurrencePattern::Daily,
            end_date: epoch.date_naive(),
            job_number: String::new(),
            customer_name: String::new(),
            driver: None,
            pickup_location: String::new(),
            dropoff_location: String::new(),
            passenger_count: 1,
            notes: None,
        }
    }
}

impl NewSeriesData {
    pub(crate) fn parent_record(&self) -> NewTrip {
        NewTrip {
            is_recurring: true,
            parent_id: None,
            recurrence_pattern: Some(self.pattern),
            recurrence_end_date: Some(self.end_date),
            scheduled_at: self.scheduled_at,
            occurrence_at: Some(self.scheduled_at),
            job_number: self.job_number.clone(),
            customer_name: self.customer_name.clone(),
            driver: self.driver.clone(),
            pickup_location: self.pickup_location.clone(),
            dropoff_location: self.dropoff_location.clone(),
            passenger_count: self.passenger_count,
            status: if self.driver.is_some() {
                TripStatus::Assigned
            } else {
                TripStatus::Scheduled
            },
            notes: self.notes.clone(),
        }
    }
}

/// Partial update of a trip. `None` leaves a field alone; `Some(None)` clears
/// a nullable one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TripChanges {
    pub customer_name: Option<String>,
    pub driver: Option<Option<String>>,
    pub pickup_location: Option<String>,
    pub dropoff_location: Option<String>,
    pub passenger_count: Option<u32>,
    pub status: Option<TripStatus>,
    pub notes: Option<Option<String>>,
    pub job_number: Option<String>,
    pub scheduled_at: Option<DateTime<Utc>>,
    pub is_recurring: Option<bool>,
    pub recurrence_pattern: Option<Option<RecurrencePattern>>,
    pub recurrence_end_date: Option<Option<NaiveDate>>,
    /// Series linkage. Written by the lifecycle code only, never by user edits.
    pub parent_id: Option<Option<Uuid>>,
}

impl TripChanges {
    /// Clears the recurrence rule on a parent.
    pub fn stop_recurrence() -> Self {
        Self {
            is_recurring: Some(false),
            recurrence_pattern: Some(None),
            recurrence_end_date: Some(None),
            ..Default::default()
        }
    }

    /// Detaches a child from its series.
    pub fn detach() -> Self {
        Self {
            parent_id: Some(None),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn touches_recurrence(&self) -> bool {
        self.is_recurring.is_some()
            || self.recurrence_pattern.is_some()
            || self.recurrence_end_date.is_some()
    }

    /// The same changes with the recurrence and linkage fields dropped.
    pub fn payload_only(&self) -> Self {
        Self {
            is_recurring: None,
            recurrence_pattern: None,
            recurrence_end_date: None,
            parent_id: None,
            ..self.clone()
        }
    }

    /// Whether these changes switch recurrence off, and how.
    ///
    /// The two ways of saying "stop recurring" stay distinct: an explicit
    /// `is_recurring = false`, or clearing the pattern while leaving
    /// `is_recurring` unset.
    pub fn cancellation_trigger(&self) -> Option<CancellationTrigger> {
        match (self.is_recurring, &self.recurrence_pattern) {
            (Some(false), _) => Some(CancellationTrigger::ExplicitlyDisabled),
            (None, Some(None)) => Some(CancellationTrigger::PatternCleared),
            _ => None,
        }
    }
}

/// Which edit switched recurrence off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CancellationTrigger {
    /// `is_recurring` was explicitly set to false.
    ExplicitlyDisabled,
    /// The pattern was cleared and `is_recurring` left unset.
    PatternCleared,
}

impl std::fmt::Display for CancellationTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationTrigger::ExplicitlyDisabled => write!(f, "recurrence disabled"),
            CancellationTrigger::PatternCleared => write!(f, "pattern cleared"),
        }
    }
}

/// Breadth of an edit or cancellation across a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EditScope {
    /// Only the selected trip
    Single,
    /// The selected trip and every member scheduled at or after it
    ThisAndFuture,
    /// Every member of the series, parent included
    All,
}

impl std::fmt::Display for EditScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditScope::Single => write!(f, "single"),
            EditScope::ThisAndFuture => write!(f, "future"),
            EditScope::All => write!(f, "all"),
        }
    }
}

impl FromStr for EditScope {
    type Err = ParseEditScopeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "this" | "occurrence" => Ok(EditScope::Single),
            "future" | "this_and_future" | "this-and-future" => Ok(EditScope::ThisAndFuture),
            "all" | "series" | "entire" => Ok(EditScope::All),
            _ => Err(ParseEditScopeError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid edit scope: {0}")]
pub struct ParseEditScopeError(String);

// ============================================================================
// Operation summaries
// ============================================================================

/// Success/failure tally of a batch of independent writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn attempted(&self) -> usize {
        self.succeeded + self.failed
    }

    pub(crate) fn record<T>(&mut self, result: &Result<T, CoreError>) {
        match result {
            Ok(_) => self.succeeded += 1,
            Err(_) => self.failed += 1,
        }
    }

    /// Fails with `ZeroResult` when something was attempted and nothing stuck.
    pub fn ensure_any_succeeded(&self, operation: &str) -> Result<(), CoreError> {
        if self.attempted() > 0 && self.succeeded == 0 {
            return Err(CoreError::ZeroResult {
                operation: operation.to_string(),
                attempted: self.attempted(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesCreated {
    pub parent_id: Uuid,
    /// Children that were persisted.
    pub child_count: usize,
    pub failed: usize,
    /// Set when the expansion was cut short by the iteration cap.
    pub truncated: Option<SafetyLimitExceeded>,
}

/// What a cascading cancellation will touch, computed before anything is deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BlastRadius {
    pub parent_id: Uuid,
    pub scope: EditScope,
    pub job_number: String,
    /// Children that will be hard-deleted, in schedule order.
    pub trip_ids: Vec<Uuid>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
    /// A child that survives the cancellation as a standalone trip.
    pub detached: Option<Uuid>,
}

impl BlastRadius {
    #[inline]
    pub fn affected(&self) -> usize {
        self.trip_ids.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.trip_ids.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CancellationSummary {
    pub deleted: usize,
    pub failed: usize,
    pub blast_radius: BlastRadius,
    /// `None` when the cancellation was requested directly rather than detected in an edit.
    pub trigger: Option<CancellationTrigger>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EditOutcome {
    Updated(BatchSummary),
    Cancelled(CancellationSummary),
}

/// A parent and its children, ordered by schedule.
#[derive(Debug, Clone)]
pub struct SeriesView {
    pub parent: Trip,
    pub children: Vec<Trip>,
}

impl SeriesView {
    /// Parent plus children.
    pub fn trip_count(&self) -> usize {
        self.children.len() + 1
    }

    /// The latest rule slot already taken by a member. Rescheduled members
    /// count at their original slot.
    pub fn last_occurrence(&self) -> DateTime<Utc> {
        std::iter::once(&self.parent)
            .chain(&self.children)
            .map(|t| t.occurrence_at.unwrap_or(t.scheduled_at))
            .max()
            .unwrap_or(self.parent.scheduled_at)
    }
}

/// Tunables for generation and materialization.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct SeriesConfig {
    /// Rolling window, in days from now, that extension keeps populated
    pub lookahead_days: u32,
    /// Delay between consecutive trip creates, in milliseconds
    pub pacing_ms: u64,
    /// Iteration cap for a single expansion
    pub max_expansions: usize,
}

impl Default for SeriesConfig {
    fn default() -> Self {
        Self {
            lookahead_days: 30,
            pacing_ms: 100,
            max_expansions: crate::recurrence::DEFAULT_MAX_EXPANSIONS,
        }
    }
}

impl SeriesConfig {
    pub fn lookahead(&self) -> chrono::Duration {
        chrono::Duration::days(i64::from(self.lookahead_days))
    }

    pub fn pacing(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.pacing_ms)
    }
}
