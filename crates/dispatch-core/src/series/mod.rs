use crate::clock::{Clock, SystemClock};
use crate::error::CoreError;
use crate::gateway::{TripFilter, TripGateway};
use crate::models::{
    BatchSummary, BlastRadius, CancellationSummary, EditOutcome, EditScope, NewSeriesData,
    NewTrip, SeriesConfig, SeriesCreated, SeriesView, Trip, TripChanges,
};
use crate::recurrence::OccurrenceExpander;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

pub mod generation;
pub mod lifecycle;
pub mod materialization;

/// Creates a series: the parent first, then one child per expanded date.
#[async_trait]
pub trait SeriesGenerator {
    async fn create_series(&self, seed: NewSeriesData) -> Result<SeriesCreated, CoreError>;
}

/// Keeps every live series populated up to a rolling horizon.
#[async_trait]
pub trait WindowExtender {
    /// Appends children after each series' last persisted trip, up to
    /// `now + lookahead` or the series end, whichever is first.
    async fn extend_all(&self, lookahead: Duration) -> Result<BTreeMap<Uuid, BatchSummary>, CoreError>;
    /// `extend_all` with the configured lookahead.
    async fn extend_default(&self) -> Result<BTreeMap<Uuid, BatchSummary>, CoreError>;
}

/// Scoped edits and cancellations over an existing series.
#[async_trait]
pub trait LifecycleMutator {
    async fn series_members(&self, target_id: Uuid) -> Result<SeriesView, CoreError>;
    /// What `cancel_scoped` would delete. Performs no writes.
    async fn preview_cancel(&self, target_id: Uuid, scope: EditScope) -> Result<BlastRadius, CoreError>;
    /// `Some` when `edit_scoped` with these changes would cascade into a cancellation.
    async fn preview_edit(
        &self,
        target_id: Uuid,
        scope: EditScope,
        changes: &TripChanges,
    ) -> Result<Option<BlastRadius>, CoreError>;
    async fn edit_scoped(
        &self,
        target_id: Uuid,
        scope: EditScope,
        changes: TripChanges,
    ) -> Result<EditOutcome, CoreError>;
    async fn cancel_scoped(&self, target_id: Uuid, scope: EditScope) -> Result<CancellationSummary, CoreError>;
}

/// Everything the host drives, in one bound.
pub trait Dispatcher: SeriesGenerator + WindowExtender + LifecycleMutator {}

/// Host-side confirmation of a cascading delete.
///
/// The core never calls this; the host asks it after `preview_cancel` /
/// `preview_edit` and only then commits.
pub trait ConfirmationPort {
    fn confirm(&self, radius: &BlastRadius) -> bool;
}

/// Confirms everything (scripts, `--yes`).
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

impl ConfirmationPort for AutoConfirm {
    fn confirm(&self, _radius: &BlastRadius) -> bool {
        true
    }
}

/// The series engine, wired to a gateway and a clock.
pub struct SeriesService<G, C = SystemClock> {
    gateway: G,
    clock: C,
    config: SeriesConfig,
}

impl<G: TripGateway> SeriesService<G, SystemClock> {
    pub fn with_system_clock(gateway: G, config: SeriesConfig) -> Self {
        Self::new(gateway, SystemClock, config)
    }
}

impl<G: TripGateway, C: Clock> SeriesService<G, C> {
    pub fn new(gateway: G, clock: C, config: SeriesConfig) -> Self {
        Self { gateway, clock, config }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn config(&self) -> &SeriesConfig {
        &self.config
    }

    pub(crate) fn expander(&self) -> OccurrenceExpander {
        OccurrenceExpander::new(self.config.max_expansions)
    }

    /// Backs off between consecutive writes so the backend isn't hammered.
    pub(crate) async fn pace(&self) {
        let pacing = self.config.pacing();
        if !pacing.is_zero() {
            tokio::time::sleep(pacing).await;
        }
    }

    /// Creates one child of `parent_id` per date, one at a time. Failures are
    /// logged and counted; they never stop the batch.
    pub(crate) async fn persist_children(
        &self,
        parent_id: Uuid,
        template: &NewTrip,
        dates: &[DateTime<Utc>],
    ) -> BatchSummary {
        let mut summary = BatchSummary::default();

        for (i, scheduled_at) in dates.iter().enumerate() {
            if i > 0 {
                self.pace().await;
            }
            let result = self.gateway.create(template.child(parent_id, *scheduled_at)).await;
            if let Err(e) = &result {
                tracing::warn!(%parent_id, %scheduled_at, error = %e, "failed to create series trip");
            }
            summary.record(&result);
        }

        summary
    }

    pub(crate) async fn load_trip(&self, id: Uuid) -> Result<Trip, CoreError> {
        self.gateway
            .find(id)
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))
    }

    /// The series `target` belongs to, or `None` for a standalone trip.
    ///
    /// Children are selected by `(parent_id, job_number)`. A child whose job
    /// number no longer matches its parent's has left the series and can
    /// only be edited on its own.
    pub(crate) async fn resolve_series(&self, target: &Trip) -> Result<Option<SeriesView>, CoreError> {
        let parent = match target.parent_id {
            Some(parent_id) => self.gateway.find(parent_id).await?.ok_or_else(|| {
                CoreError::NotFound(format!("parent {} of trip {}", parent_id, target.id))
            })?,
            None => target.clone(),
        };

        if target.parent_id.is_some() && target.job_number != parent.job_number {
            return Err(CoreError::Validation(format!(
                "trip {} has job number '{}' but its series uses '{}'; edit it on its own",
                target.id, target.job_number, parent.job_number
            )));
        }

        let children = self.gateway.list(&TripFilter::children_of(&parent)).await?;

        if target.parent_id.is_none() && !parent.is_recurring && children.is_empty() {
            return Ok(None);
        }

        Ok(Some(SeriesView { parent, children }))
    }
}

impl<G: TripGateway, C: Clock> Dispatcher for SeriesService<G, C> {}
