use super::{LifecycleMutator, SeriesService};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::gateway::TripGateway;
use crate::models::{
    BatchSummary, BlastRadius, CancellationSummary, CancellationTrigger, EditOutcome, EditScope,
    SeriesView, Trip, TripChanges,
};
use crate::recurrence::end_of_day;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Drops recurrence fields that would not change `target`, then rejects
/// whatever recurrence change is left. Rules are replaced by cancelling and
/// creating a new series, never edited in place.
fn strip_noop_recurrence(target: &Trip, mut changes: TripChanges) -> Result<TripChanges, CoreError> {
    if changes.is_recurring == Some(target.is_recurring) {
        changes.is_recurring = None;
    }
    if changes.recurrence_pattern == Some(target.recurrence_pattern) {
        changes.recurrence_pattern = None;
    }
    if changes.recurrence_end_date == Some(target.recurrence_end_date) {
        changes.recurrence_end_date = None;
    }

    if changes.touches_recurrence() {
        return Err(CoreError::Validation(
            "Recurrence rules cannot be changed in place; cancel the series and create a new one"
                .to_string(),
        ));
    }
    Ok(changes)
}

/// Keeps a rescheduled member strictly between its neighbours and inside
/// the series end date.
fn check_reschedule(view: &SeriesView, target: &Trip, new_at: DateTime<Utc>) -> Result<(), CoreError> {
    let members: Vec<&Trip> = std::iter::once(&view.parent).chain(&view.children).collect();
    let Some(pos) = members.iter().position(|t| t.id == target.id) else {
        return Ok(());
    };

    let after_prev = pos == 0 || members[pos - 1].scheduled_at < new_at;
    let before_next = members.get(pos + 1).map_or(true, |next| new_at < next.scheduled_at);
    if !after_prev || !before_next {
        return Err(CoreError::Validation(format!(
            "{} would pass a neighbouring trip in the series; cancel and recreate to reorder",
            new_at.format("%Y-%m-%d %H:%M")
        )));
    }

    if let Some(end) = view.parent.recurrence_end_date {
        if new_at > end_of_day(end) {
            return Err(CoreError::Validation(format!(
                "{} is after the series end date {}",
                new_at.format("%Y-%m-%d %H:%M"),
                end
            )));
        }
    }
    Ok(())
}

impl<G: TripGateway, C: Clock> SeriesService<G, C> {
    /// Computes what a series-wide cancellation reaching `target` deletes.
    async fn blast_radius(&self, target: &Trip, scope: EditScope) -> Result<(BlastRadius, SeriesView), CoreError> {
        if scope == EditScope::Single {
            return Err(CoreError::Validation(
                "Cancelling recurrence affects the whole series; use the 'future' or 'all' scope".to_string(),
            ));
        }

        let view = self.resolve_series(target).await?.ok_or_else(|| {
            CoreError::Validation(format!("Trip {} is not part of a recurring series", target.id))
        })?;

        let (victims, detached): (Vec<&Trip>, Option<Uuid>) = match scope {
            EditScope::ThisAndFuture => (
                view.children
                    .iter()
                    .filter(|c| c.id != target.id && c.scheduled_at >= target.scheduled_at)
                    .collect(),
                target.is_child().then_some(target.id),
            ),
            _ => (view.children.iter().collect(), None),
        };

        let radius = BlastRadius {
            parent_id: view.parent.id,
            scope,
            job_number: view.parent.job_number.clone(),
            trip_ids: victims.iter().map(|t| t.id).collect(),
            earliest: victims.iter().map(|t| t.scheduled_at).min(),
            latest: victims.iter().map(|t| t.scheduled_at).max(),
            detached,
        };
        Ok((radius, view))
    }

    /// Stops the series, then deletes the trips in its blast radius one by one.
    ///
    /// The parent's rule is cleared first; if that fails nothing is deleted.
    /// Individual delete failures are counted and skipped.
    async fn cancel_series(
        &self,
        target: &Trip,
        scope: EditScope,
        trigger: Option<CancellationTrigger>,
    ) -> Result<CancellationSummary, CoreError> {
        let (radius, view) = self.blast_radius(target, scope).await?;
        let parent = &view.parent;

        if parent.is_recurring || parent.recurrence_pattern.is_some() || parent.recurrence_end_date.is_some() {
            self.gateway()
                .update(parent.id, &TripChanges::stop_recurrence())
                .await?;
            tracing::info!(parent_id = %parent.id, job_number = %parent.job_number, "series recurrence stopped");
        }

        let mut deletions = BatchSummary::default();
        for id in &radius.trip_ids {
            let result = self.gateway().delete(*id).await;
            if let Err(e) = &result {
                tracing::warn!(trip_id = %id, parent_id = %parent.id, error = %e, "failed to delete series trip");
            }
            deletions.record(&result);
        }

        let mut failed = deletions.failed;
        if let Some(id) = radius.detached {
            if let Err(e) = self.gateway().update(id, &TripChanges::detach()).await {
                tracing::warn!(trip_id = %id, error = %e, "failed to detach trip from cancelled series");
                failed += 1;
            }
        }

        deletions.ensure_any_succeeded("delete series trips")?;

        tracing::info!(
            parent_id = %parent.id,
            %scope,
            deleted = deletions.succeeded,
            failed,
            trigger = ?trigger,
            "series cancelled"
        );

        Ok(CancellationSummary {
            deleted: deletions.succeeded,
            failed,
            blast_radius: radius,
            trigger,
        })
    }

    /// Whether an edit switches off a live series, and with which scope.
    ///
    /// From the parent every scope reaches every child, so `Single` widens to
    /// `All`. From a child only `All` reaches the parent.
    async fn cascade_scope(
        &self,
        target: &Trip,
        scope: EditScope,
        changes: &TripChanges,
    ) -> Result<Option<(CancellationTrigger, EditScope)>, CoreError> {
        let Some(trigger) = changes.cancellation_trigger() else {
            return Ok(None);
        };

        if target.is_series_parent() {
            let scope = if scope == EditScope::Single { EditScope::All } else { scope };
            return Ok(Some((trigger, scope)));
        }

        if let (EditScope::All, Some(parent_id)) = (scope, target.parent_id) {
            if self.load_trip(parent_id).await?.is_recurring {
                return Ok(Some((trigger, EditScope::All)));
            }
        }

        Ok(None)
    }

    /// Ids an edit of `target` with `scope` writes to, parent first when included.
    async fn edit_targets(&self, target: &Trip, scope: EditScope) -> Result<Vec<Uuid>, CoreError> {
        if scope == EditScope::Single {
            return Ok(vec![target.id]);
        }

        let Some(view) = self.resolve_series(target).await? else {
            return Ok(vec![target.id]);
        };

        let members = std::iter::once(&view.parent).chain(view.children.iter());
        let ids: Vec<Uuid> = match scope {
            EditScope::ThisAndFuture => members
                .filter(|t| t.scheduled_at >= target.scheduled_at)
                .map(|t| t.id)
                .collect(),
            _ => members.map(|t| t.id).collect(),
        };
        Ok(ids)
    }
}

#[async_trait]
impl<G: TripGateway, C: Clock> LifecycleMutator for SeriesService<G, C> {
    async fn series_members(&self, target_id: Uuid) -> Result<SeriesView, CoreError> {
        let target = self.load_trip(target_id).await?;
        let view = self.resolve_series(&target).await?;
        Ok(view.unwrap_or(SeriesView {
            parent: target,
            children: Vec::new(),
        }))
    }

    async fn preview_cancel(&self, target_id: Uuid, scope: EditScope) -> Result<BlastRadius, CoreError> {
        let target = self.load_trip(target_id).await?;
        let (radius, _) = self.blast_radius(&target, scope).await?;
        Ok(radius)
    }

    async fn preview_edit(
        &self,
        target_id: Uuid,
        scope: EditScope,
        changes: &TripChanges,
    ) -> Result<Option<BlastRadius>, CoreError> {
        let target = self.load_trip(target_id).await?;
        match self.cascade_scope(&target, scope, changes).await? {
            Some((_, cascade)) => {
                let (radius, _) = self.blast_radius(&target, cascade).await?;
                Ok(Some(radius))
            }
            None => Ok(None),
        }
    }

    async fn edit_scoped(
        &self,
        target_id: Uuid,
        scope: EditScope,
        changes: TripChanges,
    ) -> Result<EditOutcome, CoreError> {
        if changes.parent_id.is_some() {
            return Err(CoreError::Validation(
                "Series membership cannot be edited directly".to_string(),
            ));
        }

        let target = self.load_trip(target_id).await?;

        if let Some((trigger, cascade)) = self.cascade_scope(&target, scope, &changes).await? {
            let mut summary = self.cancel_series(&target, cascade, Some(trigger)).await?;

            let payload = changes.payload_only();
            if !payload.is_empty() {
                if summary.blast_radius.trip_ids.contains(&target.id) {
                    tracing::debug!(trip_id = %target.id, "edited trip was removed by the cancellation");
                } else if let Err(e) = self.gateway().update(target.id, &payload).await {
                    tracing::warn!(trip_id = %target.id, error = %e, "failed to apply edit after cancellation");
                    summary.failed += 1;
                }
            }

            return Ok(EditOutcome::Cancelled(summary));
        }

        let mut changes = strip_noop_recurrence(&target, changes)?;
        if changes.job_number.as_deref() == Some(target.job_number.as_str()) {
            changes.job_number = None;
        }
        if changes.is_empty() {
            return Err(CoreError::Validation("Nothing to change".to_string()));
        }
        if changes.scheduled_at.is_some() && scope != EditScope::Single {
            return Err(CoreError::Validation(
                "Rescheduling applies to one trip at a time; use the 'single' scope".to_string(),
            ));
        }

        if changes.job_number.is_some() || changes.scheduled_at.is_some() {
            if let Some(view) = self.resolve_series(&target).await? {
                if changes.job_number.is_some() && scope != EditScope::All && !view.children.is_empty() {
                    return Err(CoreError::Validation(
                        "The job number is shared by the whole series; use the 'all' scope".to_string(),
                    ));
                }
                if let Some(new_at) = changes.scheduled_at {
                    check_reschedule(&view, &target, new_at)?;
                }
            }
        }

        let ids = self.edit_targets(&target, scope).await?;
        let mut summary = BatchSummary::default();
        for id in &ids {
            let result = self.gateway().update(*id, &changes).await;
            if let Err(e) = &result {
                tracing::warn!(trip_id = %id, error = %e, "failed to update trip");
            }
            summary.record(&result);
        }

        summary.ensure_any_succeeded("update trips")?;
        tracing::info!(
            trip_id = %target.id,
            %scope,
            updated = summary.succeeded,
            failed = summary.failed,
            "trips updated"
        );

        Ok(EditOutcome::Updated(summary))
    }

    async fn cancel_scoped(&self, target_id: Uuid, scope: EditScope) -> Result<CancellationSummary, CoreError> {
        let target = self.load_trip(target_id).await?;
        self.cancel_series(&target, scope, None).await
    }
}
