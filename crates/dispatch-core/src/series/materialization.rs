use super::{SeriesService, WindowExtender};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::gateway::{TripFilter, TripGateway};
use crate::models::{BatchSummary, NewTrip, SeriesView, Trip};
use crate::recurrence::end_of_day;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

impl<G: TripGateway, C: Clock> SeriesService<G, C> {
    /// Fills one series from its last occupied rule slot up to `horizon`.
    ///
    /// Resumes after the latest slot only; a gap earlier in the series is
    /// not backfilled. A rescheduled member keeps its original slot, so moving
    /// it never shifts or duplicates later occurrences.
    async fn extend_series(&self, parent: &Trip, horizon: DateTime<Utc>) -> Option<BatchSummary> {
        let (Some(pattern), Some(end_date)) = (parent.recurrence_pattern, parent.recurrence_end_date) else {
            tracing::warn!(parent_id = %parent.id, "recurring trip has no pattern or end date, skipping");
            return None;
        };

        let series_end = end_of_day(end_date);
        if series_end < self.clock().now() {
            tracing::debug!(parent_id = %parent.id, %end_date, "series already ended");
            return None;
        }

        let children = match self.gateway().list(&TripFilter::children_of(parent)).await {
            Ok(children) => children,
            Err(e) => {
                tracing::warn!(parent_id = %parent.id, error = %e, "failed to load series trips");
                return Some(BatchSummary { succeeded: 0, failed: 1 });
            }
        };

        let last_known = SeriesView {
            parent: parent.clone(),
            children,
        }
        .last_occurrence();

        let expansion = self
            .expander()
            .expand_until(last_known, pattern, horizon.min(series_end));

        if expansion.is_empty() {
            return Some(BatchSummary::default());
        }

        let summary = self
            .persist_children(parent.id, &NewTrip::from(parent), &expansion.dates)
            .await;
        tracing::info!(
            parent_id = %parent.id,
            job_number = %parent.job_number,
            created = summary.succeeded,
            failed = summary.failed,
            "series extended"
        );
        Some(summary)
    }
}

#[async_trait]
impl<G: TripGateway, C: Clock> WindowExtender for SeriesService<G, C> {
    async fn extend_all(&self, lookahead: Duration) -> Result<BTreeMap<Uuid, BatchSummary>, CoreError> {
        let now = self.clock().now();
        let horizon = now.checked_add_signed(lookahead).unwrap_or(DateTime::<Utc>::MAX_UTC);

        let parents = self.gateway().list(&TripFilter::recurring_parents()).await?;
        let mut report = BTreeMap::new();

        for parent in parents.iter().filter(|p| p.is_series_parent()) {
            if let Some(summary) = self.extend_series(parent, horizon).await {
                report.insert(parent.id, summary);
            }
        }

        let created: usize = report.values().map(|s| s.succeeded).sum();
        let failed: usize = report.values().map(|s| s.failed).sum();
        tracing::info!(series = report.len(), created, failed, %horizon, "extension pass finished");

        Ok(report)
    }

    async fn extend_default(&self) -> Result<BTreeMap<Uuid, BatchSummary>, CoreError> {
        self.extend_all(self.config().lookahead()).await
    }
}
