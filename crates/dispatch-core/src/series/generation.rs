use super::{SeriesGenerator, SeriesService};
use crate::clock::Clock;
use crate::error::CoreError;
use crate::gateway::TripGateway;
use crate::models::{NewSeriesData, SeriesCreated};
use crate::recurrence::validate_range;
use async_trait::async_trait;

fn validate_seed(seed: &NewSeriesData) -> Result<(), CoreError> {
    if seed.job_number.trim().is_empty() {
        return Err(CoreError::Validation("A series needs a job number".to_string()));
    }
    if seed.customer_name.trim().is_empty() {
        return Err(CoreError::Validation("A series needs a customer name".to_string()));
    }
    if seed.passenger_count == 0 {
        return Err(CoreError::Validation("Passenger count must be at least 1".to_string()));
    }
    validate_range(seed.scheduled_at, seed.end_date)
}

#[async_trait]
impl<G: TripGateway, C: Clock> SeriesGenerator for SeriesService<G, C> {
    async fn create_series(&self, seed: NewSeriesData) -> Result<SeriesCreated, CoreError> {
        validate_seed(&seed)?;

        // Expand before the first write so a bad rule never leaves a parent behind.
        let expansion = self.expander().expand(seed.scheduled_at, seed.pattern, seed.end_date)?;

        let parent = seed.parent_record();
        let parent_id = self.gateway().create(parent.clone()).await?;
        tracing::info!(
            %parent_id,
            job_number = %seed.job_number,
            pattern = %seed.pattern,
            end_date = %seed.end_date,
            children = expansion.len(),
            "series parent created"
        );

        if !expansion.is_empty() {
            self.pace().await;
        }
        let summary = self.persist_children(parent_id, &parent, &expansion.dates).await;

        // The parent stays even if every child failed; the extender can fill in later.
        summary.ensure_any_succeeded("create series trips")?;

        if summary.failed > 0 {
            tracing::warn!(%parent_id, failed = summary.failed, created = summary.succeeded, "series created with gaps");
        } else {
            tracing::info!(%parent_id, created = summary.succeeded, "series created");
        }

        Ok(SeriesCreated {
            parent_id,
            child_count: summary.succeeded,
            failed: summary.failed,
            truncated: expansion.limit_reached,
        })
    }
}
