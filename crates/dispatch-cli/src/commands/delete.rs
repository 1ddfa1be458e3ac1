use anyhow::Result;
use dialoguer::Confirm;
use dispatch_core::error::CoreError;
use dispatch_core::gateway::{TripFilter, TripGateway};

use super::Service;
use crate::cli::DeleteCommand;
use crate::util::resolve_trip_id;

pub async fn delete_trip(service: &Service, command: DeleteCommand) -> Result<()> {
    let trip_id = resolve_trip_id(service.gateway(), &command.id).await?;
    let trip = service
        .gateway()
        .find(trip_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(trip_id.to_string()))?;

    let linked = TripFilter {
        parent_id: Some(trip_id),
        ..Default::default()
    };
    if !service.gateway().list(&linked).await?.is_empty() {
        return Err(CoreError::Validation(format!(
            "'{}' still has trips in its series; use `dispatch cancel --scope all` first",
            trip.job_number
        ))
        .into());
    }

    if !command.force {
        let confirmation = Confirm::new()
            .with_prompt(format!(
                "Are you sure you want to delete trip '{}' on {}?",
                trip.job_number,
                trip.scheduled_at.format("%Y-%m-%d %H:%M")
            ))
            .default(false)
            .interact()
            .unwrap_or(false);

        if !confirmation {
            println!("Deletion cancelled.");
            return Ok(());
        }
    }

    service.gateway().delete(trip_id).await?;
    println!("Trip '{}' deleted.", trip.job_number);
    Ok(())
}
