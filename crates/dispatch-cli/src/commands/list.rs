use anyhow::Result;
use dispatch_core::gateway::{DateRange, TripFilter, TripGateway};
use dispatch_core::series::LifecycleMutator;

use super::Service;
use crate::cli::ListCommand;
use crate::parser::parse_datetime;
use crate::util::resolve_trip_id;
use crate::views::table::{display_series, display_trips};

pub async fn list_trips(service: &Service, command: ListCommand) -> Result<()> {
    if let Some(series) = &command.series {
        let id = resolve_trip_id(service.gateway(), series).await?;
        let view = service.series_members(id).await?;
        display_series(&view);
        return Ok(());
    }

    let start = command.from.as_deref().map(parse_datetime).transpose()?;
    let end = command.to.as_deref().map(parse_datetime).transpose()?;
    let scheduled = (start.is_some() || end.is_some()).then_some(DateRange { start, end });

    let filter = TripFilter {
        is_recurring: command.recurring.then_some(true),
        job_number: command.job,
        scheduled,
        ..Default::default()
    };

    let trips = service.gateway().list(&filter).await?;
    display_trips(&trips);
    Ok(())
}
