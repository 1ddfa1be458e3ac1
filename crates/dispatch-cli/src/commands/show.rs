use anyhow::Result;
use dispatch_core::series::LifecycleMutator;

use super::Service;
use crate::cli::ShowCommand;
use crate::util::resolve_trip_id;
use crate::views::table::display_series;

pub async fn show_trip(service: &Service, command: ShowCommand) -> Result<()> {
    let id = resolve_trip_id(service.gateway(), &command.id).await?;
    let view = service.series_members(id).await?;
    display_series(&view);
    Ok(())
}
