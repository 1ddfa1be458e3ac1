use anyhow::Result;
use dispatch_core::series::LifecycleMutator;
use owo_colors::OwoColorize;

use super::Service;
use crate::cli::CancelCommand;
use crate::confirm::confirmation;
use crate::util::resolve_trip_id;
use crate::views::table::display_blast_radius;

pub async fn cancel_series(service: &Service, command: CancelCommand) -> Result<()> {
    let trip_id = resolve_trip_id(service.gateway(), &command.id).await?;

    let radius = service.preview_cancel(trip_id, command.scope).await?;
    display_blast_radius(&radius);
    if !confirmation(command.yes).confirm(&radius) {
        println!("Cancellation aborted.");
        return Ok(());
    }

    let summary = service.cancel_scoped(trip_id, command.scope).await?;
    println!(
        "{} Series {} stopped, {} trip(s) deleted",
        "✓".green().bold(),
        summary.blast_radius.job_number.bright_white().bold(),
        summary.deleted
    );
    if summary.failed > 0 {
        println!(
            "  {} {} trip(s) could not be removed; run the cancellation again to retry",
            "!".yellow().bold(),
            summary.failed
        );
    }
    Ok(())
}
