use anyhow::Result;
use dialoguer::Select;
use dispatch_core::error::CoreError;
use dispatch_core::gateway::TripGateway;
use dispatch_core::models::{EditOutcome, EditScope, Trip, TripChanges};
use dispatch_core::series::LifecycleMutator;
use owo_colors::OwoColorize;

use super::Service;
use crate::cli::EditCommand;
use crate::confirm::confirmation;
use crate::parser::parse_datetime;
use crate::util::{resolve_trip_id, short_id};
use crate::views::table::display_blast_radius;

pub async fn edit_trip(service: &Service, command: EditCommand) -> Result<()> {
    let trip_id = resolve_trip_id(service.gateway(), &command.id).await?;
    let trip = service
        .gateway()
        .find(trip_id)
        .await?
        .ok_or_else(|| CoreError::NotFound(trip_id.to_string()))?;

    let scope = match command.scope {
        Some(scope) => scope,
        None if trip.is_series_parent() || trip.is_child() => ask_scope(&trip)?,
        None => EditScope::Single,
    };

    let changes = changes_from(&command)?;
    if let Some(radius) = service.preview_edit(trip_id, scope, &changes).await? {
        println!("{}", "This edit stops the series.".yellow());
        display_blast_radius(&radius);
        if !confirmation(command.yes).confirm(&radius) {
            println!("Edit cancelled.");
            return Ok(());
        }
    }

    match service.edit_scoped(trip_id, scope, changes).await? {
        EditOutcome::Updated(summary) => {
            println!(
                "{} Updated {} trip(s)",
                "✓".green().bold(),
                summary.succeeded
            );
            if summary.failed > 0 {
                println!("  {} {} update(s) failed", "!".yellow().bold(), summary.failed);
            }
        }
        EditOutcome::Cancelled(summary) => {
            println!(
                "{} Series {} stopped, {} trip(s) deleted",
                "✓".green().bold(),
                summary.blast_radius.job_number.bright_white().bold(),
                summary.deleted
            );
            if summary.failed > 0 {
                println!("  {} {} trip(s) could not be removed", "!".yellow().bold(), summary.failed);
            }
        }
    }

    Ok(())
}

fn ask_scope(trip: &Trip) -> Result<EditScope> {
    let scope_options = vec![
        format!("This trip only ({})", trip.scheduled_at.format("%Y-%m-%d %H:%M")),
        "This and future trips".to_string(),
        "Entire series".to_string(),
    ];

    println!("{}", "This trip is part of a recurring series.".yellow());
    let selection = Select::new()
        .with_prompt("How would you like to apply your changes?")
        .items(&scope_options)
        .default(0)
        .interact()?;

    Ok(match selection {
        1 => EditScope::ThisAndFuture,
        2 => EditScope::All,
        _ => EditScope::Single,
    })
}

fn changes_from(command: &EditCommand) -> Result<TripChanges> {
    let driver = if command.driver_clear {
        Some(None)
    } else {
        command.driver.clone().map(Some)
    };
    let notes = if command.notes_clear {
        Some(None)
    } else {
        command.notes.clone().map(Some)
    };

    Ok(TripChanges {
        customer_name: command.customer.clone(),
        driver,
        pickup_location: command.pickup.clone(),
        dropoff_location: command.dropoff.clone(),
        passenger_count: command.passengers,
        status: command.status,
        notes,
        job_number: command.job.clone(),
        scheduled_at: command.at.as_deref().map(parse_datetime).transpose()?,
        is_recurring: command.stop_recurring.then_some(false),
        recurrence_pattern: command.clear_pattern.then_some(None),
        ..Default::default()
    })
}
