use anyhow::Result;
use dispatch_core::gateway::TripGateway;
use dispatch_core::models::{NewSeriesData, NewTrip, TripStatus};
use dispatch_core::series::SeriesGenerator;
use owo_colors::{OwoColorize, Style};

use super::Service;
use crate::cli::AddCommand;
use crate::parser::{parse_date, parse_datetime};
use crate::util::short_id;

pub async fn add_trip(service: &Service, command: AddCommand) -> Result<()> {
    let scheduled_at = parse_datetime(&command.at)?;
    let success_style = Style::new().green().bold();
    let info_style = Style::new().blue();

    match (command.every, command.until) {
        (Some(pattern), Some(until)) => {
            let end_date = parse_date(&until)?;
            let created = service
                .create_series(NewSeriesData {
                    scheduled_at,
                    pattern,
                    end_date,
                    job_number: command.job_number.clone(),
                    customer_name: command.customer,
                    driver: command.driver,
                    pickup_location: command.pickup,
                    dropoff_location: command.dropoff,
                    passenger_count: command.passengers,
                    notes: command.notes,
                })
                .await?;

            println!(
                "{} Created series: {} ({} until {})",
                "✓".style(success_style),
                command.job_number.bright_white().bold(),
                pattern,
                end_date
            );
            println!(
                "  {} Parent ID: {}",
                "→".style(info_style),
                short_id(&created.parent_id).yellow()
            );
            println!(
                "  {} {} trip(s) scheduled after the first",
                "→".style(info_style),
                created.child_count
            );
            if created.failed > 0 {
                println!(
                    "  {} {} trip(s) could not be saved",
                    "!".yellow().bold(),
                    created.failed
                );
            }
            if let Some(limit) = created.truncated {
                println!(
                    "  {} {}; `dispatch extend` fills the rest as the dates come up",
                    "!".yellow().bold(),
                    limit
                );
            }
        }
        _ => {
            let status = if command.driver.is_some() {
                TripStatus::Assigned
            } else {
                TripStatus::Scheduled
            };
            let id = service
                .gateway()
                .create(NewTrip {
                    scheduled_at,
                    job_number: command.job_number.clone(),
                    customer_name: command.customer,
                    driver: command.driver,
                    pickup_location: command.pickup,
                    dropoff_location: command.dropoff,
                    passenger_count: command.passengers,
                    status,
                    notes: command.notes,
                    ..Default::default()
                })
                .await?;

            println!(
                "{} Created trip: {}",
                "✓".style(success_style),
                command.job_number.bright_white().bold()
            );
            println!("  {} Trip ID: {}", "→".style(info_style), short_id(&id).yellow());
            println!(
                "  {} At: {}",
                "→".style(info_style),
                scheduled_at.format("%Y-%m-%d %H:%M").to_string().cyan()
            );
        }
    }

    Ok(())
}
