use anyhow::Result;
use dispatch_core::recurrence::OccurrenceExpander;
use owo_colors::OwoColorize;

use super::Service;
use crate::cli::PreviewCommand;
use crate::parser::{parse_date, parse_datetime};
use crate::views::table::display_occurrences;

pub fn preview_series(service: &Service, command: PreviewCommand) -> Result<()> {
    let anchor = parse_datetime(&command.at)?;
    let end_date = parse_date(&command.until)?;

    let expansion = OccurrenceExpander::new(service.config().max_expansions).expand(
        anchor,
        command.every,
        end_date,
    )?;

    println!(
        "{} {} from {} until {}: {} trip(s) after the first",
        "Preview".blue().bold(),
        command.every,
        anchor.format("%Y-%m-%d %H:%M"),
        end_date,
        expansion.len()
    );
    display_occurrences(&expansion.dates);
    if let Some(limit) = expansion.limit_reached {
        println!("{} {}", "!".yellow().bold(), limit);
    }
    Ok(())
}
