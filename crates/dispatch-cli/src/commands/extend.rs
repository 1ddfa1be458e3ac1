use anyhow::Result;
use chrono::Duration;
use dispatch_core::series::Dispatcher;
use owo_colors::OwoColorize;

use crate::cli::ExtendCommand;
use crate::util::short_id;

/// Quiet pass run before other commands; failures are logged, never fatal.
pub async fn extend_on_startup(dispatcher: &impl Dispatcher) {
    match dispatcher.extend_default().await {
        Ok(report) => {
            let created: usize = report.values().map(|s| s.succeeded).sum();
            tracing::debug!(series = report.len(), created, "startup window extension done");
        }
        Err(e) => tracing::warn!(error = %e, "startup window extension failed"),
    }
}

pub async fn extend_series(dispatcher: &impl Dispatcher, command: ExtendCommand) -> Result<()> {
    let report = match command.days {
        Some(days) => dispatcher.extend_all(Duration::days(i64::from(days))).await?,
        None => dispatcher.extend_default().await?,
    };

    let created: usize = report.values().map(|s| s.succeeded).sum();
    let failed: usize = report.values().map(|s| s.failed).sum();

    println!(
        "{} Extended {} series, {} trip(s) created",
        "✓".green().bold(),
        report.len(),
        created
    );
    for (parent_id, summary) in report.iter().filter(|(_, s)| s.attempted() > 0) {
        println!(
            "  {} {}: +{}{}",
            "→".blue(),
            short_id(parent_id).yellow(),
            summary.succeeded,
            if summary.failed > 0 {
                format!(" ({} failed)", summary.failed)
            } else {
                String::new()
            }
        );
    }
    if failed > 0 {
        println!("  {} {} write(s) failed", "!".yellow().bold(), failed);
    }
    Ok(())
}
