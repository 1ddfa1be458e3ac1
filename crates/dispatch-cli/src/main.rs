use clap::Parser;
use dispatch_core::db;
use dispatch_core::error::CoreError;
use dispatch_core::gateway::SqliteGateway;
use dispatch_core::series::SeriesService;
use owo_colors::{OwoColorize, Style};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli;
mod commands;
mod config;
mod confirm;
mod parser;
mod util;
mod views;

use cli::Commands;

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    let config = config::Config::new().unwrap_or_else(|e| {
        eprintln!("{} ignoring invalid configuration: {}", "Warning:".yellow().bold(), e);
        config::Config::default()
    });
    init_tracing(&config.log_level);

    let db_pool = match db::establish_connection(&config.database_path).await {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("{} {}", "Error:".red().bold(), e);
            std::process::exit(1);
        }
    };
    let service = SeriesService::with_system_clock(SqliteGateway::new(db_pool), config.series.clone());

    if config.extend_on_startup && !matches!(cli.command, Commands::Extend(_) | Commands::Preview(_)) {
        commands::extend::extend_on_startup(&service).await;
    }

    let result = match cli.command {
        Commands::Add(command) => commands::add::add_trip(&service, command).await,
        Commands::List(command) => commands::list::list_trips(&service, command).await,
        Commands::Show(command) => commands::show::show_trip(&service, command).await,
        Commands::Preview(command) => commands::preview::preview_series(&service, command),
        Commands::Edit(command) => commands::edit::edit_trip(&service, command).await,
        Commands::Cancel(command) => commands::cancel::cancel_series(&service, command).await,
        Commands::Extend(command) => commands::extend::extend_series(&service, command).await,
        Commands::Delete(command) => commands::delete::delete_trip(&service, command).await,
    };

    if let Err(e) = result {
        handle_error(e);
        std::process::exit(1);
    }
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn handle_error(err: anyhow::Error) {
    let error_style = Style::new().red().bold();

    match err.downcast_ref::<CoreError>() {
        Some(CoreError::NotFound(s)) => {
            eprintln!("{} Not found: {}", "Error:".style(error_style), s);
        }
        Some(CoreError::Validation(s)) => {
            eprintln!("{} {}", "Error:".style(error_style), s);
        }
        Some(CoreError::ZeroResult { operation, attempted }) => {
            eprintln!(
                "{} {} failed: none of {} write(s) went through",
                "Error:".style(error_style),
                operation,
                attempted.yellow()
            );
        }
        Some(CoreError::AmbiguousId(trips)) => {
            eprintln!("{}", "Error: Ambiguous ID.".style(error_style));
            eprintln!("Did you mean one of these?");
            for (id, job_number) in trips {
                eprintln!("  {} ({})", id.yellow(), job_number);
            }
        }
        Some(core_error) => {
            eprintln!("{} {}", "Error:".style(error_style), core_error);
            if let Some(source) = std::error::Error::source(core_error) {
                eprintln!("  caused by: {}", source);
            }
        }
        None => eprintln!("{} {:#}", "Error:".style(error_style), err),
    }
}
