use clap::{Parser, Subcommand};
use dispatch_core::models::{EditScope, RecurrencePattern, TripStatus};

/// Schedule and manage recurring transport trips
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Add a trip, or a recurring series with --every and --until
    Add(AddCommand),
    /// List trips
    List(ListCommand),
    /// Show a trip's series
    Show(ShowCommand),
    /// Preview the dates a recurrence rule would produce, without saving anything
    Preview(PreviewCommand),
    /// Edit a trip or a range of its series
    Edit(EditCommand),
    /// Stop a series and delete its upcoming trips
    Cancel(CancelCommand),
    /// Fill every live series up to the lookahead window
    Extend(ExtendCommand),
    /// Delete a single trip
    Delete(DeleteCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCommand {
    /// Flight or job number
    pub job_number: String,
    /// Customer the trip is booked for
    #[clap(short, long)]
    pub customer: String,
    /// When the (first) trip happens, e.g. "2024-03-04 07:30" or "tomorrow 9am"
    #[clap(short, long)]
    pub at: String,
    /// Pickup location
    #[clap(long)]
    pub pickup: String,
    /// Dropoff location
    #[clap(long)]
    pub dropoff: String,
    /// Assigned driver
    #[clap(short, long)]
    pub driver: Option<String>,
    /// Number of passengers
    #[clap(short, long, default_value_t = 1)]
    pub passengers: u32,
    #[clap(short, long)]
    pub notes: Option<String>,
    /// Repeat the trip (daily, weekly, monthly)
    #[clap(long, requires = "until")]
    pub every: Option<RecurrencePattern>,
    /// Last day of the series, inclusive (YYYY-MM-DD)
    #[clap(long, requires = "every")]
    pub until: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListCommand {
    /// Only members of this trip's series
    #[clap(short, long)]
    pub series: Option<String>,
    /// Only series parents
    #[clap(short, long)]
    pub recurring: bool,
    /// Only trips with this job number
    #[clap(short, long)]
    pub job: Option<String>,
    /// Trips scheduled at or after this time
    #[clap(long)]
    pub from: Option<String>,
    /// Trips scheduled at or before this time
    #[clap(long)]
    pub to: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    /// The ID (or ID prefix) of any trip in the series
    pub id: String,
}

#[derive(Parser, Debug, Clone)]
pub struct PreviewCommand {
    /// Anchor of the series
    #[clap(short, long)]
    pub at: String,
    #[clap(long)]
    pub every: RecurrencePattern,
    /// Last day of the series, inclusive (YYYY-MM-DD)
    #[clap(long)]
    pub until: String,
}

#[derive(Parser, Debug, Clone)]
pub struct EditCommand {
    /// The ID of the trip to edit
    pub id: String,

    /// How far the changes reach (single|future|all); asked interactively when omitted
    #[arg(long)]
    pub scope: Option<EditScope>,

    /// Don't ask for confirmation when the edit cancels a series
    #[arg(short, long)]
    pub yes: bool,

    #[arg(long)]
    pub customer: Option<String>,

    #[arg(long)]
    pub driver: Option<String>,
    #[arg(long, conflicts_with = "driver")]
    pub driver_clear: bool,

    #[arg(long)]
    pub pickup: Option<String>,

    #[arg(long)]
    pub dropoff: Option<String>,

    #[arg(long)]
    pub passengers: Option<u32>,

    #[arg(long)]
    pub status: Option<TripStatus>,

    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,

    #[arg(long)]
    pub job: Option<String>,

    /// Move this trip to another time (single scope only)
    #[arg(long)]
    pub at: Option<String>,

    /// Turn recurrence off; cancels the series' upcoming trips
    #[arg(long, conflicts_with = "clear_pattern")]
    pub stop_recurring: bool,

    /// Clear the recurrence pattern; cancels the series' upcoming trips
    #[arg(long)]
    pub clear_pattern: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CancelCommand {
    /// The ID of a trip in the series
    pub id: String,
    /// future: this trip onwards, all: every generated trip
    #[arg(long, default_value = "future")]
    pub scope: EditScope,
    /// Don't ask for confirmation
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct ExtendCommand {
    /// Lookahead in days; defaults to the configured window
    #[arg(short, long)]
    pub days: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCommand {
    /// The ID of the trip to delete
    pub id: String,
    /// Force deletion without confirmation
    #[clap(short, long)]
    pub force: bool,
}
