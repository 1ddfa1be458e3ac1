//! # Dispatch Core Library
//!
//! Recurring trip series for a transportation dispatch system: expanding a
//! recurrence rule into concrete trips, keeping live series populated over a
//! rolling window, and editing or cancelling a series with an explicit scope.
//!
//! ## Core Modules
//!
//! - [`db`]: SQLite connection and migrations
//! - [`models`]: Trips, change sets, scopes and operation summaries
//! - [`recurrence`]: The pure occurrence expander
//! - [`gateway`]: The storage contract and its SQLite implementation
//! - [`series`]: Series generation, window extension and lifecycle edits
//! - [`clock`]: Injectable time source
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use dispatch_core::{
//!     db,
//!     gateway::SqliteGateway,
//!     models::{NewSeriesData, RecurrencePattern, SeriesConfig},
//!     series::{SeriesGenerator, SeriesService},
//! };
//! use chrono::{NaiveDate, TimeZone, Utc};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), dispatch_core::error::CoreError> {
//!     let pool = db::establish_connection("dispatch.db").await?;
//!     let service = SeriesService::with_system_clock(SqliteGateway::new(pool), SeriesConfig::default());
//!
//!     let created = service
//!         .create_series(NewSeriesData {
//!             scheduled_at: Utc.with_ymd_and_hms(2024, 3, 4, 7, 30, 0).unwrap(),
//!             pattern: RecurrencePattern::Weekly,
//!             end_date: NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
//!             job_number: "BA117".to_string(),
//!             customer_name: "Acme Corp".to_string(),
//!             pickup_location: "JFK Terminal 7".to_string(),
//!             dropoff_location: "Midtown".to_string(),
//!             ..Default::default()
//!         })
//!         .await?;
//!     println!("Created series {} with {} trips", created.parent_id, created.child_count);
//!
//!     Ok(())
//! }
//! ```

pub mod clock;
pub mod db;
pub mod error;
pub mod gateway;
pub mod models;
pub mod recurrence;
pub mod series;
