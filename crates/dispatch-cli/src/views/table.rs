use chrono::{DateTime, Utc};
use chrono_humanize::Humanize;
use comfy_table::{Attribute, Cell, Color, Row, Table};
use dispatch_core::models::{BlastRadius, SeriesView, Trip, TripStatus};

use crate::util::short_id;

fn series_marker(trip: &Trip) -> &'static str {
    if trip.is_series_parent() {
        "↻"
    } else if trip.is_child() {
        "·"
    } else {
        ""
    }
}

fn when_cell(trip: &Trip) -> Cell {
    let now = Utc::now();
    let text = format!(
        "{} ({})",
        trip.scheduled_at.format("%Y-%m-%d %H:%M"),
        trip.scheduled_at.humanize()
    );
    let cell = Cell::new(text);

    match trip.status {
        TripStatus::Scheduled | TripStatus::Assigned if trip.scheduled_at < now => cell.fg(Color::Red),
        TripStatus::Scheduled | TripStatus::Assigned
            if trip.scheduled_at.date_naive() == now.date_naive() =>
        {
            cell.fg(Color::Yellow)
        }
        _ => cell,
    }
}

fn status_cell(status: TripStatus) -> Cell {
    let cell = Cell::new(status.to_string());
    match status {
        TripStatus::Completed => cell.fg(Color::Green),
        TripStatus::Cancelled => cell.fg(Color::DarkGrey).add_attribute(Attribute::CrossedOut),
        TripStatus::InProgress => cell.fg(Color::Cyan),
        TripStatus::Assigned => cell.fg(Color::Blue),
        TripStatus::Scheduled => cell,
    }
}

pub fn display_trips(trips: &[Trip]) {
    if trips.is_empty() {
        println!("No trips found.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["ID", "", "Job", "When", "Customer", "Route", "Pax", "Driver", "Status"]);

    for trip in trips {
        let mut row = Row::new();
        row.add_cell(Cell::new(short_id(&trip.id)));
        row.add_cell(Cell::new(series_marker(trip)));
        row.add_cell(Cell::new(&trip.job_number).add_attribute(Attribute::Bold));
        row.add_cell(when_cell(trip));
        row.add_cell(Cell::new(&trip.customer_name));
        row.add_cell(Cell::new(format!("{} → {}", trip.pickup_location, trip.dropoff_location)));
        row.add_cell(Cell::new(trip.passenger_count));
        row.add_cell(Cell::new(trip.driver.as_deref().unwrap_or("-")));
        row.add_cell(status_cell(trip.status));
        table.add_row(row);
    }

    println!("{table}");
}

pub fn display_series(view: &SeriesView) {
    let parent = &view.parent;
    match (parent.recurrence_pattern, parent.recurrence_end_date) {
        (Some(pattern), Some(end)) if parent.is_recurring => {
            println!("Series {} ({}), {} until {}", parent.job_number, short_id(&parent.id), pattern, end);
        }
        _ if view.children.is_empty() => {
            println!("Trip {} ({}) is not part of a series", parent.job_number, short_id(&parent.id));
        }
        _ => {
            println!("Series {} ({}), recurrence stopped", parent.job_number, short_id(&parent.id));
        }
    }

    let mut trips = Vec::with_capacity(view.trip_count());
    trips.push(parent.clone());
    trips.extend(view.children.iter().cloned());
    display_trips(&trips);
}

pub fn display_blast_radius(radius: &BlastRadius) {
    println!(
        "Series {} ({}), scope '{}': {} trip(s) will be deleted",
        radius.job_number,
        short_id(&radius.parent_id),
        radius.scope,
        radius.affected()
    );
    if let (Some(earliest), Some(latest)) = (radius.earliest, radius.latest) {
        println!(
            "  from {} to {}",
            earliest.format("%Y-%m-%d %H:%M"),
            latest.format("%Y-%m-%d %H:%M")
        );
    }
    if let Some(detached) = radius.detached {
        println!("  trip {} is kept as a one-off", short_id(&detached));
    }
}

pub fn display_occurrences(dates: &[DateTime<Utc>]) {
    if dates.is_empty() {
        println!("No trips would be generated.");
        return;
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "Scheduled", "Weekday"]);
    for (i, at) in dates.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(at.format("%Y-%m-%d %H:%M")),
            Cell::new(at.format("%A")),
        ]);
    }
    println!("{table}");
}
