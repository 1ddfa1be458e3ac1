use crate::gateway::TripFilter;
use crate::models::TripChanges;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};

/// Translates gateway filters and patches into SQL.
pub struct SqlQueryBuilder;

impl SqlQueryBuilder {
    /// Appends `WHERE ...` for every set field of `filter`; nothing if none are set.
    pub fn push_where_clause(filter: &TripFilter, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut first = true;

        if let Some(parent_id) = filter.parent_id {
            push_conjunction(qb, &mut first);
            qb.push("parent_id = ");
            qb.push_bind(parent_id);
        }

        if let Some(is_recurring) = filter.is_recurring {
            push_conjunction(qb, &mut first);
            qb.push("is_recurring = ");
            qb.push_bind(is_recurring);
        }

        if let Some(job_number) = &filter.job_number {
            push_conjunction(qb, &mut first);
            qb.push("job_number = ");
            qb.push_bind(job_number.clone());
        }

        if let Some(range) = filter.scheduled {
            if let Some(start) = range.start {
                push_conjunction(qb, &mut first);
                qb.push("scheduled_at >= ");
                qb.push_bind(start);
            }
            if let Some(end) = range.end {
                push_conjunction(qb, &mut first);
                qb.push("scheduled_at <= ");
                qb.push_bind(end);
            }
        }
    }

    /// Appends the `SET` list for `changes`. Always touches `updated_at`, so
    /// an empty patch is still a valid statement.
    pub fn push_set_clause(changes: &TripChanges, qb: &mut QueryBuilder<'_, Sqlite>) {
        let mut set = qb.separated(", ");

        if let Some(customer_name) = &changes.customer_name {
            set.push("customer_name = ");
            set.push_bind_unseparated(customer_name.clone());
        }
        if let Some(driver) = &changes.driver {
            set.push("driver = ");
            set.push_bind_unseparated(driver.clone());
        }
        if let Some(pickup_location) = &changes.pickup_location {
            set.push("pickup_location = ");
            set.push_bind_unseparated(pickup_location.clone());
        }
        if let Some(dropoff_location) = &changes.dropoff_location {
            set.push("dropoff_location = ");
            set.push_bind_unseparated(dropoff_location.clone());
        }
        if let Some(passenger_count) = changes.passenger_count {
            set.push("passenger_count = ");
            set.push_bind_unseparated(passenger_count);
        }
        if let Some(status) = changes.status {
            set.push("status = ");
            set.push_bind_unseparated(status);
        }
        if let Some(notes) = &changes.notes {
            set.push("notes = ");
            set.push_bind_unseparated(notes.clone());
        }
        if let Some(job_number) = &changes.job_number {
            set.push("job_number = ");
            set.push_bind_unseparated(job_number.clone());
        }
        if let Some(scheduled_at) = changes.scheduled_at {
            set.push("scheduled_at = ");
            set.push_bind_unseparated(scheduled_at);
        }
        if let Some(is_recurring) = changes.is_recurring {
            set.push("is_recurring = ");
            set.push_bind_unseparated(is_recurring);
        }
        if let Some(pattern) = changes.recurrence_pattern {
            set.push("recurrence_pattern = ");
            set.push_bind_unseparated(pattern);
        }
        if let Some(end_date) = changes.recurrence_end_date {
            set.push("recurrence_end_date = ");
            set.push_bind_unseparated(end_date);
        }
        if let Some(parent_id) = changes.parent_id {
            set.push("parent_id = ");
            set.push_bind_unseparated(parent_id);
        }

        set.push("updated_at = ");
        set.push_bind_unseparated(Utc::now());
    }
}

fn push_conjunction(qb: &mut QueryBuilder<'_, Sqlite>, first: &mut bool) {
    qb.push(if *first { " WHERE " } else { " AND " });
    *first = false;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::DateRange;
    use crate::models::TripStatus;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn test_empty_filter_has_no_where() {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM trips");
        SqlQueryBuilder::push_where_clause(&TripFilter::default(), &mut qb);
        assert_eq!(qb.sql(), "SELECT * FROM trips");
    }

    #[test]
    fn test_compound_membership_filter() {
        let filter = TripFilter {
            parent_id: Some(Uuid::now_v7()),
            job_number: Some("AA100".to_string()),
            scheduled: Some(DateRange::from(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM trips");
        SqlQueryBuilder::push_where_clause(&filter, &mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT * FROM trips WHERE parent_id = ? AND job_number = ? AND scheduled_at >= ?"
        );
    }

    #[test]
    fn test_set_clause_always_touches_updated_at() {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE trips SET ");
        SqlQueryBuilder::push_set_clause(&TripChanges::default(), &mut qb);
        assert_eq!(qb.sql(), "UPDATE trips SET updated_at = ?");

        let changes = TripChanges {
            status: Some(TripStatus::Assigned),
            driver: Some(None),
            ..Default::default()
        };
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE trips SET ");
        SqlQueryBuilder::push_set_clause(&changes, &mut qb);
        assert_eq!(
            qb.sql(),
            "UPDATE trips SET driver = ?, status = ?, updated_at = ?"
        );
    }
}
