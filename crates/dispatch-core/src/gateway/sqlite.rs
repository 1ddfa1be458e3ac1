use crate::db::DbPool;
use crate::error::CoreError;
use crate::gateway::query_builder::SqlQueryBuilder;
use crate::gateway::{TripFilter, TripGateway};
use crate::models::{NewTrip, Trip, TripChanges};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite};
use uuid::Uuid;

/// SQLite implementation of the trip gateway
pub struct SqliteGateway {
    pool: DbPool,
}

impl SqliteGateway {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub(crate) fn pool(&self) -> &DbPool {
        &self.pool
    }

    /// Trips whose id ends with `short_id` (hyphens ignored), for resolving
    /// the abbreviated ids the CLI prints. UUIDv7 ids lead with a timestamp,
    /// so only the trailing digits tell trips of one batch apart.
    pub async fn find_by_short_id(&self, short_id: &str) -> Result<Vec<Trip>, CoreError> {
        let mut pattern = String::from("%");
        pattern.extend(
            short_id
                .chars()
                .filter(|c| *c != '-')
                .map(|c| c.to_ascii_lowercase()),
        );

        let trips = sqlx::query_as("SELECT * FROM trips WHERE lower(hex(id)) LIKE $1 ORDER BY scheduled_at")
            .bind(pattern)
            .fetch_all(self.pool())
            .await?;
        Ok(trips)
    }
}

#[async_trait]
impl TripGateway for SqliteGateway {
    async fn create(&self, trip: NewTrip) -> Result<Uuid, CoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();

        sqlx::query(
            r#"INSERT INTO trips (id, is_recurring, parent_id, recurrence_pattern, recurrence_end_date, scheduled_at,
                occurrence_at, job_number, customer_name, driver, pickup_location, dropoff_location, passenger_count, status, notes,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)"#,
        )
        .bind(id)
        .bind(trip.is_recurring)
        .bind(trip.parent_id)
        .bind(trip.recurrence_pattern)
        .bind(trip.recurrence_end_date)
        .bind(trip.scheduled_at)
        .bind(trip.occurrence_at)
        .bind(&trip.job_number)
        .bind(&trip.customer_name)
        .bind(&trip.driver)
        .bind(&trip.pickup_location)
        .bind(&trip.dropoff_location)
        .bind(trip.passenger_count)
        .bind(trip.status)
        .bind(&trip.notes)
        .bind(now)
        .bind(now)
        .execute(self.pool())
        .await?;

        tracing::debug!(%id, job_number = %trip.job_number, scheduled_at = %trip.scheduled_at, "trip created");
        Ok(id)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Trip>, CoreError> {
        let trip = sqlx::query_as("SELECT * FROM trips WHERE id = $1")
            .bind(id)
            .fetch_optional(self.pool())
            .await?;
        Ok(trip)
    }

    async fn list(&self, filter: &TripFilter) -> Result<Vec<Trip>, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT * FROM trips");
        SqlQueryBuilder::push_where_clause(filter, &mut qb);
        qb.push(" ORDER BY scheduled_at, id");

        let trips = qb.build_query_as().fetch_all(self.pool()).await?;
        Ok(trips)
    }

    async fn update(&self, id: Uuid, changes: &TripChanges) -> Result<Trip, CoreError> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE trips SET ");
        SqlQueryBuilder::push_set_clause(changes, &mut qb);
        qb.push(" WHERE id = ");
        qb.push_bind(id);
        qb.push(" RETURNING *");

        let trip = qb
            .build_query_as()
            .fetch_optional(self.pool())
            .await?
            .ok_or_else(|| CoreError::NotFound(id.to_string()))?;

        tracing::debug!(%id, "trip updated");
        Ok(trip)
    }

    async fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        let result = sqlx::query("DELETE FROM trips WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::NotFound(id.to_string()));
        }

        tracing::debug!(%id, "trip deleted");
        Ok(())
    }
}
