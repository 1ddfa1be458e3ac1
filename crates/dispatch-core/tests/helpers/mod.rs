#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use dispatch_core::clock::FixedClock;
use dispatch_core::db::establish_connection;
use dispatch_core::error::CoreError;
use dispatch_core::gateway::{SqliteGateway, TripFilter, TripGateway};
use dispatch_core::models::{NewSeriesData, NewTrip, RecurrencePattern, SeriesConfig, Trip, TripChanges};
use dispatch_core::series::SeriesService;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use uuid::Uuid;

pub type TestService = SeriesService<Arc<FlakyGateway>, Arc<FixedClock>>;

/// A real SQLite gateway with switchable failures, for exercising partial
/// batches and the zero-result rule.
pub struct FlakyGateway {
    inner: SqliteGateway,
    failing_jobs: Mutex<HashSet<String>>,
    failing_dates: Mutex<HashSet<DateTime<Utc>>>,
    failing_updates: Mutex<HashSet<Uuid>>,
    failing_deletes: Mutex<HashSet<Uuid>>,
    failing_child_lists: Mutex<HashSet<Uuid>>,
    fail_all_updates: AtomicBool,
    fail_all_deletes: AtomicBool,
    pub writes: AtomicUsize,
}

impl FlakyGateway {
    pub fn new(inner: SqliteGateway) -> Self {
        Self {
            inner,
            failing_jobs: Mutex::default(),
            failing_dates: Mutex::default(),
            failing_updates: Mutex::default(),
            failing_deletes: Mutex::default(),
            failing_child_lists: Mutex::default(),
            fail_all_updates: AtomicBool::new(false),
            fail_all_deletes: AtomicBool::new(false),
            writes: AtomicUsize::new(0),
        }
    }

    /// Child creates for this job number fail; the parent create still works.
    pub fn fail_child_creates_for(&self, job_number: &str) {
        self.failing_jobs.lock().unwrap().insert(job_number.to_string());
    }

    pub fn fail_creates_at(&self, at: DateTime<Utc>) {
        self.failing_dates.lock().unwrap().insert(at);
    }

    pub fn fail_update_of(&self, id: Uuid) {
        self.failing_updates.lock().unwrap().insert(id);
    }

    pub fn fail_delete_of(&self, id: Uuid) {
        self.failing_deletes.lock().unwrap().insert(id);
    }

    pub fn fail_children_listing_of(&self, parent_id: Uuid) {
        self.failing_child_lists.lock().unwrap().insert(parent_id);
    }

    pub fn fail_all_updates(&self, fail: bool) {
        self.fail_all_updates.store(fail, Ordering::SeqCst);
    }

    pub fn fail_all_deletes(&self, fail: bool) {
        self.fail_all_deletes.store(fail, Ordering::SeqCst);
    }

    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn injected(what: &str) -> CoreError {
        CoreError::Persistence(format!("injected {} failure", what))
    }
}

#[async_trait]
impl TripGateway for FlakyGateway {
    async fn create(&self, trip: NewTrip) -> Result<Uuid, CoreError> {
        if trip.parent_id.is_some() && self.failing_jobs.lock().unwrap().contains(&trip.job_number) {
            return Err(Self::injected("create"));
        }
        if self.failing_dates.lock().unwrap().contains(&trip.scheduled_at) {
            return Err(Self::injected("create"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.create(trip).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<Trip>, CoreError> {
        self.inner.find(id).await
    }

    async fn list(&self, filter: &TripFilter) -> Result<Vec<Trip>, CoreError> {
        if let Some(parent_id) = filter.parent_id {
            if self.failing_child_lists.lock().unwrap().contains(&parent_id) {
                return Err(Self::injected("list"));
            }
        }
        self.inner.list(filter).await
    }

    async fn update(&self, id: Uuid, changes: &TripChanges) -> Result<Trip, CoreError> {
        if self.fail_all_updates.load(Ordering::SeqCst) || self.failing_updates.lock().unwrap().contains(&id) {
            return Err(Self::injected("update"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update(id, changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), CoreError> {
        if self.fail_all_deletes.load(Ordering::SeqCst) || self.failing_deletes.lock().unwrap().contains(&id) {
            return Err(Self::injected("delete"));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.delete(id).await
    }
}

/// A service over a fresh temporary database, with pacing disabled and the
/// clock pinned to `now`.
pub async fn setup_service(now: DateTime<Utc>) -> (TestService, Arc<FlakyGateway>, Arc<FixedClock>, TempDir) {
    setup_service_with(now, SeriesConfig { pacing_ms: 0, ..Default::default() }).await
}

pub async fn setup_service_with(
    now: DateTime<Utc>,
    config: SeriesConfig,
) -> (TestService, Arc<FlakyGateway>, Arc<FixedClock>, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    let gateway = Arc::new(FlakyGateway::new(SqliteGateway::new(pool)));
    let clock = Arc::new(FixedClock::new(now));
    let service = SeriesService::new(Arc::clone(&gateway), Arc::clone(&clock), config);

    (service, gateway, clock, temp_dir)
}

pub fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn series_seed(
    job_number: &str,
    scheduled_at: DateTime<Utc>,
    pattern: RecurrencePattern,
    end_date: NaiveDate,
) -> NewSeriesData {
    NewSeriesData {
        scheduled_at,
        pattern,
        end_date,
        job_number: job_number.to_string(),
        customer_name: "Acme Corp".to_string(),
        driver: None,
        pickup_location: "JFK Terminal 7".to_string(),
        dropoff_location: "Midtown Hilton".to_string(),
        passenger_count: 2,
        notes: None,
    }
}

pub fn standalone_trip(job_number: &str, scheduled_at: DateTime<Utc>) -> NewTrip {
    NewTrip {
        scheduled_at,
        job_number: job_number.to_string(),
        customer_name: "Walk-in".to_string(),
        pickup_location: "LGA Terminal B".to_string(),
        dropoff_location: "Brooklyn".to_string(),
        ..Default::default()
    }
}

/// Children of `parent_id` by compound identity, straight from storage.
pub async fn children(gateway: &FlakyGateway, parent_id: Uuid) -> Vec<Trip> {
    let parent = gateway
        .find(parent_id)
        .await
        .expect("find parent")
        .expect("parent exists");
    gateway
        .list(&TripFilter::children_of(&parent))
        .await
        .expect("list children")
}

pub async fn fetch(gateway: &FlakyGateway, id: Uuid) -> Option<Trip> {
    gateway.find(id).await.expect("find trip")
}
