use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dispatch_core::models::{RecurrencePattern, TripChanges};
use dispatch_core::recurrence::{end_of_day, OccurrenceExpander};

fn anchor() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 31, 7, 30, 0).unwrap()
}

fn bench_expansion_by_pattern(c: &mut Criterion) {
    let expander = OccurrenceExpander::default();
    let end = NaiveDate::from_ymd_opt(2025, 12, 31).unwrap();

    let mut group = c.benchmark_group("expansion_by_pattern");

    for pattern in [RecurrencePattern::Daily, RecurrencePattern::Weekly, RecurrencePattern::Monthly] {
        group.bench_with_input(
            BenchmarkId::new("pattern", pattern),
            &pattern,
            |b, pattern| {
                b.iter(|| {
                    expander
                        .expand(black_box(anchor()), black_box(*pattern), black_box(end))
                        .unwrap()
                })
            },
        );
    }
    group.finish();
}

fn bench_expansion_by_span(c: &mut Criterion) {
    let expander = OccurrenceExpander::default();

    let mut group = c.benchmark_group("daily_expansion_span");

    for days in [7, 30, 90, 365].iter() {
        let bound = anchor() + Duration::days(*days);
        group.bench_with_input(BenchmarkId::new("days", days), days, |b, _| {
            b.iter(|| expander.expand_until(black_box(anchor()), RecurrencePattern::Daily, black_box(bound)))
        });
    }
    group.finish();
}

fn bench_safety_cap(c: &mut Criterion) {
    let expander = OccurrenceExpander::default();
    // Far enough out that every run hits the cap.
    let end = NaiveDate::from_ymd_opt(2099, 12, 31).unwrap();

    c.bench_function("expansion_hitting_safety_cap", |b| {
        b.iter(|| {
            expander
                .expand(black_box(anchor()), RecurrencePattern::Daily, black_box(end))
                .unwrap()
        })
    });
}

fn bench_end_of_day(c: &mut Criterion) {
    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();

    c.bench_function("end_of_day", |b| b.iter(|| end_of_day(black_box(date))));
}

fn bench_cancellation_detection(c: &mut Criterion) {
    let edits = vec![
        TripChanges::default(),
        TripChanges::stop_recurrence(),
        TripChanges {
            recurrence_pattern: Some(None),
            ..Default::default()
        },
        TripChanges {
            driver: Some(Some("Dana".to_string())),
            ..Default::default()
        },
    ];

    c.bench_function("cancellation_trigger", |b| {
        b.iter(|| {
            edits
                .iter()
                .filter_map(|changes| black_box(changes).cancellation_trigger())
                .count()
        })
    });
}

criterion_group!(
    benches,
    bench_expansion_by_pattern,
    bench_expansion_by_span,
    bench_safety_cap,
    bench_end_of_day,
    bench_cancellation_detection
);
criterion_main!(benches);
