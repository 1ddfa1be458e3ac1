use chrono::{DateTime, Duration, Months, NaiveDate, Utc};

use crate::error::{CoreError, SafetyLimitExceeded};
use crate::models::RecurrencePattern;

/// Upper bound on occurrences produced by a single expansion.
pub const DEFAULT_MAX_EXPANSIONS: usize = 1000;

impl RecurrencePattern {
    /// Moves `from` forward by one unit of this pattern.
    ///
    /// Monthly steps keep the day of month when it exists and clamp to the
    /// last day otherwise (Jan 31 -> Feb 29). Because each step starts from the
    /// previous result, a clamped day carries forward. Returns `None` only at
    /// the edge of chrono's representable range.
    #[inline]
    pub fn advance(&self, from: DateTime<Utc>) -> Option<DateTime<Utc>> {
        match self {
            RecurrencePattern::Daily => from.checked_add_signed(Duration::days(1)),
            RecurrencePattern::Weekly => from.checked_add_signed(Duration::weeks(1)),
            RecurrencePattern::Monthly => from.checked_add_months(Months::new(1)),
        }
    }
}

/// The last instant of `date` in UTC. Recurrence end dates are inclusive, so
/// anything scheduled on that calendar day is still in range.
pub fn end_of_day(date: NaiveDate) -> DateTime<Utc> {
    match date.succ_opt().and_then(|next| next.and_hms_opt(0, 0, 0)) {
        Some(midnight) => midnight.and_utc() - Duration::nanoseconds(1),
        None => DateTime::<Utc>::MAX_UTC,
    }
}

/// Rejects an end date that falls before the anchor's calendar day.
pub fn validate_range(anchor: DateTime<Utc>, end_date: NaiveDate) -> Result<(), CoreError> {
    if end_date < anchor.date_naive() {
        return Err(CoreError::Validation(format!(
            "Recurrence end date {} is before the first trip on {}",
            end_date,
            anchor.date_naive()
        )));
    }
    Ok(())
}

/// Result of one expansion: the generated instants plus the safety-cap
/// warning, if the cap cut the sequence short.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Expansion {
    pub dates: Vec<DateTime<Utc>>,
    pub limit_reached: Option<SafetyLimitExceeded>,
}

impl Expansion {
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.dates.len()
    }
}

/// Turns a recurrence rule into concrete trip instants.
///
/// Pure: no clock, no storage. The same inputs always produce the same
/// sequence, which the window extender relies on to resume from the last
/// persisted trip.
#[derive(Debug, Clone, Copy)]
pub struct OccurrenceExpander {
    limit: usize,
}

impl Default for OccurrenceExpander {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_EXPANSIONS)
    }
}

impl OccurrenceExpander {
    pub fn new(limit: usize) -> Self {
        Self { limit }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Instants strictly after `anchor`, one pattern unit apart, up to and
    /// including the whole of `end_date`.
    ///
    /// # Errors
    /// `CoreError::Validation` if `end_date` is before the anchor's day.
    pub fn expand(
        &self,
        anchor: DateTime<Utc>,
        pattern: RecurrencePattern,
        end_date: NaiveDate,
    ) -> Result<Expansion, CoreError> {
        validate_range(anchor, end_date)?;
        Ok(self.expand_until(anchor, pattern, end_of_day(end_date)))
    }

    /// Same stepping rule as [`expand`](Self::expand) but bounded by an
    /// instant and without range validation; an already-passed bound simply
    /// yields nothing.
    pub fn expand_until(
        &self,
        anchor: DateTime<Utc>,
        pattern: RecurrencePattern,
        bound: DateTime<Utc>,
    ) -> Expansion {
        let mut dates = Vec::new();
        let mut current = anchor;

        while let Some(next) = pattern.advance(current) {
            if next > bound {
                break;
            }
            if dates.len() >= self.limit {
                let warning = SafetyLimitExceeded { limit: self.limit };
                tracing::warn!(
                    %anchor,
                    %pattern,
                    %bound,
                    limit = self.limit,
                    "recurrence expansion hit its safety limit, returning partial sequence"
                );
                return Expansion {
                    dates,
                    limit_reached: Some(warning),
                };
            }
            dates.push(next);
            current = next;
        }

        Expansion {
            dates,
            limit_reached: None,
        }
    }
}

/// Expands with the default safety limit.
pub fn expand(
    anchor: DateTime<Utc>,
    pattern: RecurrencePattern,
    end_date: NaiveDate,
) -> Result<Expansion, CoreError> {
    OccurrenceExpander::default().expand(anchor, pattern, end_date)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;
    use rstest::rstest;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 9, 30, 0).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    mod expansion_tests {
        use super::*;

        #[test]
        fn test_weekly_includes_boundary_day() {
            let expansion = expand(at(2024, 1, 1), RecurrencePattern::Weekly, date(2024, 1, 15)).unwrap();
            assert_eq!(expansion.dates, vec![at(2024, 1, 8), at(2024, 1, 15)]);
            assert!(expansion.limit_reached.is_none());
        }

        #[test]
        fn test_daily_three_day_window() {
            let expansion = expand(at(2024, 3, 1), RecurrencePattern::Daily, date(2024, 3, 3)).unwrap();
            assert_eq!(expansion.dates, vec![at(2024, 3, 2), at(2024, 3, 3)]);
        }

        #[test]
        fn test_late_evening_trip_on_end_date_is_kept() {
            let anchor = Utc.with_ymd_and_hms(2024, 5, 1, 23, 45, 0).unwrap();
            let expansion = expand(anchor, RecurrencePattern::Daily, date(2024, 5, 2)).unwrap();
            assert_eq!(expansion.dates, vec![Utc.with_ymd_and_hms(2024, 5, 2, 23, 45, 0).unwrap()]);
        }

        #[test]
        fn test_end_date_equal_to_anchor_day_yields_nothing() {
            let expansion = expand(at(2024, 3, 1), RecurrencePattern::Daily, date(2024, 3, 1)).unwrap();
            assert!(expansion.is_empty());
        }

        #[test]
        fn test_end_before_anchor_is_rejected() {
            let result = expand(at(2024, 3, 10), RecurrencePattern::Weekly, date(2024, 3, 9));
            assert!(matches!(result, Err(CoreError::Validation(_))));
        }

        #[rstest]
        #[case(RecurrencePattern::Daily, date(2024, 1, 31), 30)]
        #[case(RecurrencePattern::Weekly, date(2024, 3, 31), 12)]
        #[case(RecurrencePattern::Monthly, date(2024, 12, 31), 11)]
        fn test_counts_per_pattern(
            #[case] pattern: RecurrencePattern,
            #[case] end: NaiveDate,
            #[case] expected: usize,
        ) {
            let expansion = expand(at(2024, 1, 1), pattern, end).unwrap();
            assert_eq!(expansion.len(), expected);
        }

        #[test]
        fn test_monthly_clamps_and_carries_day() {
            let expansion = expand(at(2024, 1, 31), RecurrencePattern::Monthly, date(2024, 4, 30)).unwrap();
            assert_eq!(
                expansion.dates,
                vec![at(2024, 2, 29), at(2024, 3, 29), at(2024, 4, 29)]
            );
        }
    }

    mod safety_limit_tests {
        use super::*;

        #[test]
        fn test_cap_returns_partial_sequence() {
            let expander = OccurrenceExpander::new(5);
            let expansion = expander
                .expand(at(2024, 1, 1), RecurrencePattern::Daily, date(2024, 12, 31))
                .unwrap();
            assert_eq!(expansion.len(), 5);
            assert_eq!(expansion.limit_reached, Some(SafetyLimitExceeded { limit: 5 }));
            assert_eq!(expansion.dates.last(), Some(&at(2024, 1, 6)));
        }

        #[test]
        fn test_exact_fit_does_not_warn() {
            let expander = OccurrenceExpander::new(2);
            let expansion = expander
                .expand(at(2024, 3, 1), RecurrencePattern::Daily, date(2024, 3, 3))
                .unwrap();
            assert_eq!(expansion.len(), 2);
            assert!(expansion.limit_reached.is_none());
        }

        #[test]
        fn test_default_cap_on_long_daily_rule() {
            let expansion = expand(at(2024, 1, 1), RecurrencePattern::Daily, date(2030, 1, 1)).unwrap();
            assert_eq!(expansion.len(), DEFAULT_MAX_EXPANSIONS);
            assert!(expansion.limit_reached.is_some());
        }
    }

    mod bound_tests {
        use super::*;

        #[test]
        fn test_expand_until_past_bound_is_empty() {
            let expander = OccurrenceExpander::default();
            let expansion = expander.expand_until(at(2024, 6, 1), RecurrencePattern::Daily, at(2024, 5, 1));
            assert!(expansion.is_empty());
        }

        #[test]
        fn test_expand_until_instant_bound() {
            let expander = OccurrenceExpander::default();
            let bound = Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap();
            let expansion = expander.expand_until(at(2024, 6, 1), RecurrencePattern::Daily, bound);
            // 06-04 09:30 is past the 09:00 bound
            assert_eq!(expansion.dates, vec![at(2024, 6, 2), at(2024, 6, 3)]);
        }

        #[test]
        fn test_end_of_day() {
            let eod = end_of_day(date(2024, 2, 29));
            assert_eq!(eod.date_naive(), date(2024, 2, 29));
            assert_eq!(eod + Duration::nanoseconds(1), Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        }
    }

    fn pattern_strategy() -> impl Strategy<Value = RecurrencePattern> {
        prop_oneof![
            Just(RecurrencePattern::Daily),
            Just(RecurrencePattern::Weekly),
            Just(RecurrencePattern::Monthly),
        ]
    }

    proptest! {
        #[test]
        fn prop_expansion_is_deterministic(
            start_day in 0i64..3650,
            span in 0i64..400,
            pattern in pattern_strategy(),
        ) {
            let anchor = at(2020, 1, 1) + Duration::days(start_day);
            let end = (anchor + Duration::days(span)).date_naive();
            let first = expand(anchor, pattern, end).unwrap();
            let second = expand(anchor, pattern, end).unwrap();
            prop_assert_eq!(first, second);
        }

        #[test]
        fn prop_expansion_is_strictly_increasing_and_bounded(
            start_day in 0i64..3650,
            span in 0i64..800,
            pattern in pattern_strategy(),
        ) {
            let anchor = at(2020, 1, 1) + Duration::days(start_day);
            let end = (anchor + Duration::days(span)).date_naive();
            let expansion = expand(anchor, pattern, end).unwrap();

            if let Some(first) = expansion.dates.first() {
                prop_assert!(*first > anchor);
            }
            for pair in expansion.dates.windows(2) {
                prop_assert!(pair[0] < pair[1]);
            }
            for dt in &expansion.dates {
                prop_assert!(*dt <= end_of_day(end));
            }
        }

        #[test]
        fn prop_resuming_from_a_prefix_matches_full_expansion(
            span in 1i64..200,
            cut in 0usize..50,
            pattern in pattern_strategy(),
        ) {
            let anchor = at(2024, 1, 1);
            let end = (anchor + Duration::days(span)).date_naive();
            let full = expand(anchor, pattern, end).unwrap().dates;
            prop_assume!(cut < full.len());

            let resumed = expand(full[cut], pattern, end).unwrap().dates;
            prop_assert_eq!(&full[cut + 1..], &resumed[..]);
        }
    }
}
