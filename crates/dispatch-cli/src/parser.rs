use anyhow::Result;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_english::{parse_date_string, Dialect};

/// Parses "2024-03-04 07:30" or anything chrono-english understands
/// ("tomorrow 9am", "next friday"). All times are UTC.
pub fn parse_datetime(input: &str) -> Result<DateTime<Utc>> {
    if let Ok(naive) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    parse_date_string(input, Utc::now(), Dialect::Us)
        .map_err(|e| anyhow::anyhow!("Failed to parse date '{}': {}", input, e))
}

/// Parses a calendar day, ISO first, then free text.
pub fn parse_date(input: &str) -> Result<NaiveDate> {
    if let Ok(date) = input.parse::<NaiveDate>() {
        return Ok(date);
    }
    Ok(parse_datetime(input)?.date_naive())
}
