//! Parsing and display helpers for command line input and output.

use anyhow::{bail, Result};
use chrono::{DateTime, NaiveDate, Utc};
use tripjournal_core::models::{Event, Trip};

/// Parse a date given on the command line.
/// Accepts RFC 3339 (`2024-05-01T09:30:00Z`) or a bare `YYYY-MM-DD` (midnight UTC).
pub fn parse_date(input: &str) -> Result<DateTime<Utc>> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
            return Ok(midnight.and_utc());
        }
    }
    bail!("Invalid date {input:?} - expected YYYY-MM-DD or an RFC 3339 timestamp")
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// One line per trip for `trips list`
pub fn trip_row(trip: &Trip) -> String {
    format!(
        "{:>6}  {:<30}  {}  ({} days)",
        trip.id.to_string(),
        truncate_string(&trip.name, 30),
        trip.formatted_range(),
        trip.duration_days()
    )
}

/// Multi-line description of a trip with its events
pub fn trip_detail(trip: &Trip) -> String {
    let mut out = format!("{} [{}]\n{}\n", trip.name, trip.id, trip.formatted_range());
    if trip.events.is_empty() {
        out.push_str("  no events\n");
    }
    for event in &trip.events {
        out.push_str(&event_line(event));
        out.push('\n');
    }
    out
}

fn event_line(event: &Event) -> String {
    let mut line = format!(
        "  {:>6}  {}  {}",
        event.id.to_string(),
        event.date.format("%b %d, %Y %H:%M"),
        event.name
    );
    if let Some(location) = &event.location {
        line.push_str(&format!(" @ {}", location.display()));
    }
    if !event.medias.is_empty() {
        line.push_str(&format!(" ({} photos)", event.medias.len()));
    }
    line
}
