//! Status sheet parser
//!
//! Converts the CSV export of the shared status sheet into [`LogEvent`]s.
//! Column headers are normalized (trimmed, lowercased) and run through a
//! synonym table so the sheet can evolve its header spellings without
//! breaking the loader.
//!
//! Table-level problems (missing required columns, empty input) fail the
//! whole load. Row-level problems never do: a row missing its document or
//! week is dropped, an unknown status coerces to `InProgress`, an unreadable
//! progress coerces to 0, and an unreadable timestamp leaves the event
//! without one. Every recovery is counted in [`ParseStats`].

use crate::formats::csv;
use crate::types::{LogError, LogEvent, Result, Status, Timestamp};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Serialize;

/// Required columns after header normalization
const REQUIRED_COLUMNS: &[&str] = &["timestamp", "week_no", "document", "status", "progress"];

/// Alternate header spellings accepted from the sheet
const COLUMN_SYNONYMS: &[(&str, &str)] = &[
    ("week", "week_no"),
    ("mingguke", "week_no"),
    ("minggu_ke", "week_no"),
    ("doc", "document"),
    ("nama dokumen", "document"),
    ("fase", "phase"),
    ("pic", "pic_role"),
    ("role", "pic_role"),
    ("updatedby", "updated_by"),
    ("note", "notes"),
    ("catatan", "notes"),
];

/// Timestamp formats the sheet is known to produce, tried in order after
/// RFC 3339. The slash format is day-first (form submissions).
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%d/%m/%Y %H:%M:%S", "%d/%m/%Y %H:%M"];
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

/// Result of parsing a status sheet
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedLog {
    /// Events in sheet order
    pub events: Vec<LogEvent>,
    /// Row-level recovery counters
    pub stats: ParseStats,
}

/// Counters for row-level coercions and drops during a load
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Data rows seen (excluding the header)
    pub rows_total: usize,
    /// Rows dropped for a missing document or unparseable week
    pub rows_dropped: usize,
    /// Rows whose status was outside the known set and coerced to InProgress
    pub status_coerced: usize,
    /// Rows whose progress was unreadable and coerced to 0
    pub progress_coerced: usize,
    /// Rows whose timestamp was missing or unreadable
    pub timestamps_missing: usize,
}

/// Column positions after header normalization
struct ColumnIndex {
    timestamp: usize,
    week_no: usize,
    document: usize,
    status: usize,
    progress: usize,
    notes: Option<usize>,
    updated_by: Option<usize>,
}

/// Parse the CSV export of the status sheet.
pub fn parse_log_csv(text: &str) -> Result<ParsedLog> {
    let records = csv::read_records(text);
    let Some((header, rows)) = records.split_first() else {
        return Err(LogError::EmptyTable);
    };

    let columns: Vec<String> = header.iter().map(|h| normalize_header(h)).collect();
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c == *required))
        .map(|c| c.to_string())
        .collect();
    if !missing.is_empty() {
        return Err(LogError::MissingColumns {
            missing,
            present: columns,
        });
    }

    let position = |name: &str| columns.iter().position(|c| c == name);
    let index = ColumnIndex {
        // Required columns were just checked
        timestamp: position("timestamp").unwrap_or_default(),
        week_no: position("week_no").unwrap_or_default(),
        document: position("document").unwrap_or_default(),
        status: position("status").unwrap_or_default(),
        progress: position("progress").unwrap_or_default(),
        notes: position("notes"),
        updated_by: position("updated_by"),
    };

    let mut events = Vec::with_capacity(rows.len());
    let mut stats = ParseStats::default();

    for row in rows {
        stats.rows_total += 1;
        match convert_row(row, &index, &mut stats) {
            Some(event) => events.push(event),
            None => {
                stats.rows_dropped += 1;
                log::debug!("dropping malformed log row: {:?}", row);
            }
        }
    }

    if stats.rows_dropped > 0 {
        log::warn!(
            "dropped {} of {} log rows (missing document or week)",
            stats.rows_dropped,
            stats.rows_total
        );
    }

    Ok(ParsedLog { events, stats })
}

/// Convert one data row, or return None if it must be dropped.
fn convert_row(row: &[String], index: &ColumnIndex, stats: &mut ParseStats) -> Option<LogEvent> {
    let cell = |i: usize| row.get(i).map(|s| s.trim()).unwrap_or("");
    let optional_cell = |i: Option<usize>| {
        i.map(cell)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
    };

    let document = cell(index.document);
    if document.is_empty() {
        return None;
    }
    let week_no = parse_week(cell(index.week_no))?;

    let timestamp = parse_timestamp(cell(index.timestamp));
    if timestamp.is_none() {
        stats.timestamps_missing += 1;
    }

    let status = match Status::parse(cell(index.status)) {
        Some(status) => status,
        None => {
            stats.status_coerced += 1;
            Status::InProgress
        }
    };

    let progress = match parse_progress(cell(index.progress)) {
        Some(progress) => progress,
        None => {
            stats.progress_coerced += 1;
            0.0
        }
    };

    Some(LogEvent {
        document: document.to_string(),
        timestamp,
        status,
        progress,
        week_no,
        note: optional_cell(index.notes),
        updated_by: optional_cell(index.updated_by),
    })
}

fn normalize_header(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    for (from, to) in COLUMN_SYNONYMS {
        if lowered == *from {
            return (*to).to_string();
        }
    }
    lowered
}

/// Week numbers may arrive as "3" or "3.0" depending on the export.
fn parse_week(cell: &str) -> Option<u32> {
    if let Ok(week) = cell.parse::<u32>() {
        return Some(week);
    }
    let as_float: f64 = cell.parse().ok()?;
    if as_float.is_finite() && as_float >= 0.0 {
        Some(as_float as u32)
    } else {
        None
    }
}

/// Progress may carry a stray percent sign. Clamped to [0, 100].
fn parse_progress(cell: &str) -> Option<f64> {
    let cleaned = cell.trim_end_matches('%').trim();
    let value: f64 = cleaned.parse().ok()?;
    if value.is_finite() {
        Some(value.clamp(0.0, 100.0))
    } else {
        None
    }
}

fn parse_timestamp(cell: &str) -> Option<Timestamp> {
    if cell.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(cell) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(cell, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(cell, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| Utc.from_utc_datetime(&naive));
        }
    }
    None
}
