//! Core types for the project status log reader
//!
//! This module defines the tabular types the rest of the library operates on:
//! the static baseline plan, raw log events as parsed from the status sheet,
//! and the reconciled per-document view produced by merging the two.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Timestamp type used throughout the library
pub type Timestamp = DateTime<Utc>;

/// Result type for log loading operations
pub type Result<T> = std::result::Result<T, LogError>;

/// Errors that can occur while loading a status log table
///
/// These are table-level failures only. Malformed individual rows never
/// produce an error; they are coerced or dropped and counted in
/// [`ParseStats`](crate::formats::ParseStats).
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("required columns missing: {missing:?} (columns present: {present:?})")]
    MissingColumns {
        missing: Vec<String>,
        present: Vec<String>,
    },

    #[error("log table is empty (no header row)")]
    EmptyTable,
}

/// Completion status of a tracked document
///
/// The reconciler never transitions status itself; it reports whatever the
/// latest event asserts. A document may legally jump from NotStarted to Done
/// or revert from Done to InProgress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Status {
    #[default]
    NotStarted,
    InProgress,
    Done,
}

impl Status {
    /// Parse a status cell, accepting common spellings from the source sheet.
    ///
    /// Matching is case-insensitive after trimming. Returns `None` for values
    /// outside the known set; callers coerce those to [`Status::InProgress`].
    pub fn parse(s: &str) -> Option<Status> {
        match s.trim().to_lowercase().as_str() {
            "not started" | "notstarted" | "not_started" | "todo" | "pending" | "belum" => {
                Some(Status::NotStarted)
            }
            "in progress" | "inprogress" | "in_progress" | "ongoing" | "wip" | "proses" => {
                Some(Status::InProgress)
            }
            "done" | "complete" | "completed" | "finished" | "selesai" => Some(Status::Done),
            _ => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::NotStarted => write!(f, "Not Started"),
            Status::InProgress => write!(f, "In Progress"),
            Status::Done => write!(f, "Done"),
        }
    }
}

/// Project phase a deliverable belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Initiation,
    Planning,
    Controlling,
    Closing,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Initiation => write!(f, "Initiation"),
            Phase::Planning => write!(f, "Planning"),
            Phase::Controlling => write!(f, "Controlling"),
            Phase::Closing => write!(f, "Closing"),
        }
    }
}

/// One entry of the static baseline plan
///
/// The baseline is defined at startup and never mutated. `document` is the
/// unique key events are matched against; duplicate names are rejected by
/// config validation before they reach the reconciler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BaselineItem {
    /// Deliverable name (unique key)
    pub document: String,
    /// Project phase this deliverable belongs to
    pub phase: Phase,
    /// Role responsible for the deliverable (PIC = person in charge)
    pub pic_role: String,
    /// Week the deliverable is due, 1-based
    pub target_week: u32,
}

/// A single update event parsed from the status log
///
/// Events are append-only; a document may have zero or many of them.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogEvent {
    /// Document the update refers to
    pub document: String,
    /// When the update was submitted. `None` when the source cell was missing
    /// or unparseable; such events exist but can never win "latest" selection.
    pub timestamp: Option<Timestamp>,
    /// Asserted status
    pub status: Status,
    /// Reported progress in [0, 100]
    pub progress: f64,
    /// Project week the update reports on, 1-based
    pub week_no: u32,
    /// Free-form note
    pub note: Option<String>,
    /// Who submitted the update
    pub updated_by: Option<String>,
}

/// A baseline entry overlaid with the latest known status from the log
///
/// Exactly one of these exists per [`BaselineItem`], whether or not any event
/// mentions the document. Events for documents absent from the baseline are
/// inert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledItem {
    pub document: String,
    pub phase: Phase,
    pub pic_role: String,
    pub target_week: u32,
    /// Latest asserted status, or NotStarted if no event exists
    pub status: Status,
    /// Latest reported progress, or 0 if no event exists
    pub progress: f64,
    /// Timestamp of the winning event, if any
    pub last_update: Option<Timestamp>,
    /// Week the winning event reported on, if any
    pub last_update_week: Option<u32>,
    pub note: Option<String>,
    pub updated_by: Option<String>,
}

impl ReconciledItem {
    /// Build the default view for a baseline entry with no log events.
    pub fn from_baseline(item: &BaselineItem) -> Self {
        Self {
            document: item.document.clone(),
            phase: item.phase,
            pic_role: item.pic_role.clone(),
            target_week: item.target_week,
            status: Status::NotStarted,
            progress: 0.0,
            last_update: None,
            last_update_week: None,
            note: None,
            updated_by: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.status == Status::Done
    }
}
