//! Aggregate metrics over the reconciled view and the raw event log
//!
//! Everything here is derived on demand; nothing is cached or mutated in
//! place.

use crate::types::{LogEvent, ReconciledItem, Status};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::BTreeMap;

/// Headline counts for the overview panel
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub done: usize,
    pub in_progress: usize,
    pub not_started: usize,
    /// Mean progress across all items, 0 for an empty baseline
    pub avg_progress: f64,
}

impl StatusSummary {
    pub fn from_items(items: &[ReconciledItem]) -> Self {
        let mut summary = StatusSummary {
            total: items.len(),
            done: 0,
            in_progress: 0,
            not_started: 0,
            avg_progress: 0.0,
        };
        for item in items {
            match item.status {
                Status::Done => summary.done += 1,
                Status::InProgress => summary.in_progress += 1,
                Status::NotStarted => summary.not_started += 1,
            }
        }
        if !items.is_empty() {
            summary.avg_progress =
                items.iter().map(|i| i.progress).sum::<f64>() / items.len() as f64;
        }
        summary
    }

    /// Share of items done, in percent.
    pub fn done_pct(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64 * 100.0
        }
    }
}

/// Per-role status counts for the workload panel
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleWorkload {
    pub role: String,
    pub done: usize,
    pub in_progress: usize,
    pub not_started: usize,
}

impl RoleWorkload {
    pub fn total(&self) -> usize {
        self.done + self.in_progress + self.not_started
    }
}

/// Status counts per owning role, ordered by first appearance in the
/// baseline.
pub fn role_workload(items: &[ReconciledItem]) -> Vec<RoleWorkload> {
    let mut workloads: Vec<RoleWorkload> = Vec::new();
    for item in items {
        let position = match workloads.iter().position(|w| w.role == item.pic_role) {
            Some(position) => position,
            None => {
                workloads.push(RoleWorkload {
                    role: item.pic_role.clone(),
                    done: 0,
                    in_progress: 0,
                    not_started: 0,
                });
                workloads.len() - 1
            }
        };
        let workload = &mut workloads[position];
        match item.status {
            Status::Done => workload.done += 1,
            Status::InProgress => workload.in_progress += 1,
            Status::NotStarted => workload.not_started += 1,
        }
    }
    workloads
}

/// Update counts per reported week, ascending.
pub fn weekly_activity(events: &[LogEvent]) -> Vec<(u32, usize)> {
    let mut counts: BTreeMap<u32, usize> = BTreeMap::new();
    for event in events {
        *counts.entry(event.week_no).or_insert(0) += 1;
    }
    counts.into_iter().collect()
}

/// 1-based project week for a given date, clamped to [1, total_weeks].
///
/// Dates before the project start count as week 1.
pub fn current_week(start: NaiveDate, today: NaiveDate, total_weeks: u32) -> u32 {
    let total_weeks = total_weeks.max(1);
    let delta_days = (today - start).num_days();
    if delta_days < 0 {
        return 1;
    }
    let week = (delta_days / 7 + 1) as u32;
    week.clamp(1, total_weeks)
}
