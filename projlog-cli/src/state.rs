//! Refresh cycle and last-good state retention
//!
//! The dashboard owns the plan, the log source, and the last successfully
//! loaded event set. Each refresh performs at most one fetch and then
//! recomputes the whole derived view from scratch; a failed fetch or parse
//! keeps the previous event set, so the visible state is never half-updated.

use crate::config::AppConfig;
use crate::fetch::LogFetcher;
use anyhow::{Context, Result};
use chrono::Utc;
use projlog_core::{
    compute_evm, parse_log_csv, reconcile, weekly_activity, EvmResult, LogEvent, ParseStats,
    ParsedLog, ReconciledItem, StatusSummary, Timestamp,
};
use serde::Serialize;
use std::fs;
use std::path::PathBuf;

/// Where the status log comes from
pub enum LogSource {
    /// The status sheet CSV export, fetched over HTTP
    Http(LogFetcher),
    /// A local CSV file (offline runs, tests)
    File(PathBuf),
    /// No source configured; baseline-only mode
    None,
}

/// One fully computed view of the project, replaced atomically per refresh
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub project: String,
    pub current_week: u32,
    pub generated_at: Timestamp,
    /// True when a source is configured but no log data has been loaded yet;
    /// every item then shows its baseline default
    pub degraded: bool,
    pub items: Vec<ReconciledItem>,
    pub summary: StatusSummary,
    pub evm: EvmResult,
    pub parse_stats: Option<ParseStats>,
    pub weekly_activity: Vec<(u32, usize)>,
}

pub struct Dashboard {
    config: AppConfig,
    source: LogSource,
    events: Vec<LogEvent>,
    parse_stats: Option<ParseStats>,
    have_log: bool,
    snapshot: Snapshot,
}

impl Dashboard {
    /// Build a dashboard with a baseline-only snapshot. Call
    /// [`Dashboard::refresh`] to load the log.
    pub fn new(config: AppConfig, source: LogSource, current_week: u32) -> Self {
        let degraded = !matches!(source, LogSource::None);
        let snapshot = build_snapshot(&config, &[], None, current_week, degraded);
        Self {
            config,
            source,
            events: Vec::new(),
            parse_stats: None,
            have_log: false,
            snapshot,
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// One refresh cycle: a single fetch attempt, then a full recompute.
    ///
    /// On fetch or parse failure the previous event set stays in place and
    /// only the derived view is recomputed (the week may have moved on), so
    /// the dashboard keeps showing the last good data.
    pub fn refresh(&mut self, current_week: u32) {
        match self.load_log() {
            Ok(Some(parsed)) => {
                log::debug!("loaded {} log events", parsed.events.len());
                self.events = parsed.events;
                self.parse_stats = Some(parsed.stats);
                self.have_log = true;
            }
            Ok(None) => {
                log::info!("no log source configured, reporting baseline only");
            }
            Err(e) => {
                if self.have_log {
                    log::warn!("log refresh failed, keeping last good data: {e:#}");
                } else {
                    log::warn!("log unavailable, falling back to baseline-only data: {e:#}");
                }
            }
        }

        let degraded = !matches!(self.source, LogSource::None) && !self.have_log;
        self.snapshot = build_snapshot(
            &self.config,
            &self.events,
            self.parse_stats,
            current_week,
            degraded,
        );
    }

    fn load_log(&mut self) -> Result<Option<ParsedLog>> {
        let body = match &mut self.source {
            LogSource::None => return Ok(None),
            LogSource::Http(fetcher) => fetcher.fetch()?,
            LogSource::File(path) => fs::read_to_string(&*path)
                .with_context(|| format!("Failed to read log file: {:?}", path))?,
        };
        let parsed = parse_log_csv(&body).context("Failed to parse status log CSV")?;
        Ok(Some(parsed))
    }
}

/// Pure derivation of the snapshot from plan + events.
fn build_snapshot(
    config: &AppConfig,
    events: &[LogEvent],
    parse_stats: Option<ParseStats>,
    current_week: u32,
    degraded: bool,
) -> Snapshot {
    let items = reconcile(&config.baseline, events);
    let summary = StatusSummary::from_items(&items);
    let evm = compute_evm(
        &config.evm,
        current_week,
        config.project.budget_at_completion,
    );

    Snapshot {
        project: config.project.name.clone(),
        current_week,
        generated_at: Utc::now(),
        degraded,
        summary,
        evm,
        parse_stats,
        weekly_activity: weekly_activity(events),
        items,
    }
}
