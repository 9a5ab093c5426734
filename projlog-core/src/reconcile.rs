//! Status reconciliation
//!
//! Merges the append-only event log against the static baseline to produce
//! the current view per document. The baseline drives the document set:
//! every baseline entry yields exactly one [`ReconciledItem`], and events for
//! documents the baseline does not know are inert.

use crate::types::{BaselineItem, LogEvent, ReconciledItem, Timestamp};
use std::collections::HashMap;

/// Merge baseline and events into the current per-document view.
///
/// For each document the winning event is selected by a max-by-timestamp
/// reduction over its events. Events without a parseable timestamp cannot be
/// ordered and never win. When two events carry the identical timestamp, the
/// later occurrence in input order wins.
///
/// Pure function: no shared state, identical inputs yield identical output.
pub fn reconcile(baseline: &[BaselineItem], events: &[LogEvent]) -> Vec<ReconciledItem> {
    let mut latest: HashMap<&str, (Timestamp, &LogEvent)> = HashMap::new();
    for event in events {
        let Some(timestamp) = event.timestamp else {
            continue;
        };
        latest
            .entry(event.document.as_str())
            .and_modify(|(winner_ts, winner)| {
                // >= so equal timestamps resolve to the later occurrence
                if timestamp >= *winner_ts {
                    *winner_ts = timestamp;
                    *winner = event;
                }
            })
            .or_insert((timestamp, event));
    }

    baseline
        .iter()
        .map(|item| match latest.get(item.document.as_str()) {
            Some((timestamp, event)) => ReconciledItem {
                document: item.document.clone(),
                phase: item.phase,
                pic_role: item.pic_role.clone(),
                target_week: item.target_week,
                status: event.status,
                progress: event.progress,
                last_update: Some(*timestamp),
                last_update_week: Some(event.week_no),
                note: event.note.clone(),
                updated_by: event.updated_by.clone(),
            },
            None => ReconciledItem::from_baseline(item),
        })
        .collect()
}
