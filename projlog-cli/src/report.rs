//! Report generation (text / HTML / JSON)
//!
//! Renders one snapshot into a self-contained report. The text format is the
//! terminal default; HTML produces a standalone page; JSON serializes the
//! full derived view for downstream tooling.

use crate::state::Snapshot;
use anyhow::{Context, Result};
use clap::ValueEnum;
use projlog_core::{flag_overdue, role_workload, upcoming_deadlines};
use std::fmt::Write as _;

/// How many upcoming deadlines the report surfaces
const UPCOMING_LIMIT: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Text,
    Html,
    Json,
}

/// Render a snapshot in the requested format.
pub fn render(snapshot: &Snapshot, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(render_text(snapshot)),
        ReportFormat::Html => Ok(render_html(snapshot)),
        ReportFormat::Json => render_json(snapshot),
    }
}

fn render_text(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let flagged = flag_overdue(&snapshot.items, snapshot.current_week);
    let overdue_count = flagged.iter().filter(|f| f.overdue).count();
    let summary = &snapshot.summary;

    // writeln! into a String cannot fail; results are discarded throughout
    let _ = writeln!(out, "═══════════════════════════════════════════════");
    let _ = writeln!(out, "  {} - Week {}", snapshot.project, snapshot.current_week);
    let _ = writeln!(out, "═══════════════════════════════════════════════");
    if snapshot.degraded {
        let _ = writeln!(out, "  ⚠ log unavailable, showing baseline only");
    }
    let _ = writeln!(out);

    let _ = writeln!(out, "Overview");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    let _ = writeln!(
        out,
        "  Documents:    {} total | {} done ({:.0}%) | {} in progress | {} not started",
        summary.total,
        summary.done,
        summary.done_pct(),
        summary.in_progress,
        summary.not_started
    );
    let _ = writeln!(out, "  Avg progress: {:.1}%", summary.avg_progress);
    let _ = writeln!(out, "  Overdue:      {}", overdue_count);
    let _ = writeln!(out);

    let _ = writeln!(out, "Documents");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    for entry in &flagged {
        let item = entry.item;
        let marker = if entry.overdue { "⚠" } else { " " };
        let _ = writeln!(
            out,
            "  {} {:<32} {:<12} {:<11} wk {:>2}  {:>5.0}%  {}",
            marker,
            item.document,
            item.phase.to_string(),
            item.pic_role,
            item.target_week,
            item.progress,
            item.status
        );
    }
    let _ = writeln!(out);

    if overdue_count > 0 {
        let _ = writeln!(out, "Overdue");
        let _ = writeln!(out, "───────────────────────────────────────────────");
        for entry in flagged.iter().filter(|f| f.overdue) {
            let _ = writeln!(
                out,
                "  {} - {} week(s) late (target: week {}, PIC: {})",
                entry.item.document, entry.weeks_late, entry.item.target_week, entry.item.pic_role
            );
        }
        let _ = writeln!(out);
    }

    let upcoming = upcoming_deadlines(&snapshot.items, snapshot.current_week, UPCOMING_LIMIT);
    if !upcoming.is_empty() {
        let _ = writeln!(out, "Next deadlines");
        let _ = writeln!(out, "───────────────────────────────────────────────");
        for item in upcoming {
            let _ = writeln!(
                out,
                "  week {:>2}  {} (PIC: {})",
                item.target_week, item.document, item.pic_role
            );
        }
        let _ = writeln!(out);
    }

    let evm = &snapshot.evm;
    let _ = writeln!(out, "Earned Value (week {})", evm.week);
    let _ = writeln!(out, "───────────────────────────────────────────────");
    if evm.has_data() {
        let _ = writeln!(out, "  BAC {:>12.0}   PV {:>12.0}", evm.bac, evm.pv);
        let _ = writeln!(out, "  EV  {:>12.0}   AC {:>12.0}", evm.ev, evm.ac);
        let _ = writeln!(out, "  SV  {:>12.0}   CV {:>12.0}", evm.sv, evm.cv);
        let _ = writeln!(out, "  SPI {:>12.2}   CPI {:>11.2}", evm.spi, evm.cpi);
        let _ = writeln!(out, "  EAC {:>12.0}   VAC {:>11.0}", evm.eac, evm.vac);
        let _ = writeln!(out, "  Health: {}", evm.rag());
    } else {
        let _ = writeln!(out, "  no earned value reported for this week yet");
    }
    let _ = writeln!(out);

    let workloads = role_workload(&snapshot.items);
    let _ = writeln!(out, "Workload by role");
    let _ = writeln!(out, "───────────────────────────────────────────────");
    for workload in &workloads {
        let _ = writeln!(
            out,
            "  {:<11} {} task(s): {} done, {} in progress, {} not started",
            workload.role,
            workload.total(),
            workload.done,
            workload.in_progress,
            workload.not_started
        );
    }

    if !snapshot.weekly_activity.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "Update activity");
        let _ = writeln!(out, "───────────────────────────────────────────────");
        for (week, count) in &snapshot.weekly_activity {
            let _ = writeln!(out, "  week {:>2}: {} update(s)", week, count);
        }
    }

    if let Some(stats) = &snapshot.parse_stats {
        if stats.rows_dropped > 0 || stats.status_coerced > 0 || stats.progress_coerced > 0 {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "Note: {} of {} log rows dropped, {} status and {} progress values coerced",
                stats.rows_dropped, stats.rows_total, stats.status_coerced, stats.progress_coerced
            );
        }
    }

    out
}

fn render_html(snapshot: &Snapshot) -> String {
    let mut out = String::new();
    let flagged = flag_overdue(&snapshot.items, snapshot.current_week);
    let overdue_count = flagged.iter().filter(|f| f.overdue).count();
    let summary = &snapshot.summary;
    let evm = &snapshot.evm;

    let _ = writeln!(out, "<!DOCTYPE html>");
    let _ = writeln!(out, "<html><head><meta charset=\"utf-8\">");
    let _ = writeln!(out, "<title>{} - Week {}</title>", escape(&snapshot.project), snapshot.current_week);
    let _ = writeln!(
        out,
        "<style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse;margin-bottom:1.5em}}th,td{{border:1px solid #ccc;padding:4px 10px;text-align:left}}.overdue{{color:#b00}}</style>"
    );
    let _ = writeln!(out, "</head><body>");
    let _ = writeln!(
        out,
        "<h1>{} - Week {}</h1>",
        escape(&snapshot.project),
        snapshot.current_week
    );
    if snapshot.degraded {
        let _ = writeln!(out, "<p><em>Log unavailable, showing baseline only.</em></p>");
    }

    let _ = writeln!(out, "<h2>Overview</h2>");
    let _ = writeln!(
        out,
        "<p>{} documents: {} done ({:.0}%), {} in progress, {} not started. \
         Average progress {:.1}%. {} overdue.</p>",
        summary.total,
        summary.done,
        summary.done_pct(),
        summary.in_progress,
        summary.not_started,
        summary.avg_progress,
        overdue_count
    );

    let _ = writeln!(out, "<h2>Documents</h2>");
    let _ = writeln!(
        out,
        "<table><tr><th>Document</th><th>Phase</th><th>PIC</th><th>Target week</th>\
         <th>Status</th><th>Progress</th></tr>"
    );
    for entry in &flagged {
        let item = entry.item;
        let class = if entry.overdue { " class=\"overdue\"" } else { "" };
        let _ = writeln!(
            out,
            "<tr{}><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{:.0}%</td></tr>",
            class,
            escape(&item.document),
            item.phase,
            escape(&item.pic_role),
            item.target_week,
            item.status,
            item.progress
        );
    }
    let _ = writeln!(out, "</table>");

    let _ = writeln!(out, "<h2>Earned value (week {})</h2>", evm.week);
    if evm.has_data() {
        let _ = writeln!(
            out,
            "<table><tr><th>BAC</th><th>PV</th><th>EV</th><th>AC</th><th>SV</th><th>CV</th>\
             <th>SPI</th><th>CPI</th><th>EAC</th><th>VAC</th><th>Health</th></tr>"
        );
        let _ = writeln!(
            out,
            "<tr><td>{:.0}</td><td>{:.0}</td><td>{:.0}</td><td>{:.0}</td><td>{:.0}</td>\
             <td>{:.0}</td><td>{:.2}</td><td>{:.2}</td><td>{:.0}</td><td>{:.0}</td><td>{}</td></tr>",
            evm.bac, evm.pv, evm.ev, evm.ac, evm.sv, evm.cv, evm.spi, evm.cpi, evm.eac, evm.vac,
            evm.rag()
        );
        let _ = writeln!(out, "</table>");
    } else {
        let _ = writeln!(out, "<p>No earned value reported for this week yet.</p>");
    }

    let _ = writeln!(out, "<h2>Workload by role</h2>");
    let _ = writeln!(
        out,
        "<table><tr><th>Role</th><th>Done</th><th>In progress</th><th>Not started</th></tr>"
    );
    for workload in role_workload(&snapshot.items) {
        let _ = writeln!(
            out,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&workload.role),
            workload.done,
            workload.in_progress,
            workload.not_started
        );
    }
    let _ = writeln!(out, "</table>");

    let _ = writeln!(out, "</body></html>");
    out
}

fn render_json(snapshot: &Snapshot) -> Result<String> {
    let flagged = flag_overdue(&snapshot.items, snapshot.current_week);
    let value = serde_json::json!({
        "project": snapshot.project,
        "current_week": snapshot.current_week,
        "generated_at": snapshot.generated_at,
        "degraded": snapshot.degraded,
        "summary": snapshot.summary,
        "evm": snapshot.evm,
        "rag": snapshot.evm.has_data().then(|| snapshot.evm.rag().to_string()),
        "documents": flagged,
        "upcoming": upcoming_deadlines(&snapshot.items, snapshot.current_week, UPCOMING_LIMIT),
        "role_workload": role_workload(&snapshot.items),
        "weekly_activity": snapshot.weekly_activity,
        "parse_stats": snapshot.parse_stats,
    });
    serde_json::to_string_pretty(&value).context("Failed to serialize JSON report")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use projlog_core::{
        compute_evm, reconcile, BaselineItem, EvmSnapshot, Phase, StatusSummary,
    };

    fn snapshot() -> Snapshot {
        let baseline = vec![
            BaselineItem {
                document: "Project Charter".to_string(),
                phase: Phase::Initiation,
                pic_role: "PM".to_string(),
                target_week: 1,
            },
            BaselineItem {
                document: "SRS & Use Cases".to_string(),
                phase: Phase::Planning,
                pic_role: "BA/SA".to_string(),
                target_week: 3,
            },
        ];
        let items = reconcile(&baseline, &[]);
        let summary = StatusSummary::from_items(&items);
        let series = vec![EvmSnapshot { week: 5, pv: 240_000.0, ev: 230_000.0, ac: 260_000.0 }];

        Snapshot {
            project: "Office Supplies".to_string(),
            current_week: 5,
            generated_at: Utc::now(),
            degraded: false,
            summary,
            evm: compute_evm(&series, 5, 500_000.0),
            parse_stats: None,
            weekly_activity: vec![(1, 2), (2, 1)],
            items,
        }
    }

    #[test]
    fn test_text_report_sections() {
        let text = render(&snapshot(), ReportFormat::Text).unwrap();
        assert!(text.contains("Office Supplies - Week 5"));
        assert!(text.contains("Overview"));
        assert!(text.contains("Project Charter"));
        // Both items are overdue at week 5 (weeks 1 and 3, not done)
        assert!(text.contains("Overdue"));
        assert!(text.contains("Earned Value (week 5)"));
        assert!(text.contains("Workload by role"));
    }

    #[test]
    fn test_html_report_escapes_names() {
        let html = render(&snapshot(), ReportFormat::Html).unwrap();
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("SRS &amp; Use Cases"));
        assert!(!html.contains("SRS & Use Cases"));
    }

    #[test]
    fn test_json_report_round_trips() {
        let json = render(&snapshot(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["project"], "Office Supplies");
        assert_eq!(value["current_week"], 5);
        assert_eq!(value["documents"].as_array().unwrap().len(), 2);
        // Overdue flag flattened alongside the item fields
        assert_eq!(value["documents"][0]["overdue"], true);
        assert_eq!(value["documents"][0]["document"], "Project Charter");
        assert_eq!(value["rag"], "AMBER");
    }
}
