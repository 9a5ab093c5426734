//! Project Status Log Library
//!
//! A stateless, reusable library for turning a project status log (the CSV
//! export of a shared status sheet) into a reconciled per-deliverable view,
//! with Earned Value Management metrics and deadline classification on top.
//!
//! # Architecture
//!
//! This library is intentionally minimal and focused on derivation:
//! - Parses the status sheet and emits typed log events
//! - Merges events against a static baseline plan (latest event wins)
//! - Computes EVM indices and the RAG health classification
//! - Flags overdue items and ranks upcoming deadlines
//!
//! The library does NOT:
//! - Fetch anything over the network
//! - Cache or refresh data
//! - Render reports
//!
//! All higher-level functionality is in the application layer (projlog-cli).
//! Every function here is a pure derivation over its inputs; calling it twice
//! on identical data yields identical results.
//!
//! # Example Usage
//!
//! ```
//! use projlog_core::{parse_log_csv, reconcile, BaselineItem, Phase};
//!
//! let baseline = vec![BaselineItem {
//!     document: "Project Charter".to_string(),
//!     phase: Phase::Initiation,
//!     pic_role: "PM".to_string(),
//!     target_week: 1,
//! }];
//!
//! let csv = "timestamp,week,document,status,progress\n\
//!            2025-11-12 09:30:00,1,Project Charter,Done,100";
//! let parsed = parse_log_csv(csv).unwrap();
//! let items = reconcile(&baseline, &parsed.events);
//!
//! assert_eq!(items.len(), 1);
//! assert!(items[0].is_done());
//! ```

// Public modules
pub mod deadline;
pub mod evm;
pub mod formats;
pub mod reconcile;
pub mod summary;
pub mod types;

// Re-export main types for convenience
pub use deadline::{flag_overdue, is_overdue, upcoming_deadlines, FlaggedItem};
pub use evm::{classify, compute_evm, EvmResult, EvmSnapshot, RagStatus};
pub use formats::{parse_log_csv, ParseStats, ParsedLog};
pub use reconcile::reconcile;
pub use summary::{current_week, role_workload, weekly_activity, RoleWorkload, StatusSummary};
pub use types::{
    BaselineItem, LogError, LogEvent, Phase, ReconciledItem, Result, Status, Timestamp,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_end_to_end_pipeline() {
        let baseline = vec![
            BaselineItem {
                document: "Project Charter".to_string(),
                phase: Phase::Initiation,
                pic_role: "PM".to_string(),
                target_week: 1,
            },
            BaselineItem {
                document: "SRS".to_string(),
                phase: Phase::Planning,
                pic_role: "BA/SA".to_string(),
                target_week: 3,
            },
        ];

        let csv = "timestamp,week,document,status,progress,notes\n\
                   2025-11-12 09:00:00,1,Project Charter,Selesai,100,signed off\n\
                   2025-11-20 14:00:00,2,SRS,Proses,35,first draft\n";
        let parsed = parse_log_csv(csv).unwrap();
        let items = reconcile(&baseline, &parsed.events);

        let summary = StatusSummary::from_items(&items);
        assert_eq!(summary.done, 1);
        assert_eq!(summary.in_progress, 1);

        // Week 5: SRS (target week 3, still in progress) is overdue
        let flagged = flag_overdue(&items, 5);
        assert!(flagged.iter().any(|f| f.item.document == "SRS" && f.overdue));
    }
}
