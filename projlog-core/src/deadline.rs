//! Overdue and upcoming-deadline classification
//!
//! Pure derivations over the reconciled view. An item is overdue when the
//! current week has passed its target week and it is not Done; a Done item is
//! never overdue regardless of week.

use crate::types::ReconciledItem;
use serde::Serialize;

/// A reconciled item with its overdue flag
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedItem<'a> {
    #[serde(flatten)]
    pub item: &'a ReconciledItem,
    pub overdue: bool,
    /// Weeks past the target, 0 when not overdue
    pub weeks_late: u32,
}

/// True iff the item has missed its target week and is not Done.
pub fn is_overdue(item: &ReconciledItem, current_week: u32) -> bool {
    current_week > item.target_week && !item.is_done()
}

/// Flag every item with its overdue state.
pub fn flag_overdue(items: &[ReconciledItem], current_week: u32) -> Vec<FlaggedItem<'_>> {
    items
        .iter()
        .map(|item| {
            let overdue = is_overdue(item, current_week);
            FlaggedItem {
                item,
                overdue,
                weeks_late: if overdue {
                    current_week - item.target_week
                } else {
                    0
                },
            }
        })
        .collect()
}

/// The next `limit` not-yet-done items due at or after the current week,
/// ranked by ascending target week. Items sharing a target week keep their
/// baseline order.
pub fn upcoming_deadlines(
    items: &[ReconciledItem],
    current_week: u32,
    limit: usize,
) -> Vec<&ReconciledItem> {
    let mut upcoming: Vec<&ReconciledItem> = items
        .iter()
        .filter(|item| !item.is_done() && item.target_week >= current_week)
        .collect();
    // Stable sort preserves baseline order within a week
    upcoming.sort_by_key(|item| item.target_week);
    upcoming.truncate(limit);
    upcoming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{BaselineItem, Phase, ReconciledItem, Status};

    fn item(document: &str, target_week: u32, status: Status) -> ReconciledItem {
        let mut item = ReconciledItem::from_baseline(&BaselineItem {
            document: document.to_string(),
            phase: Phase::Planning,
            pic_role: "PM".to_string(),
            target_week,
        });
        item.status = status;
        item
    }

    #[test]
    fn test_overdue_truth_table() {
        // target_week=3, current_week=5: overdue unless Done
        assert!(is_overdue(&item("SRS", 3, Status::InProgress), 5));
        assert!(is_overdue(&item("SRS", 3, Status::NotStarted), 5));
        assert!(!is_overdue(&item("SRS", 3, Status::Done), 5));

        // Not yet past the target week
        assert!(!is_overdue(&item("SRS", 3, Status::InProgress), 3));
        assert!(!is_overdue(&item("SRS", 3, Status::InProgress), 1));
    }

    #[test]
    fn test_flag_overdue_weeks_late() {
        let items = vec![
            item("Charter", 1, Status::Done),
            item("SRS", 3, Status::InProgress),
            item("User Manual", 11, Status::NotStarted),
        ];
        let flagged = flag_overdue(&items, 5);
        assert_eq!(flagged.len(), 3);
        assert!(!flagged[0].overdue);
        assert!(flagged[1].overdue);
        assert_eq!(flagged[1].weeks_late, 2);
        assert!(!flagged[2].overdue);
        assert_eq!(flagged[2].weeks_late, 0);
    }

    #[test]
    fn test_upcoming_ranked_and_limited() {
        let items = vec![
            item("User Manual", 11, Status::NotStarted),
            item("Wireframe", 6, Status::InProgress),
            item("Risk Register", 6, Status::NotStarted),
            item("ERD", 5, Status::Done),
            item("SRS", 3, Status::InProgress),
        ];

        let upcoming = upcoming_deadlines(&items, 5, 10);
        let names: Vec<&str> = upcoming.iter().map(|i| i.document.as_str()).collect();
        // SRS is overdue (week 3 < 5), ERD is done; ties at week 6 keep input order
        assert_eq!(names, vec!["Wireframe", "Risk Register", "User Manual"]);

        let top_one = upcoming_deadlines(&items, 5, 1);
        assert_eq!(top_one.len(), 1);
        assert_eq!(top_one[0].document, "Wireframe");
    }

    #[test]
    fn test_upcoming_empty_when_all_done() {
        let items = vec![item("Charter", 1, Status::Done), item("SRS", 3, Status::Done)];
        assert!(upcoming_deadlines(&items, 1, 5).is_empty());
    }
}
