//! Approval workflow gates.
//!
//! The approval status is a second state machine next to the clinical status.
//! These functions decide which edit classes a plan accepts in its current
//! state; they never touch storage.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{codes, PlannerError, Result},
    models::{ApprovalStatus, ItemStatus, Phase, PlanStatus},
};

/// Reviewer decision on a plan pending review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Decision {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "approve" | "approved" => Ok(Decision::Approve),
            "reject" | "rejected" => Ok(Decision::Reject),
            _ => Err(format!("Invalid decision: {s}. Must be 'approve' or 'reject'")),
        }
    }
}

/// How an item addition interacts with the approval state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdditionPolicy {
    /// Approval status goes back to PENDING_REVIEW
    pub resubmit: bool,
    /// New items are activated right away instead of waiting for approval
    pub activate_immediately: bool,
}

/// Completed and cancelled plans accept nothing.
pub fn ensure_open(status: PlanStatus, action: &str) -> Result<()> {
    if status.is_terminal() {
        return Err(PlannerError::conflict(format!(
            "Cannot {action}: plan is {}",
            status.as_str()
        )));
    }
    Ok(())
}

/// Structural edits (update, delete, add phase) are DRAFT-only.
pub fn ensure_draft(approval: ApprovalStatus, action: &str) -> Result<()> {
    if approval != ApprovalStatus::Draft {
        return Err(PlannerError::conflict(format!(
            "Cannot {action}: plan approval status is {}, edits require DRAFT",
            approval.as_str()
        )));
    }
    Ok(())
}

/// Status and phase checks for `submit_for_review`.
pub fn ensure_submittable(approval: ApprovalStatus, phases: &[Phase]) -> Result<()> {
    if approval != ApprovalStatus::Draft {
        return Err(PlannerError::conflict(format!(
            "Only DRAFT plans can be submitted for review (current: {})",
            approval.as_str()
        )));
    }
    if phases.is_empty() {
        return Err(PlannerError::validation(
            codes::EMPTY_PLAN,
            "Plan has no phases",
        ));
    }
    if phases.iter().all(|phase| phase.items.is_empty()) {
        return Err(PlannerError::validation(
            codes::EMPTY_PLAN,
            "Plan has no items",
        ));
    }
    Ok(())
}

/// Checks for `decide`; returns the trimmed note.
pub fn ensure_decidable(
    approval: ApprovalStatus,
    decision: Decision,
    note: Option<&str>,
) -> Result<Option<String>> {
    if approval != ApprovalStatus::PendingReview {
        return Err(PlannerError::conflict(format!(
            "Plan is not pending review (current: {}); cannot {decision}",
            approval.as_str()
        )));
    }
    let note = note
        .map(str::trim)
        .filter(|note| !note.is_empty())
        .map(String::from);
    if decision == Decision::Reject && note.is_none() {
        return Err(PlannerError::validation(
            codes::REJECTION_NOTE_REQUIRED,
            "A note explaining the rejection is required",
        ));
    }
    Ok(note)
}

/// Approval status a decision leaves on the plan. A rejection returns the plan
/// to DRAFT; REJECTED only appears in the audit trail.
pub fn status_after(decision: Decision) -> ApprovalStatus {
    match decision {
        Decision::Approve => ApprovalStatus::Approved,
        Decision::Reject => ApprovalStatus::Draft,
    }
}

/// Gate for `add_items_to_phase`.
pub fn addition_policy(approval: ApprovalStatus, auto_submit: bool) -> Result<AdditionPolicy> {
    match approval {
        ApprovalStatus::Draft => Ok(AdditionPolicy {
            resubmit: false,
            activate_immediately: false,
        }),
        ApprovalStatus::Approved => Ok(AdditionPolicy {
            resubmit: auto_submit,
            activate_immediately: !auto_submit,
        }),
        ApprovalStatus::PendingReview | ApprovalStatus::Rejected => {
            Err(PlannerError::conflict(format!(
                "Cannot add items while plan is {}",
                approval.as_str()
            )))
        }
    }
}

/// Status changes that move money (entering or leaving SKIPPED) are frozen
/// while a reviewer looks at the plan.
pub fn ensure_ledger_editable(approval: ApprovalStatus, action: &str) -> Result<()> {
    if approval == ApprovalStatus::PendingReview {
        return Err(PlannerError::conflict(format!(
            "Cannot {action}: plan costs are frozen while PENDING_REVIEW"
        )));
    }
    Ok(())
}

/// Reordering is frozen while a reviewer looks at the plan.
pub fn ensure_reorderable(approval: ApprovalStatus) -> Result<()> {
    if approval == ApprovalStatus::PendingReview {
        return Err(PlannerError::conflict(
            "Cannot reorder items while plan is PENDING_REVIEW",
        ));
    }
    Ok(())
}

/// Status an approved PENDING item moves to.
pub fn activation_status(has_prerequisites: bool) -> ItemStatus {
    if has_prerequisites {
        ItemStatus::WaitingForPrerequisite
    } else {
        ItemStatus::ReadyForBooking
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn phase_with_items(count: usize) -> Phase {
        use jiff::Timestamp;
        use rust_decimal::Decimal;

        let now = Timestamp::now();
        Phase {
            id: 1,
            plan_id: 1,
            phase_number: 1,
            name: "Hygiene".into(),
            status: Default::default(),
            start_date: None,
            completion_date: None,
            estimated_days: None,
            items: (0..count)
                .map(|i| crate::models::Item {
                    id: i as u64 + 1,
                    phase_id: 1,
                    sequence: i as u32 + 1,
                    name: "Scaling".into(),
                    service_id: None,
                    price: Decimal::TEN,
                    estimated_minutes: None,
                    status: ItemStatus::Pending,
                    completed_at: None,
                    assigned_doctor_id: None,
                    notes: None,
                    price_override: None,
                    created_at: now,
                    updated_at: now,
                })
                .collect(),
        }
    }

    #[test]
    fn test_submit_empty_plan() {
        let err = ensure_submittable(ApprovalStatus::Draft, &[]).unwrap_err();
        assert_eq!(err.code(), Some(codes::EMPTY_PLAN));

        let err = ensure_submittable(ApprovalStatus::Draft, &[phase_with_items(0)]).unwrap_err();
        assert_eq!(err.code(), Some(codes::EMPTY_PLAN));

        assert!(ensure_submittable(ApprovalStatus::Draft, &[phase_with_items(1)]).is_ok());
    }

    #[test]
    fn test_submit_requires_draft() {
        for status in [ApprovalStatus::PendingReview, ApprovalStatus::Approved] {
            let err = ensure_submittable(status, &[phase_with_items(1)]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
    }

    #[test]
    fn test_reject_requires_note() {
        for note in [None, Some(""), Some("   ")] {
            let err = ensure_decidable(ApprovalStatus::PendingReview, Decision::Reject, note)
                .unwrap_err();
            assert_eq!(err.code(), Some(codes::REJECTION_NOTE_REQUIRED));
        }
        let note = ensure_decidable(
            ApprovalStatus::PendingReview,
            Decision::Reject,
            Some(" missing x-ray "),
        )
        .unwrap();
        assert_eq!(note.as_deref(), Some("missing x-ray"));
    }

    #[test]
    fn test_approve_without_note() {
        let note =
            ensure_decidable(ApprovalStatus::PendingReview, Decision::Approve, None).unwrap();
        assert_eq!(note, None);
    }

    #[test]
    fn test_decide_outside_review_is_conflict() {
        for status in [ApprovalStatus::Draft, ApprovalStatus::Approved] {
            let err = ensure_decidable(status, Decision::Approve, None).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
    }

    #[test]
    fn test_rejection_returns_to_draft() {
        assert_eq!(status_after(Decision::Reject), ApprovalStatus::Draft);
        assert_eq!(status_after(Decision::Approve), ApprovalStatus::Approved);
    }

    #[test]
    fn test_addition_policy() {
        assert_eq!(
            addition_policy(ApprovalStatus::Draft, true).unwrap(),
            AdditionPolicy {
                resubmit: false,
                activate_immediately: false
            }
        );
        assert_eq!(
            addition_policy(ApprovalStatus::Approved, true).unwrap(),
            AdditionPolicy {
                resubmit: true,
                activate_immediately: false
            }
        );
        assert_eq!(
            addition_policy(ApprovalStatus::Approved, false).unwrap(),
            AdditionPolicy {
                resubmit: false,
                activate_immediately: true
            }
        );
        let err = addition_policy(ApprovalStatus::PendingReview, true).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_structural_edits_need_draft() {
        assert!(ensure_draft(ApprovalStatus::Draft, "edit").is_ok());
        let err = ensure_draft(ApprovalStatus::Approved, "delete item").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("APPROVED"));
    }

    #[test]
    fn test_costs_frozen_during_review() {
        let err = ensure_ledger_editable(ApprovalStatus::PendingReview, "skip item").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        for status in [ApprovalStatus::Draft, ApprovalStatus::Approved] {
            assert!(ensure_ledger_editable(status, "skip item").is_ok());
        }
    }

    #[test]
    fn test_terminal_plans_are_closed() {
        assert!(ensure_open(PlanStatus::InProgress, "edit").is_ok());
        assert!(ensure_open(PlanStatus::Completed, "edit").is_err());
        assert!(ensure_open(PlanStatus::Cancelled, "edit").is_err());
    }

    #[test]
    fn test_decision_parsing() {
        assert_eq!("APPROVE".parse::<Decision>().unwrap(), Decision::Approve);
        assert_eq!("rejected".parse::<Decision>().unwrap(), Decision::Reject);
        assert!("maybe".parse::<Decision>().is_err());
    }

    #[test]
    fn test_activation_status() {
        assert_eq!(activation_status(true), ItemStatus::WaitingForPrerequisite);
        assert_eq!(activation_status(false), ItemStatus::ReadyForBooking);
    }
}
