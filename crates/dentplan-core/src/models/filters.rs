//! Filter types for querying plans.

use jiff::Timestamp;

use super::{ApprovalStatus, PlanStatus};

/// Filter options for querying plans.
#[derive(Debug, Clone, Default)]
pub struct PlanFilter {
    /// Filter by plan name (case-insensitive partial match)
    pub name_contains: Option<String>,

    pub patient_id: Option<u64>,

    /// Plans created by this actor
    pub created_by: Option<u64>,

    pub status: Option<PlanStatus>,

    pub approval_status: Option<ApprovalStatus>,

    /// Filter by creation date range
    pub created_after: Option<Timestamp>,
    pub created_before: Option<Timestamp>,

    /// Hide completed and cancelled plans
    pub open_only: bool,
}

impl PlanFilter {
    /// Filter for the plans of a single patient.
    pub fn for_patient(patient_id: u64) -> Self {
        Self {
            patient_id: Some(patient_id),
            ..Default::default()
        }
    }
}
