//! Plan summary types and functionality.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApprovalStatus, Plan, PlanStatus};

/// Summary information about a plan with item statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanSummary {
    pub id: u64,
    pub code: String,
    pub name: String,
    pub patient_id: u64,
    pub patient_name: Option<String>,
    pub status: PlanStatus,
    pub approval_status: ApprovalStatus,
    pub final_cost: Decimal,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub total_phases: u32,
    pub total_items: u32,
    /// Completed or skipped items
    pub resolved_items: u32,
}

impl PlanSummary {
    /// Resolved items as a whole percentage; empty plans report 0.
    pub fn progress_percent(&self) -> u32 {
        if self.total_items == 0 {
            0
        } else {
            self.resolved_items * 100 / self.total_items
        }
    }
}

impl From<&Plan> for PlanSummary {
    fn from(plan: &Plan) -> Self {
        let total_items = plan.item_count() as u32;
        let resolved_items = plan
            .items()
            .filter(|item| item.status.is_resolved())
            .count() as u32;

        Self {
            id: plan.id,
            code: plan.code.clone(),
            name: plan.name.clone(),
            patient_id: plan.patient_id,
            patient_name: plan.patient_name.clone(),
            status: plan.status,
            approval_status: plan.approval_status,
            final_cost: plan.final_cost,
            created_at: plan.created_at,
            updated_at: plan.updated_at,
            total_phases: plan.phases.len() as u32,
            total_items,
            resolved_items,
        }
    }
}

