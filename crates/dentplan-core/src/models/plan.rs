//! Plan aggregate root.

use jiff::{civil::Date, Timestamp};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApprovalStatus, CostSnapshot, Item, Phase, PlanStatus};

/// A patient's multi-phase treatment engagement and its financial envelope.
///
/// The plan owns its phases, each phase owns its items. Parent links are plain
/// identifiers (`Phase::plan_id`, `Item::phase_id`); the aggregate is loaded and
/// saved as a unit.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub id: u64,

    /// Human-facing unique code (`TP-YYYYMMDD-NNNN`)
    pub code: String,

    pub name: String,

    pub patient_id: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,

    /// Responsible doctor
    pub doctor_id: u64,

    /// Owning actor; staff mutations are restricted to this actor
    pub created_by: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<u64>,

    #[serde(default)]
    pub status: PlanStatus,

    #[serde(default)]
    pub approval_status: ApprovalStatus,

    pub total_cost: Decimal,
    pub discount_amount: Decimal,

    /// Always `total_cost - discount_amount`
    pub final_cost: Decimal,

    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,

    pub approved_by: Option<u64>,
    pub approved_at: Option<Timestamp>,

    /// Note left by the last approval or rejection
    pub approval_note: Option<String>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,

    #[serde(default)]
    pub phases: Vec<Phase>,
}

impl Plan {
    pub fn costs(&self) -> CostSnapshot {
        CostSnapshot {
            total_cost: self.total_cost,
            discount_amount: self.discount_amount,
            final_cost: self.final_cost,
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.phases.iter().flat_map(|phase| phase.items.iter())
    }

    pub fn item(&self, item_id: u64) -> Option<&Item> {
        self.items().find(|item| item.id == item_id)
    }

    pub fn phase(&self, phase_id: u64) -> Option<&Phase> {
        self.phases.iter().find(|phase| phase.id == phase_id)
    }

    pub fn item_count(&self) -> usize {
        self.phases.iter().map(|phase| phase.items.len()).sum()
    }
}
