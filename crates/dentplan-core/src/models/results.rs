//! Result types returned by mutating engine operations.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{ApprovalStatus, Item, PlanStatus};

/// Plan-level money fields at one point in time.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct CostSnapshot {
    pub total_cost: Decimal,
    pub discount_amount: Decimal,
    pub final_cost: Decimal,
}

/// Before/after snapshots around a ledger adjustment.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerChange {
    pub before: CostSnapshot,
    pub after: CostSnapshot,
}

impl LedgerChange {
    pub fn is_noop(&self) -> bool {
        self.before == self.after
    }
}

/// A plan-level clinical status change made by the cascade.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlanTransition {
    pub from: PlanStatus,
    pub to: PlanStatus,
}

/// Everything the auto-progression cascade changed in one operation.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CascadeReport {
    /// Next items moved PENDING -> READY_FOR_BOOKING
    pub activated_items: Vec<u64>,
    /// Items moved WAITING_FOR_PREREQUISITE -> READY_FOR_BOOKING
    pub unlocked_items: Vec<u64>,
    pub started_phases: Vec<u64>,
    pub completed_phases: Vec<u64>,
    pub plan_transition: Option<PlanTransition>,
}

impl CascadeReport {
    pub fn is_empty(&self) -> bool {
        self.activated_items.is_empty()
            && self.unlocked_items.is_empty()
            && self.started_phases.is_empty()
            && self.completed_phases.is_empty()
            && self.plan_transition.is_none()
    }
}

/// Outcome of `update_item_status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StatusUpdateResult {
    pub item: Item,
    /// False when the request asked for the item's current status
    pub changed: bool,
    pub ledger: Option<LedgerChange>,
    pub cascade: CascadeReport,
}

/// Outcome of `add_items_to_phase`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AddItemsResult {
    pub phase_id: u64,
    pub items: Vec<Item>,
    pub ledger: LedgerChange,
    pub approval_status: ApprovalStatus,
    /// True when the addition sent an approved plan back to review
    pub resubmitted: bool,
}

/// Outcome of `delete_item`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeleteItemResult {
    pub item: Item,
    pub ledger: LedgerChange,
    pub cascade: CascadeReport,
}

/// Outcome of `reorder_items`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReorderResult {
    pub phase_id: u64,
    pub items: Vec<Item>,
}

/// Outcome of the finance adjustment path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceUpdateResult {
    pub plan_code: String,
    pub updated_items: Vec<Item>,
    pub ledger: LedgerChange,
}
