//! Item model definition and related functionality.

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{AppointmentStatus, ItemStatus};

/// Who changed an item's price snapshot, when, and why.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceOverride {
    pub updated_by: u64,
    pub updated_at: Timestamp,
    pub reason: Option<String>,
}

/// A single billable clinical step within a phase.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub id: u64,

    /// ID of the parent phase
    pub phase_id: u64,

    /// Position within the phase, contiguous from 1
    pub sequence: u32,

    pub name: String,

    /// Linked catalog service, if any
    pub service_id: Option<u64>,

    /// Price snapshot taken when the item was created
    pub price: Decimal,

    pub estimated_minutes: Option<u32>,

    pub status: ItemStatus,

    /// Set iff `status == Completed`
    pub completed_at: Option<Timestamp>,

    pub assigned_doctor_id: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_override: Option<PriceOverride>,

    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Item {
    /// Price currently counted in the plan total. Skipped items contribute
    /// nothing.
    pub fn billable_price(&self) -> Decimal {
        if self.status == ItemStatus::Skipped {
            Decimal::ZERO
        } else {
            self.price
        }
    }
}

/// Read-only view of an externally scheduled appointment bound to an item.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkedAppointment {
    pub id: u64,
    pub item_id: u64,
    pub status: AppointmentStatus,
    pub scheduled_at: Option<Timestamp>,
}
