//! Data models for treatment plans.
//!
//! This module contains the domain models of the treatment-plan aggregate:
//! a [`Plan`] owns ordered [`Phase`]s, each phase owns ordered [`Item`]s.
//! Parent links are identifiers, never back-pointers, so the aggregate is a
//! plain tree that can be loaded and saved as a unit.
//!
//! Display implementations live in [`crate::display::models`], keeping the
//! data structures free of presentation logic.
//!
//! # Examples
//!
//! ```rust
//! use dentplan_core::models::{Item, ItemStatus};
//! use jiff::Timestamp;
//! use rust_decimal::Decimal;
//!
//! let item = Item {
//!     id: 1,
//!     phase_id: 1,
//!     sequence: 1,
//!     name: "Scaling".to_string(),
//!     service_id: None,
//!     price: Decimal::new(150, 0),
//!     estimated_minutes: Some(30),
//!     status: ItemStatus::Skipped,
//! #   completed_at: None,
//! #   assigned_doctor_id: None,
//! #   notes: None,
//! #   price_override: None,
//! #   created_at: Timestamp::now(),
//! #   updated_at: Timestamp::now(),
//! };
//! assert_eq!(item.billable_price(), Decimal::ZERO);
//! ```

pub mod actor;
pub mod audit;
pub mod catalog;
pub mod filters;
pub mod item;
pub mod phase;
pub mod plan;
pub mod results;
pub mod status;
pub mod summary;

#[cfg(test)]
mod tests;

pub use actor::{Actor, Patient, RoleClass};
pub use audit::{AuditAction, AuditEntity, AuditEntry};
pub use catalog::{Service, Template, TemplateItem, TemplatePhase};
pub use filters::PlanFilter;
pub use item::{Item, LinkedAppointment, PriceOverride};
pub use phase::Phase;
pub use plan::Plan;
pub use results::{
    AddItemsResult, CascadeReport, CostSnapshot, DeleteItemResult, LedgerChange,
    PlanTransition, PriceUpdateResult, ReorderResult, StatusUpdateResult,
};
pub use status::{AppointmentStatus, ApprovalStatus, ItemStatus, PhaseStatus, PlanStatus};
pub use summary::PlanSummary;
