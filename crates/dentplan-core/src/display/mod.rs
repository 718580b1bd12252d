//! Display formatting for models, collections and operation results.
//!
//! Domain models implement `Display` directly; collections and operation
//! outcomes go through small wrapper types. Everything renders as markdown,
//! which the CLI feeds to the terminal renderer and the MCP server returns
//! as tool output:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │  Domain Models  │    │ Wrappers and    │    │   Formatted     │
//! │ (Plan, Item...) │───▶│ Result Types    │───▶│    Output       │
//! │                 │    │                 │    │  (Terminal/MCP) │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`collections`]: PlanSummaries, AuditTrail and catalog listings
//! - [`results`]: CreateResult, UpdateResult and engine result formatting
//! - [`status`]: OperationStatus confirmations
//! - [`datetime`]: timestamps in the system timezone
//! - [`money`]: two-decimal currency amounts
//! - [`models`]: Display implementations for domain models
//!
//! ## Usage Examples
//!
//! ```rust
//! use dentplan_core::display::OperationStatus;
//!
//! let status = OperationStatus::success("Prerequisite recorded".to_string());
//! assert_eq!(status.to_string(), "Success: Prerequisite recorded\n");
//! ```

pub mod collections;
pub mod datetime;
pub mod models;
pub mod money;
pub mod results;
pub mod status;

pub use collections::{Actors, Appointments, AuditTrail, Patients, PlanSummaries, Services, Templates};
pub use datetime::LocalDateTime;
pub use money::Money;
pub use results::{CreateResult, UpdateResult};
pub use status::OperationStatus;
