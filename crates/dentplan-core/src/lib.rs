//! Core library for the dentplan treatment-plan engine.
//!
//! A treatment plan is a patient's multi-phase course of dental care. Each
//! plan owns ordered phases, each phase owns ordered billable items. This
//! crate keeps the four concerns of that tree consistent inside one
//! transaction per request: the clinical status of every item, phase and
//! plan, the approval workflow, the running cost ledger, and the audit trail.
//!
//! # Layers
//!
//! - [`planner`]: async entry point used by the CLI and the MCP server
//! - `engine`: the operations themselves, one unit of work each
//! - [`rules`]: pure transition tables, guards and ledger arithmetic
//! - [`db`]: SQLite schema and queries
//! - [`collaborators`]: prerequisite rules, appointments and the audit sink
//! - [`models`], [`params`], [`display`]: data, requests and markdown output
//!
//! # Quick Start
//!
//! ```rust
//! use dentplan_core::{
//!     params::{CreateCustomPlan, NewItem, NewPhase, RegisterActor, RegisterPatient},
//!     PlannerBuilder,
//! };
//! use rust_decimal::Decimal;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("clinic.db"))
//!     .build()
//!     .await?;
//!
//! let admin = planner
//!     .register_actor(
//!         None,
//!         &RegisterActor {
//!             name: "Front desk".to_string(),
//!             role: "ADMIN".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! let patient = planner
//!     .register_patient(&admin, &RegisterPatient { name: "Jane Doe".to_string() })
//!     .await?;
//!
//! let plan = planner
//!     .create_custom_plan(
//!         &admin,
//!         &CreateCustomPlan {
//!             patient_id: patient.id,
//!             doctor_id: admin.id,
//!             name: "Hygiene".to_string(),
//!             phases: vec![NewPhase {
//!                 name: "Cleaning".to_string(),
//!                 items: vec![NewItem {
//!                     name: Some("Scaling".to_string()),
//!                     price: Some(Decimal::new(120, 0)),
//!                     quantity: 1,
//!                     ..Default::default()
//!                 }],
//!                 ..Default::default()
//!             }],
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! println!("{plan}");
//! # Ok(())
//! # }
//! ```

pub mod collaborators;
pub mod db;
pub mod display;
mod engine;
pub mod error;
pub mod models;
pub mod params;
pub mod planner;
pub mod rules;

// Re-export commonly used types
pub use collaborators::Collaborators;
pub use db::Database;
pub use display::{
    AuditTrail, CreateResult, LocalDateTime, Money, OperationStatus, PlanSummaries, UpdateResult,
};
pub use error::{ErrorKind, PlannerError, Result};
pub use models::{
    Actor, ApprovalStatus, Item, ItemStatus, Phase, PhaseStatus, Plan, PlanStatus, PlanSummary,
    RoleClass,
};
pub use params::{
    AddItems, CreateCustomPlan, CreatePlanFromTemplate, DecidePlan, Id, ListPlans, PlanCode,
    UpdateItemStatus,
};
pub use planner::{Planner, PlannerBuilder};
pub use rules::Decision;
