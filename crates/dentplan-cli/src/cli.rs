//! Command-line argument definitions using clap
//!
//! Every command gets a clap `Args` struct that converts into the matching
//! core parameter type, so clap attributes never leak into the core crate:
//!
//! ```text
//! User Input → CLI Args (clap) → Core Params → Engine
//! ```
//!
//! Conversions that cannot fail are `From` impls. Commands that read a JSON
//! file (custom plan phases, templates) expose a fallible `into_params()`.

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use dentplan_core::{params::*, Decision};
use jiff::{civil::Date, Timestamp};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;

fn read_json<T: DeserializeOwned>(path: &PathBuf) -> Result<T> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Invalid JSON in {}", path.display()))
}

// ============================================================================
// Plan commands
// ============================================================================

/// Create a custom plan
///
/// Phases come either from a JSON file holding an array of phases with their
/// items, or from repeated --phase flags that create empty phases to be
/// filled with `item add`.
#[derive(Args)]
pub struct CreatePlanArgs {
    /// Name of the plan
    pub name: String,
    #[arg(long, help = "ID of the patient the plan is for")]
    pub patient: u64,
    #[arg(long, help = "ID of the responsible doctor")]
    pub doctor: u64,
    #[arg(long, help = "Plan-level discount amount")]
    pub discount: Option<Decimal>,
    #[arg(long, help = "Planned start date (YYYY-MM-DD)")]
    pub start: Option<Date>,
    #[arg(
        long = "phase",
        value_name = "NAME",
        conflicts_with = "phases_file",
        help = "Add an empty phase; repeat for more phases"
    )]
    pub phases: Vec<String>,
    #[arg(
        long,
        value_name = "FILE",
        help = "JSON file with an array of phases: [{\"name\", \"estimated_days\", \"items\": [...]}]"
    )]
    pub phases_file: Option<PathBuf>,
}

impl CreatePlanArgs {
    pub fn into_params(self) -> Result<CreateCustomPlan> {
        let phases = match &self.phases_file {
            Some(path) => read_json::<Vec<NewPhase>>(path)?,
            None => self
                .phases
                .into_iter()
                .map(|name| NewPhase {
                    name,
                    ..Default::default()
                })
                .collect(),
        };
        Ok(CreateCustomPlan {
            patient_id: self.patient,
            doctor_id: self.doctor,
            name: self.name,
            discount: self.discount,
            start_date: self.start,
            phases,
        })
    }
}

/// Create a plan from a catalog template
///
/// Item prices are copied from the template, or from the catalog when the
/// template does not override them. The doctor's specialization must match
/// the template's.
#[derive(Args)]
pub struct FromTemplateArgs {
    #[arg(help = "ID of the template to instantiate")]
    pub template_id: u64,
    #[arg(long, help = "ID of the patient the plan is for")]
    pub patient: u64,
    #[arg(long, help = "ID of the responsible doctor")]
    pub doctor: u64,
    #[arg(long, help = "Plan name; defaults to the template name")]
    pub name: Option<String>,
    #[arg(long, help = "Plan-level discount amount")]
    pub discount: Option<Decimal>,
    #[arg(long, help = "Planned start date (YYYY-MM-DD)")]
    pub start: Option<Date>,
}

impl From<FromTemplateArgs> for CreatePlanFromTemplate {
    fn from(val: FromTemplateArgs) -> Self {
        CreatePlanFromTemplate {
            patient_id: val.patient,
            doctor_id: val.doctor,
            template_id: val.template_id,
            name: val.name,
            discount: val.discount,
            start_date: val.start,
        }
    }
}

/// List plans visible to the acting user
#[derive(Args)]
pub struct ListPlansArgs {
    #[arg(long, help = "Only plans of this patient")]
    pub patient: Option<u64>,
    #[arg(long, help = "Clinical status (pending, in_progress, completed, cancelled)")]
    pub status: Option<String>,
    #[arg(long, help = "Approval status (draft, pending_review, approved)")]
    pub approval: Option<String>,
    #[arg(long, help = "Case-insensitive name fragment")]
    pub name: Option<String>,
    #[arg(long, help = "Only plans created by the acting user")]
    pub mine: bool,
    #[arg(long, help = "Hide completed and cancelled plans")]
    pub open: bool,
}

impl From<ListPlansArgs> for ListPlans {
    fn from(val: ListPlansArgs) -> Self {
        ListPlans {
            patient_id: val.patient,
            status: val.status,
            approval_status: val.approval,
            name: val.name,
            mine: val.mine,
            open_only: val.open,
        }
    }
}

/// A plan addressed by its code
#[derive(Args)]
pub struct PlanCodeArgs {
    #[arg(help = "Plan code, e.g. TP-20260115-0001")]
    pub code: String,
}

impl From<PlanCodeArgs> for PlanCode {
    fn from(val: PlanCodeArgs) -> Self {
        PlanCode { code: val.code }
    }
}

/// Submit a draft plan for review
#[derive(Args)]
pub struct SubmitArgs {
    #[arg(help = "Plan code")]
    pub code: String,
    #[arg(short, long, help = "Note for the reviewer")]
    pub notes: Option<String>,
}

impl From<SubmitArgs> for SubmitPlan {
    fn from(val: SubmitArgs) -> Self {
        SubmitPlan {
            code: val.code,
            notes: val.notes,
        }
    }
}

/// Approve or reject a plan pending review
#[derive(Args)]
pub struct DecideArgs {
    #[arg(help = "Plan code")]
    pub code: String,
    #[arg(short, long, help = "Review note; required when rejecting")]
    pub notes: Option<String>,
}

impl DecideArgs {
    pub fn into_params(self, decision: Decision) -> DecidePlan {
        DecidePlan {
            code: self.code,
            decision,
            notes: self.notes,
        }
    }
}

/// Cancel a plan
#[derive(Args)]
pub struct CancelArgs {
    #[arg(help = "Plan code")]
    pub code: String,
    #[arg(short, long, help = "Why the plan is cancelled")]
    pub reason: String,
}

impl From<CancelArgs> for CancelPlan {
    fn from(val: CancelArgs) -> Self {
        CancelPlan {
            code: val.code,
            reason: val.reason,
        }
    }
}

/// Append a phase to a draft plan
#[derive(Args)]
pub struct AddPhaseArgs {
    #[arg(help = "Plan code")]
    pub code: String,
    /// Name of the new phase
    pub name: String,
    #[arg(long, help = "Estimated duration in days")]
    pub days: Option<u32>,
}

impl From<AddPhaseArgs> for AddPhase {
    fn from(val: AddPhaseArgs) -> Self {
        AddPhase {
            code: val.code,
            name: val.name,
            estimated_days: val.days,
        }
    }
}

/// Adjust item prices and the discount of a plan
///
/// Prices are given as ITEM_ID=AMOUNT pairs, e.g. `--price 12=450.00`.
#[derive(Args)]
pub struct PricesArgs {
    #[arg(help = "Plan code")]
    pub code: String,
    #[arg(
        long = "price",
        value_name = "ITEM_ID=AMOUNT",
        value_parser = parse_item_price,
        help = "New price for one item; repeat for more items"
    )]
    pub prices: Vec<ItemPrice>,
    #[arg(long, help = "New plan-level discount amount")]
    pub discount: Option<Decimal>,
    #[arg(short, long, help = "Why the prices changed")]
    pub reason: Option<String>,
}

fn parse_item_price(value: &str) -> std::result::Result<ItemPrice, String> {
    let (item, price) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ITEM_ID=AMOUNT, got '{value}'"))?;
    Ok(ItemPrice {
        item_id: item
            .trim()
            .parse()
            .map_err(|_| format!("invalid item ID '{item}'"))?,
        price: price
            .trim()
            .parse()
            .map_err(|_| format!("invalid amount '{price}'"))?,
    })
}

impl From<PricesArgs> for UpdatePrices {
    fn from(val: PricesArgs) -> Self {
        UpdatePrices {
            code: val.code,
            items: val.prices,
            discount: val.discount,
            reason: val.reason,
        }
    }
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Create a custom plan
    #[command(alias = "c")]
    Create(CreatePlanArgs),
    /// Create a plan from a catalog template
    #[command(alias = "t")]
    FromTemplate(FromTemplateArgs),
    /// List plans visible to the acting user
    #[command(aliases = ["l", "ls"])]
    List(ListPlansArgs),
    /// Show a plan with its phases and items
    #[command(alias = "s")]
    Show(PlanCodeArgs),
    /// Submit a draft plan for review
    Submit(SubmitArgs),
    /// Approve a plan pending review
    Approve(DecideArgs),
    /// Reject a plan pending review back to draft
    Reject(DecideArgs),
    /// Cancel a plan
    Cancel(CancelArgs),
    /// Append a phase to a draft plan
    AddPhase(AddPhaseArgs),
    /// Adjust item prices and the plan discount
    Prices(PricesArgs),
    /// Show the audit trail of a plan
    Audit(PlanCodeArgs),
}

// ============================================================================
// Item commands
// ============================================================================

/// Command-line representation of item status values
#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum ItemStatusArg {
    Pending,
    WaitingForPrerequisite,
    ReadyForBooking,
    Scheduled,
    InProgress,
    Completed,
    Skipped,
}

impl std::fmt::Display for ItemStatusArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = match self {
            ItemStatusArg::Pending => "PENDING",
            ItemStatusArg::WaitingForPrerequisite => "WAITING_FOR_PREREQUISITE",
            ItemStatusArg::ReadyForBooking => "READY_FOR_BOOKING",
            ItemStatusArg::Scheduled => "SCHEDULED",
            ItemStatusArg::InProgress => "IN_PROGRESS",
            ItemStatusArg::Completed => "COMPLETED",
            ItemStatusArg::Skipped => "SKIPPED",
        };
        f.write_str(status)
    }
}

/// Change an item's clinical status
///
/// Completing or skipping an item cascades: the next item of the phase
/// becomes ready, dependent items unlock, and finished phases and plans
/// complete on their own.
#[derive(Args)]
pub struct ItemStatusArgs {
    #[arg(help = "ID of the item")]
    pub id: u64,
    #[arg(value_enum, help = "Target status")]
    pub status: ItemStatusArg,
    #[arg(short, long, help = "Note recorded with the change")]
    pub notes: Option<String>,
    #[arg(long, help = "Completion time (RFC 3339); defaults to now")]
    pub completed_at: Option<Timestamp>,
}

impl From<ItemStatusArgs> for UpdateItemStatus {
    fn from(val: ItemStatusArgs) -> Self {
        UpdateItemStatus {
            item_id: val.id,
            status: val.status.to_string(),
            notes: val.notes,
            completed_at: val.completed_at,
        }
    }
}

/// A record addressed by its numeric ID
#[derive(Args)]
pub struct IdArgs {
    #[arg(help = "Unique identifier")]
    pub id: u64,
}

impl From<IdArgs> for Id {
    fn from(val: IdArgs) -> Self {
        Id { id: val.id }
    }
}

/// Add items to a phase
///
/// Either link a catalog service with --service, or give a free-form item
/// with --name and --price.
#[derive(Args)]
pub struct AddItemArgs {
    #[arg(help = "ID of the phase to add to")]
    pub phase_id: u64,
    #[arg(long, help = "Catalog service to link")]
    pub service: Option<u64>,
    #[arg(long, help = "Item name; defaults to the service name")]
    pub name: Option<String>,
    #[arg(long, help = "Item price; defaults to the service price")]
    pub price: Option<Decimal>,
    #[arg(short, long, default_value_t = 1, help = "Number of identical items")]
    pub quantity: u32,
    #[arg(long, help = "Estimated chair time in minutes")]
    pub minutes: Option<u32>,
    #[arg(long, help = "Free-form notes")]
    pub notes: Option<String>,
    #[arg(
        long,
        help = "Keep an approved plan approved instead of sending it back for review"
    )]
    pub no_resubmit: bool,
}

impl From<AddItemArgs> for AddItems {
    fn from(val: AddItemArgs) -> Self {
        AddItems {
            phase_id: val.phase_id,
            items: vec![NewItem {
                service_id: val.service,
                name: val.name,
                price: val.price,
                quantity: val.quantity,
                estimated_minutes: val.minutes,
                notes: val.notes,
            }],
            auto_submit: !val.no_resubmit,
        }
    }
}

/// Edit an item of a draft plan
#[derive(Args)]
pub struct UpdateItemArgs {
    #[arg(help = "ID of the item")]
    pub id: u64,
    #[arg(long, help = "New name")]
    pub name: Option<String>,
    #[arg(long, help = "New price")]
    pub price: Option<Decimal>,
    #[arg(long, help = "Estimated chair time in minutes")]
    pub minutes: Option<u32>,
    #[arg(long, help = "Free-form notes")]
    pub notes: Option<String>,
    #[arg(short, long, help = "Why the price changed")]
    pub reason: Option<String>,
}

impl From<UpdateItemArgs> for UpdateItem {
    fn from(val: UpdateItemArgs) -> Self {
        UpdateItem {
            item_id: val.id,
            name: val.name,
            price: val.price,
            estimated_minutes: val.minutes,
            notes: val.notes,
            reason: val.reason,
        }
    }
}

/// Reorder the items of a phase
#[derive(Args)]
pub struct ReorderArgs {
    #[arg(help = "ID of the phase")]
    pub phase_id: u64,
    #[arg(
        value_delimiter = ',',
        required = true,
        help = "Every item ID of the phase in the new order, comma-separated"
    )]
    pub item_ids: Vec<u64>,
}

impl From<ReorderArgs> for ReorderItems {
    fn from(val: ReorderArgs) -> Self {
        ReorderItems {
            phase_id: val.phase_id,
            item_ids: val.item_ids,
        }
    }
}

/// Assign a doctor to an item
#[derive(Args)]
pub struct AssignArgs {
    #[arg(help = "ID of the item")]
    pub id: u64,
    #[arg(help = "ID of the doctor")]
    pub doctor: u64,
    #[arg(short, long, help = "Note recorded with the assignment")]
    pub notes: Option<String>,
}

impl From<AssignArgs> for AssignDoctor {
    fn from(val: AssignArgs) -> Self {
        AssignDoctor {
            item_id: val.id,
            doctor_id: val.doctor,
            notes: val.notes,
        }
    }
}

#[derive(Subcommand)]
pub enum ItemCommands {
    /// Change an item's clinical status
    #[command(alias = "st")]
    Status(ItemStatusArgs),
    /// Show an item
    #[command(alias = "s")]
    Show(IdArgs),
    /// Add items to a phase
    #[command(alias = "a")]
    Add(AddItemArgs),
    /// Edit an item of a draft plan
    #[command(alias = "u")]
    Update(UpdateItemArgs),
    /// Delete an item of a draft plan
    #[command(aliases = ["d", "rm"])]
    Delete(IdArgs),
    /// Reorder the items of a phase
    Reorder(ReorderArgs),
    /// Assign a doctor to an item
    Assign(AssignArgs),
    /// List appointments linked to an item
    Appointments(IdArgs),
}

// ============================================================================
// Catalog commands
// ============================================================================

/// Register the first administrator
#[derive(Args)]
pub struct BootstrapArgs {
    /// Name of the administrator
    pub name: String,
}

impl From<BootstrapArgs> for RegisterActor {
    fn from(val: BootstrapArgs) -> Self {
        RegisterActor {
            name: val.name,
            role: "ADMIN".to_string(),
            ..Default::default()
        }
    }
}

/// Register a staff member, administrator or patient account
#[derive(Args)]
pub struct RegisterActorArgs {
    /// Display name
    pub name: String,
    #[arg(long, default_value = "employee", help = "admin, employee or patient")]
    pub role: String,
    #[arg(long, help = "Clinical specialization, e.g. Endodontics")]
    pub specialization: Option<String>,
    #[arg(long, help = "Patient record behind a patient account")]
    pub patient: Option<u64>,
}

impl From<RegisterActorArgs> for RegisterActor {
    fn from(val: RegisterActorArgs) -> Self {
        RegisterActor {
            name: val.name,
            role: val.role,
            specialization: val.specialization,
            patient_id: val.patient,
        }
    }
}

#[derive(Subcommand)]
pub enum ActorCommands {
    /// Register an actor
    #[command(alias = "a")]
    Add(RegisterActorArgs),
    /// List actors
    #[command(aliases = ["l", "ls"])]
    List,
    /// Deactivate an actor
    Deactivate(IdArgs),
    /// Reactivate an actor
    Activate(IdArgs),
}

/// Register a patient
#[derive(Args)]
pub struct RegisterPatientArgs {
    /// Full name
    pub name: String,
}

impl From<RegisterPatientArgs> for RegisterPatient {
    fn from(val: RegisterPatientArgs) -> Self {
        RegisterPatient { name: val.name }
    }
}

#[derive(Subcommand)]
pub enum PatientCommands {
    /// Register a patient
    #[command(alias = "a")]
    Add(RegisterPatientArgs),
    /// List patients
    #[command(aliases = ["l", "ls"])]
    List,
}

/// Add a service to the catalog
#[derive(Args)]
pub struct RegisterServiceArgs {
    /// Unique service code, e.g. RCT
    pub code: String,
    /// Display name
    pub name: String,
    #[arg(long, help = "Catalog price")]
    pub price: Decimal,
    #[arg(long, help = "Specialization the service belongs to")]
    pub specialization: Option<String>,
    #[arg(long, help = "Estimated chair time in minutes")]
    pub minutes: Option<u32>,
}

impl From<RegisterServiceArgs> for RegisterService {
    fn from(val: RegisterServiceArgs) -> Self {
        RegisterService {
            code: val.code,
            name: val.name,
            price: val.price,
            specialization: val.specialization,
            estimated_minutes: val.minutes,
        }
    }
}

/// Declare that a service requires another service to be done first
#[derive(Args)]
pub struct RequireArgs {
    #[arg(help = "ID of the dependent service")]
    pub service_id: u64,
    #[arg(help = "ID of the service that must be completed first")]
    pub prerequisite_id: u64,
}

impl From<RequireArgs> for AddPrerequisite {
    fn from(val: RequireArgs) -> Self {
        AddPrerequisite {
            service_id: val.service_id,
            prerequisite_id: val.prerequisite_id,
        }
    }
}

#[derive(Subcommand)]
pub enum ServiceCommands {
    /// Add a service to the catalog
    #[command(alias = "a")]
    Add(RegisterServiceArgs),
    /// List catalog services
    #[command(aliases = ["l", "ls"])]
    List,
    /// Declare a clinical prerequisite between two services
    Require(RequireArgs),
}

/// Register a treatment template from a JSON file
///
/// The file holds `{"code", "name", "specialization", "phases": [{"name",
/// "estimated_days", "items": [{"service_id", "quantity", "price"}]}]}`.
#[derive(Args)]
pub struct RegisterTemplateArgs {
    #[arg(help = "Path to the template JSON file")]
    pub file: PathBuf,
}

impl RegisterTemplateArgs {
    pub fn into_params(self) -> Result<RegisterTemplate> {
        read_json(&self.file)
    }
}

#[derive(Subcommand)]
pub enum TemplateCommands {
    /// Register a template from a JSON file
    #[command(alias = "a")]
    Add(RegisterTemplateArgs),
    /// List templates
    #[command(aliases = ["l", "ls"])]
    List,
    /// Show a template
    #[command(alias = "s")]
    Show(IdArgs),
}

/// Link an externally scheduled appointment to an item
#[derive(Args)]
pub struct RegisterAppointmentArgs {
    #[arg(help = "ID of the item the appointment is for")]
    pub item_id: u64,
    #[arg(long, help = "Appointment status; defaults to scheduled")]
    pub status: Option<String>,
    #[arg(long, help = "Appointment time (RFC 3339)")]
    pub at: Option<Timestamp>,
}

impl From<RegisterAppointmentArgs> for RegisterAppointment {
    fn from(val: RegisterAppointmentArgs) -> Self {
        RegisterAppointment {
            item_id: val.item_id,
            status: val.status,
            scheduled_at: val.at,
        }
    }
}

/// Move an appointment to a new status
#[derive(Args)]
pub struct UpdateAppointmentArgs {
    #[arg(help = "ID of the appointment")]
    pub id: u64,
    #[arg(help = "scheduled, checked_in, in_progress, completed, cancelled or no_show")]
    pub status: String,
}

impl From<UpdateAppointmentArgs> for UpdateAppointment {
    fn from(val: UpdateAppointmentArgs) -> Self {
        UpdateAppointment {
            id: val.id,
            status: val.status,
        }
    }
}

#[derive(Subcommand)]
pub enum AppointmentCommands {
    /// Link an appointment to an item
    #[command(alias = "a")]
    Add(RegisterAppointmentArgs),
    /// Move an appointment to a new status
    #[command(alias = "u")]
    Update(UpdateAppointmentArgs),
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    #[test]
    fn test_parse_item_price() {
        let parsed = parse_item_price("12=450.50").unwrap();
        assert_eq!(parsed.item_id, 12);
        assert_eq!(parsed.price, Decimal::new(45050, 2));

        assert!(parse_item_price("12").is_err());
        assert!(parse_item_price("x=1").is_err());
        assert!(parse_item_price("3=lots").is_err());
    }

    #[test]
    fn test_item_status_arg_matches_core_spelling() {
        let params: UpdateItemStatus = ItemStatusArgs {
            id: 4,
            status: ItemStatusArg::ReadyForBooking,
            notes: None,
            completed_at: None,
        }
        .into();
        assert_eq!(params.status, "READY_FOR_BOOKING");
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_plan_phases_from_flags() {
        let params = CreatePlanArgs {
            name: "Rehab".to_string(),
            patient: 1,
            doctor: 2,
            discount: None,
            start: None,
            phases: vec!["Surgery".to_string(), "Prosthetics".to_string()],
            phases_file: None,
        }
        .into_params()
        .unwrap();
        assert_eq!(params.phases.len(), 2);
        assert!(params.phases.iter().all(|phase| phase.items.is_empty()));
    }

    #[test]
    fn test_add_item_resubmits_by_default() {
        let params: AddItems = AddItemArgs {
            phase_id: 3,
            service: Some(7),
            name: None,
            price: None,
            quantity: 2,
            minutes: None,
            notes: None,
            no_resubmit: false,
        }
        .into();
        assert!(params.auto_submit);
        assert_eq!(params.items[0].quantity, 2);
    }
}
