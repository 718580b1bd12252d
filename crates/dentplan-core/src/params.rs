//! Parameter structures for engine operations.
//!
//! These structures are shared by every interface (CLI, MCP) and carry no
//! framework-specific derives beyond serde and an optional JSON schema. The
//! interface layers wrap or convert into them:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │   CLI Args      │    │   MCP Params    │    │  Core Params    │
//! │  (clap derives) │───▶│ (serde derives) │───▶│ (minimal deps)  │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//! ```
//!
//! Each parameter type with free-form input exposes a `validate()` method
//! that parses strings into domain enums and rejects malformed requests before
//! a unit of work is opened.

use std::collections::HashSet;

use jiff::{civil::Date, Timestamp};
use rust_decimal::Decimal;
#[cfg(feature = "schema")]
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    error::{codes, PlannerError, Result},
    models::{
        AppointmentStatus, ApprovalStatus, ItemStatus, PlanFilter, PlanStatus, RoleClass,
    },
    rules::{ledger, Decision},
};

fn default_true() -> bool {
    true
}

fn default_quantity() -> u32 {
    1
}

fn required(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(PlannerError::validation(
            codes::MISSING_FIELD,
            format!("'{field}' must not be empty"),
        ));
    }
    Ok(())
}

/// Parameters for operations addressing a plan by its code.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct PlanCode {
    /// Plan code, e.g. `TP-20260115-0001`
    pub code: String,
}

/// Parameters for operations addressing a single record by ID.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct Id {
    pub id: u64,
}

/// One item requested for a new plan or an existing phase.
///
/// Either `service_id` is set, in which case name and price default to the
/// catalog entry, or both `name` and `price` are given.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewItem {
    /// Catalog service to link
    pub service_id: Option<u64>,
    /// Display name; defaults to the service name
    pub name: Option<String>,
    /// Price snapshot; defaults to the service price
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub price: Option<Decimal>,
    /// Number of identical items to create (default 1)
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    pub estimated_minutes: Option<u32>,
    pub notes: Option<String>,
}

impl NewItem {
    pub fn validate(&self) -> Result<()> {
        if self.quantity == 0 {
            return Err(PlannerError::validation(
                codes::INVALID_QUANTITY,
                "quantity must be at least 1",
            ));
        }
        if let Some(price) = self.price {
            ledger::ensure_non_negative("price", price)?;
        }
        if self.service_id.is_none() {
            match (&self.name, self.price) {
                (Some(name), Some(_)) => required("name", name)?,
                _ => {
                    return Err(PlannerError::validation(
                        codes::MISSING_FIELD,
                        "items without a service_id need both a name and a price",
                    ))
                }
            }
        }
        Ok(())
    }
}

/// A phase of a custom plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewPhase {
    pub name: String,
    pub estimated_days: Option<u32>,
    #[serde(default)]
    pub items: Vec<NewItem>,
}

/// Parameters for creating a plan from a catalog template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreatePlanFromTemplate {
    pub patient_id: u64,
    /// Responsible doctor; must share the template's specialization
    pub doctor_id: u64,
    pub template_id: u64,
    /// Plan name; defaults to the template name
    pub name: Option<String>,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub discount: Option<Decimal>,
    /// Planned start date (YYYY-MM-DD)
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub start_date: Option<Date>,
}

impl CreatePlanFromTemplate {
    pub fn validate(&self) -> Result<()> {
        if let Some(name) = &self.name {
            required("name", name)?;
        }
        if let Some(discount) = self.discount {
            ledger::ensure_non_negative("discount", discount)?;
        }
        Ok(())
    }
}

/// Parameters for creating a plan without a template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CreateCustomPlan {
    pub patient_id: u64,
    pub doctor_id: u64,
    pub name: String,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub discount: Option<Decimal>,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub start_date: Option<Date>,
    #[serde(default)]
    pub phases: Vec<NewPhase>,
}

impl CreateCustomPlan {
    pub fn validate(&self) -> Result<()> {
        required("name", &self.name)?;
        if let Some(discount) = self.discount {
            ledger::ensure_non_negative("discount", discount)?;
        }
        for phase in &self.phases {
            required("phase name", &phase.name)?;
            for item in &phase.items {
                item.validate()?;
            }
        }
        Ok(())
    }
}

/// Parameters for changing an item's clinical status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateItemStatus {
    pub item_id: u64,
    /// Target status, e.g. 'READY_FOR_BOOKING', 'completed', 'in-progress'
    pub status: String,
    pub notes: Option<String>,
    /// Completion time; defaults to now when completing
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub completed_at: Option<Timestamp>,
}

impl UpdateItemStatus {
    /// Parses the requested status.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use dentplan_core::{models::ItemStatus, params::UpdateItemStatus};
    ///
    /// let params = UpdateItemStatus {
    ///     item_id: 1,
    ///     status: "ready for booking".to_string(),
    ///     ..Default::default()
    /// };
    /// assert_eq!(params.validate()?, ItemStatus::ReadyForBooking);
    /// # Ok::<(), dentplan_core::PlannerError>(())
    /// ```
    pub fn validate(&self) -> Result<ItemStatus> {
        self.status.parse::<ItemStatus>().map_err(|_| {
            PlannerError::invalid_input("status").with_reason(format!(
                "Invalid status: {}. Must be one of {}",
                self.status,
                ItemStatus::ALL
                    .iter()
                    .map(ItemStatus::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            ))
        })
    }
}

/// Parameters for adding items to an existing phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddItems {
    pub phase_id: u64,
    pub items: Vec<NewItem>,
    /// Send an approved plan back to review (default true)
    #[serde(default = "default_true")]
    pub auto_submit: bool,
}

impl Default for AddItems {
    fn default() -> Self {
        Self {
            phase_id: 0,
            items: Vec::new(),
            auto_submit: default_true(),
        }
    }
}

impl AddItems {
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() {
            return Err(PlannerError::validation(
                codes::MISSING_FIELD,
                "at least one item is required",
            ));
        }
        self.items.iter().try_for_each(NewItem::validate)
    }
}

/// Parameters for editing an item's descriptive and price fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateItem {
    pub item_id: u64,
    pub name: Option<String>,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub price: Option<Decimal>,
    pub estimated_minutes: Option<u32>,
    pub notes: Option<String>,
    /// Why the price changed; stored with the override metadata
    pub reason: Option<String>,
}

impl UpdateItem {
    pub fn validate(&self) -> Result<()> {
        if self.name.is_none()
            && self.price.is_none()
            && self.estimated_minutes.is_none()
            && self.notes.is_none()
        {
            return Err(PlannerError::validation(
                codes::MISSING_FIELD,
                "nothing to update",
            ));
        }
        if let Some(name) = &self.name {
            required("name", name)?;
        }
        if let Some(price) = self.price {
            ledger::ensure_non_negative("price", price)?;
        }
        Ok(())
    }
}

/// Parameters for renumbering the items of a phase.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ReorderItems {
    pub phase_id: u64,
    /// Every item of the phase, in the desired order
    pub item_ids: Vec<u64>,
}

impl ReorderItems {
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::with_capacity(self.item_ids.len());
        if let Some(duplicate) = self.item_ids.iter().find(|id| !seen.insert(**id)) {
            return Err(PlannerError::validation(
                codes::DUPLICATE_ITEM,
                format!("item {duplicate} appears more than once"),
            ));
        }
        Ok(())
    }
}

/// Parameters for submitting a plan for review.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct SubmitPlan {
    pub code: String,
    pub notes: Option<String>,
}

/// Parameters for approving or rejecting a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct DecidePlan {
    pub code: String,
    pub decision: Decision,
    /// Mandatory when rejecting
    pub notes: Option<String>,
}

/// A single price change on the finance path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ItemPrice {
    pub item_id: u64,
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub price: Decimal,
}

/// Parameters for the finance adjustment of prices and discount.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdatePrices {
    pub code: String,
    #[serde(default)]
    pub items: Vec<ItemPrice>,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub discount: Option<Decimal>,
    pub reason: Option<String>,
}

impl UpdatePrices {
    pub fn validate(&self) -> Result<()> {
        if self.items.is_empty() && self.discount.is_none() {
            return Err(PlannerError::validation(
                codes::MISSING_FIELD,
                "provide item prices, a discount, or both",
            ));
        }
        let mut seen = HashSet::with_capacity(self.items.len());
        for update in &self.items {
            if !seen.insert(update.item_id) {
                return Err(PlannerError::validation(
                    codes::DUPLICATE_ITEM,
                    format!("item {} appears more than once", update.item_id),
                ));
            }
            ledger::ensure_non_negative("price", update.price)?;
        }
        if let Some(discount) = self.discount {
            ledger::ensure_non_negative("discount", discount)?;
        }
        Ok(())
    }
}

/// Parameters for assigning a doctor to an item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AssignDoctor {
    pub item_id: u64,
    pub doctor_id: u64,
    pub notes: Option<String>,
}

/// Parameters for cancelling a plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct CancelPlan {
    pub code: String,
    pub reason: String,
}

impl CancelPlan {
    pub fn validate(&self) -> Result<()> {
        required("reason", &self.reason)
    }
}

/// Parameters for appending a phase to a draft plan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddPhase {
    pub code: String,
    pub name: String,
    pub estimated_days: Option<u32>,
}

impl AddPhase {
    pub fn validate(&self) -> Result<()> {
        required("name", &self.name)
    }
}

/// Parameters for listing plans.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct ListPlans {
    pub patient_id: Option<u64>,
    /// Clinical status filter ('PENDING', 'IN_PROGRESS', 'COMPLETED', 'CANCELLED')
    pub status: Option<String>,
    /// Approval status filter ('DRAFT', 'PENDING_REVIEW', 'APPROVED')
    pub approval_status: Option<String>,
    /// Case-insensitive name fragment
    pub name: Option<String>,
    /// Only plans created by the acting user
    #[serde(default)]
    pub mine: bool,
    /// Hide completed and cancelled plans
    #[serde(default)]
    pub open_only: bool,
}

impl ListPlans {
    /// Converts into a [`PlanFilter`]; `mine` resolves against `actor_id`.
    pub fn to_filter(&self, actor_id: u64) -> Result<PlanFilter> {
        let status = self
            .status
            .as_deref()
            .map(|s| {
                s.parse::<PlanStatus>()
                    .map_err(|e| PlannerError::invalid_input("status").with_reason(e))
            })
            .transpose()?;
        let approval_status = self
            .approval_status
            .as_deref()
            .map(|s| {
                s.parse::<ApprovalStatus>()
                    .map_err(|e| PlannerError::invalid_input("approval_status").with_reason(e))
            })
            .transpose()?;

        Ok(PlanFilter {
            name_contains: self.name.clone(),
            patient_id: self.patient_id,
            created_by: self.mine.then_some(actor_id),
            status,
            approval_status,
            created_after: None,
            created_before: None,
            open_only: self.open_only,
        })
    }
}

/// Parameters for registering a staff member, administrator or patient
/// account.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterActor {
    pub name: String,
    /// 'ADMIN', 'EMPLOYEE' or 'PATIENT'
    pub role: String,
    pub specialization: Option<String>,
    /// Patient record behind a patient account
    pub patient_id: Option<u64>,
}

impl RegisterActor {
    pub fn validate(&self) -> Result<RoleClass> {
        required("name", &self.name)?;
        let role = self
            .role
            .parse::<RoleClass>()
            .map_err(|e| PlannerError::invalid_input("role").with_reason(e))?;
        if role == RoleClass::Patient && self.patient_id.is_none() {
            return Err(PlannerError::validation(
                codes::MISSING_FIELD,
                "patient accounts need a patient_id",
            ));
        }
        Ok(role)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterPatient {
    pub name: String,
}

/// Parameters for adding a catalog service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterService {
    pub code: String,
    pub name: String,
    #[cfg_attr(feature = "schema", schemars(with = "String"))]
    pub price: Decimal,
    pub specialization: Option<String>,
    pub estimated_minutes: Option<u32>,
}

impl RegisterService {
    pub fn validate(&self) -> Result<()> {
        required("code", &self.code)?;
        required("name", &self.name)?;
        ledger::ensure_non_negative("price", self.price)
    }
}

/// Declares that `service_id` requires `prerequisite_id` to be done first.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct AddPrerequisite {
    pub service_id: u64,
    pub prerequisite_id: u64,
}

impl AddPrerequisite {
    pub fn validate(&self) -> Result<()> {
        if self.service_id == self.prerequisite_id {
            return Err(PlannerError::invalid_input("prerequisite_id")
                .with_reason("a service cannot be its own prerequisite"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewTemplateItem {
    pub service_id: u64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    /// Overrides the service price
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub price: Option<Decimal>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct NewTemplatePhase {
    pub name: String,
    pub estimated_days: Option<u32>,
    #[serde(default)]
    pub items: Vec<NewTemplateItem>,
}

/// Parameters for registering a treatment template.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterTemplate {
    pub code: String,
    pub name: String,
    pub specialization: Option<String>,
    #[serde(default)]
    pub phases: Vec<NewTemplatePhase>,
}

impl RegisterTemplate {
    pub fn validate(&self) -> Result<()> {
        required("code", &self.code)?;
        required("name", &self.name)?;
        for phase in &self.phases {
            required("phase name", &phase.name)?;
            for item in &phase.items {
                if item.quantity == 0 {
                    return Err(PlannerError::validation(
                        codes::INVALID_QUANTITY,
                        "quantity must be at least 1",
                    ));
                }
                if let Some(price) = item.price {
                    ledger::ensure_non_negative("price", price)?;
                }
            }
        }
        Ok(())
    }
}

/// Parameters for recording an externally scheduled appointment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct RegisterAppointment {
    pub item_id: u64,
    /// Defaults to 'SCHEDULED'
    pub status: Option<String>,
    #[cfg_attr(feature = "schema", schemars(with = "Option<String>"))]
    pub scheduled_at: Option<Timestamp>,
}

impl RegisterAppointment {
    pub fn validate(&self) -> Result<AppointmentStatus> {
        parse_appointment_status(self.status.as_deref().unwrap_or("SCHEDULED"))
    }
}

/// Parameters for moving an appointment to a new status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(JsonSchema))]
pub struct UpdateAppointment {
    pub id: u64,
    pub status: String,
}

impl UpdateAppointment {
    pub fn validate(&self) -> Result<AppointmentStatus> {
        parse_appointment_status(&self.status)
    }
}

fn parse_appointment_status(status: &str) -> Result<AppointmentStatus> {
    status
        .parse::<AppointmentStatus>()
        .map_err(|e| PlannerError::invalid_input("status").with_reason(e))
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_add_items_resubmits_by_default() {
        assert!(AddItems::default().auto_submit);

        let parsed: AddItems =
            serde_json::from_str(r#"{"phase_id": 3, "items": []}"#).unwrap();
        assert!(parsed.auto_submit);
        assert_eq!(parsed.auto_submit, AddItems::default().auto_submit);
    }

    #[test]
    fn test_update_item_status_accepts_loose_spelling() {
        for (input, expected) in [
            ("completed", ItemStatus::Completed),
            ("in-progress", ItemStatus::InProgress),
            ("READY_FOR_BOOKING", ItemStatus::ReadyForBooking),
            ("waiting for prerequisite", ItemStatus::WaitingForPrerequisite),
        ] {
            let params = UpdateItemStatus {
                item_id: 1,
                status: input.to_string(),
                ..Default::default()
            };
            assert_eq!(params.validate().unwrap(), expected, "{input}");
        }
    }

    #[test]
    fn test_update_item_status_rejects_unknown() {
        let params = UpdateItemStatus {
            item_id: 1,
            status: "done".to_string(),
            ..Default::default()
        };
        match params.validate().unwrap_err() {
            PlannerError::InvalidInput { field, reason } => {
                assert_eq!(field, "status");
                assert!(reason.contains("Invalid status: done"));
            }
            other => panic!("Expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn test_new_item_needs_service_or_name_and_price() {
        let linked = NewItem {
            service_id: Some(3),
            quantity: 1,
            ..Default::default()
        };
        assert!(linked.validate().is_ok());

        let free = NewItem {
            name: Some("Night guard".into()),
            price: Some(dec!(80)),
            quantity: 1,
            ..Default::default()
        };
        assert!(free.validate().is_ok());

        let nameless = NewItem {
            price: Some(dec!(80)),
            quantity: 1,
            ..Default::default()
        };
        assert_eq!(
            nameless.validate().unwrap_err().code(),
            Some(codes::MISSING_FIELD)
        );
    }

    #[test]
    fn test_new_item_rejects_zero_quantity_and_negative_price() {
        let zero = NewItem {
            service_id: Some(1),
            quantity: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate().unwrap_err().code(), Some(codes::INVALID_QUANTITY));

        let negative = NewItem {
            service_id: Some(1),
            price: Some(dec!(-1)),
            quantity: 1,
            ..Default::default()
        };
        assert_eq!(
            negative.validate().unwrap_err().code(),
            Some(codes::NEGATIVE_AMOUNT)
        );
    }

    #[test]
    fn test_new_item_quantity_defaults_to_one() {
        let item: NewItem = serde_json::from_str(r#"{"service_id": 4}"#).unwrap();
        assert_eq!(item.quantity, 1);
        let add: AddItems = serde_json::from_str(r#"{"phase_id": 1, "items": []}"#).unwrap();
        assert!(add.auto_submit);
        assert_eq!(add.validate().unwrap_err().code(), Some(codes::MISSING_FIELD));
    }

    #[test]
    fn test_reorder_rejects_duplicates() {
        let params = ReorderItems {
            phase_id: 1,
            item_ids: vec![3, 1, 3],
        };
        assert_eq!(params.validate().unwrap_err().code(), Some(codes::DUPLICATE_ITEM));
    }

    #[test]
    fn test_update_item_requires_a_change() {
        let params = UpdateItem {
            item_id: 1,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap_err().kind(), ErrorKind::Validation);
    }

    #[test]
    fn test_update_prices_validation() {
        let empty = UpdatePrices {
            code: "TP-1".into(),
            ..Default::default()
        };
        assert!(empty.validate().is_err());

        let duplicated = UpdatePrices {
            code: "TP-1".into(),
            items: vec![
                ItemPrice {
                    item_id: 1,
                    price: dec!(10),
                },
                ItemPrice {
                    item_id: 1,
                    price: dec!(12),
                },
            ],
            ..Default::default()
        };
        assert_eq!(
            duplicated.validate().unwrap_err().code(),
            Some(codes::DUPLICATE_ITEM)
        );

        let discount_only = UpdatePrices {
            code: "TP-1".into(),
            discount: Some(dec!(5)),
            ..Default::default()
        };
        assert!(discount_only.validate().is_ok());
    }

    #[test]
    fn test_list_plans_filter_conversion() {
        let params = ListPlans {
            status: Some("in_progress".into()),
            approval_status: Some("approved".into()),
            mine: true,
            ..Default::default()
        };
        let filter = params.to_filter(9).unwrap();
        assert_eq!(filter.status, Some(PlanStatus::InProgress));
        assert_eq!(filter.approval_status, Some(ApprovalStatus::Approved));
        assert_eq!(filter.created_by, Some(9));

        let bad = ListPlans {
            status: Some("paused".into()),
            ..Default::default()
        };
        assert!(bad.to_filter(9).is_err());
    }

    #[test]
    fn test_register_actor_roles() {
        let staff = RegisterActor {
            name: "Dr. Lee".into(),
            role: "doctor".into(),
            specialization: Some("ORTHODONTICS".into()),
            patient_id: None,
        };
        assert_eq!(staff.validate().unwrap(), RoleClass::Employee);

        let patient = RegisterActor {
            name: "Ann".into(),
            role: "patient".into(),
            ..Default::default()
        };
        assert_eq!(patient.validate().unwrap_err().code(), Some(codes::MISSING_FIELD));
    }

    #[test]
    fn test_cancel_requires_reason() {
        let params = CancelPlan {
            code: "TP-1".into(),
            reason: "  ".into(),
        };
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_appointment_status_default() {
        let params = RegisterAppointment {
            item_id: 1,
            ..Default::default()
        };
        assert_eq!(params.validate().unwrap(), AppointmentStatus::Scheduled);
    }
}
