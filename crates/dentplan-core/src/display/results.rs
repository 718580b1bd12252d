//! Result wrapper types for displaying operation outcomes.
//!
//! [`CreateResult`] and [`UpdateResult`] wrap plain models. The engine's own
//! result types ([`StatusUpdateResult`], [`AddItemsResult`], ...) carry ledger
//! and cascade details and get `Display` implementations here directly.

use std::fmt;

use super::money::Money;
use crate::models::{
    Actor, AddItemsResult, CascadeReport, DeleteItemResult, Item, LedgerChange,
    LinkedAppointment, Patient, Plan, PriceUpdateResult, ReorderResult, Service,
    StatusUpdateResult, Template,
};

/// Wrapper type for displaying the result of create operations.
///
/// # Examples
///
/// ```rust
/// use dentplan_core::{display::CreateResult, models::Service};
/// use rust_decimal::Decimal;
///
/// let service = Service {
///     id: 4,
///     code: "RCT".to_string(),
///     name: "Root canal".to_string(),
///     price: Decimal::new(250, 0),
///     specialization: Some("Endodontics".to_string()),
///     estimated_minutes: Some(90),
///     active: true,
/// };
///
/// let output = CreateResult::new(service).to_string();
/// assert!(output.starts_with("Registered service with ID: 4"));
/// ```
pub struct CreateResult<T> {
    pub resource: T,
}

impl<T> CreateResult<T> {
    pub fn new(resource: T) -> Self {
        Self { resource }
    }
}

fn write_created(
    f: &mut fmt::Formatter<'_>,
    verb_and_kind: &str,
    id: impl fmt::Display,
    resource: &dyn fmt::Display,
) -> fmt::Result {
    writeln!(f, "{verb_and_kind} with ID: {id}")?;
    writeln!(f)?;
    write!(f, "{resource}")
}

impl fmt::Display for CreateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Created plan", &self.resource.code, &self.resource)
    }
}

impl fmt::Display for CreateResult<Actor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Registered actor", self.resource.id, &self.resource)
    }
}

impl fmt::Display for CreateResult<Patient> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Registered patient", self.resource.id, &self.resource)
    }
}

impl fmt::Display for CreateResult<Service> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Registered service", self.resource.id, &self.resource)
    }
}

impl fmt::Display for CreateResult<Template> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Registered template", self.resource.id, &self.resource)
    }
}

impl fmt::Display for CreateResult<LinkedAppointment> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_created(f, "Linked appointment", self.resource.id, &self.resource)
    }
}

/// Wrapper type for displaying the result of update operations, optionally
/// listing what changed.
pub struct UpdateResult<T> {
    pub resource: T,
    pub changes: Vec<String>,
}

impl<T> UpdateResult<T> {
    pub fn new(resource: T) -> Self {
        Self {
            resource,
            changes: Vec::new(),
        }
    }

    pub fn with_changes(resource: T, changes: Vec<String>) -> Self {
        Self { resource, changes }
    }

    fn write_changes(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changes.is_empty() {
            writeln!(f)?;
            writeln!(f, "Changes made:")?;
            for change in &self.changes {
                writeln!(f, "- {change}")?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for UpdateResult<Plan> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated plan {}", self.resource.code)?;
        self.write_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Item> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated item with ID: {}", self.resource.id)?;
        self.write_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<Actor> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated actor with ID: {}", self.resource.id)?;
        self.write_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for UpdateResult<LinkedAppointment> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Updated appointment with ID: {}", self.resource.id)?;
        self.write_changes(f)?;
        write!(f, "{}", self.resource)
    }
}

impl fmt::Display for LedgerChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_noop() {
            return writeln!(f, "- Cost unchanged: {}", Money(&self.after.final_cost));
        }
        writeln!(
            f,
            "- Total cost: {} → {}",
            Money(&self.before.total_cost),
            Money(&self.after.total_cost)
        )?;
        if self.before.discount_amount != self.after.discount_amount {
            writeln!(
                f,
                "- Discount: {} → {}",
                Money(&self.before.discount_amount),
                Money(&self.after.discount_amount)
            )?;
        }
        writeln!(
            f,
            "- Final cost: {} → {}",
            Money(&self.before.final_cost),
            Money(&self.after.final_cost)
        )
    }
}

fn join_ids(ids: &[u64]) -> String {
    ids.iter()
        .map(u64::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for CascadeReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return Ok(());
        }
        writeln!(f, "Auto-progression:")?;
        if !self.activated_items.is_empty() {
            writeln!(f, "- Ready for booking: {}", join_ids(&self.activated_items))?;
        }
        if !self.unlocked_items.is_empty() {
            writeln!(f, "- Prerequisites met: {}", join_ids(&self.unlocked_items))?;
        }
        if !self.started_phases.is_empty() {
            writeln!(f, "- Phases started: {}", join_ids(&self.started_phases))?;
        }
        if !self.completed_phases.is_empty() {
            writeln!(f, "- Phases completed: {}", join_ids(&self.completed_phases))?;
        }
        if let Some(transition) = &self.plan_transition {
            writeln!(f, "- Plan: {} → {}", transition.from, transition.to)?;
        }
        Ok(())
    }
}

impl fmt::Display for StatusUpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.changed {
            writeln!(
                f,
                "Item {} is already {}; nothing changed.",
                self.item.id, self.item.status
            )?;
            writeln!(f)?;
            return write!(f, "{}", self.item);
        }

        writeln!(f, "Item {} is now {}", self.item.id, self.item.status)?;
        writeln!(f)?;
        if let Some(ledger) = &self.ledger {
            write!(f, "{ledger}")?;
            writeln!(f)?;
        }
        if !self.cascade.is_empty() {
            write!(f, "{}", self.cascade)?;
            writeln!(f)?;
        }
        write!(f, "{}", self.item)
    }
}

impl fmt::Display for AddItemsResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Added {} item(s) to phase {}",
            self.items.len(),
            self.phase_id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.ledger)?;
        if self.resubmitted {
            writeln!(
                f,
                "- Plan sent back for review ({})",
                self.approval_status
            )?;
        }
        for item in &self.items {
            writeln!(f)?;
            write!(f, "{item}")?;
        }
        Ok(())
    }
}

impl fmt::Display for DeleteItemResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Deleted item '{}' (ID: {})",
            self.item.name, self.item.id
        )?;
        writeln!(f)?;
        write!(f, "{}", self.ledger)?;
        if !self.cascade.is_empty() {
            writeln!(f)?;
            write!(f, "{}", self.cascade)?;
        }
        Ok(())
    }
}

impl fmt::Display for ReorderResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reordered items in phase {}", self.phase_id)?;
        writeln!(f)?;
        for item in &self.items {
            writeln!(f, "{}. {} (ID: {})", item.sequence, item.name, item.id)?;
        }
        Ok(())
    }
}

impl fmt::Display for PriceUpdateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Updated {} price(s) in plan {}",
            self.updated_items.len(),
            self.plan_code
        )?;
        writeln!(f)?;
        write!(f, "{}", self.ledger)?;
        writeln!(f)?;
        for item in &self.updated_items {
            writeln!(f, "- {} (ID: {}): {}", item.name, item.id, Money(&item.price))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CostSnapshot, PlanStatus, PlanTransition};

    fn snapshot(total: rust_decimal::Decimal) -> CostSnapshot {
        CostSnapshot {
            total_cost: total,
            discount_amount: dec!(0),
            final_cost: total,
        }
    }

    #[test]
    fn test_ledger_change_display() {
        let change = LedgerChange {
            before: snapshot(dec!(600)),
            after: snapshot(dec!(400)),
        };
        let output = change.to_string();
        assert!(output.contains("- Total cost: 600.00 → 400.00"));
        assert!(output.contains("- Final cost: 600.00 → 400.00"));
        assert!(!output.contains("Discount"));

        let unchanged = LedgerChange {
            before: snapshot(dec!(600)),
            after: snapshot(dec!(600)),
        };
        assert_eq!(unchanged.to_string(), "- Cost unchanged: 600.00\n");
    }

    #[test]
    fn test_cascade_report_display() {
        assert_eq!(CascadeReport::default().to_string(), "");

        let report = CascadeReport {
            activated_items: vec![2],
            unlocked_items: vec![],
            started_phases: vec![],
            completed_phases: vec![1, 3],
            plan_transition: Some(PlanTransition {
                from: PlanStatus::InProgress,
                to: PlanStatus::Completed,
            }),
        };
        let output = report.to_string();
        assert!(output.contains("- Ready for booking: 2"));
        assert!(output.contains("- Phases completed: 1, 3"));
        assert!(output.contains("- Plan: IN_PROGRESS → COMPLETED"));
        assert!(!output.contains("Prerequisites met"));
    }
}
