//! Display implementations for domain models.
//!
//! Every model renders as markdown so the CLI can hand it to the terminal
//! renderer and the MCP server can return it verbatim.

use std::fmt;

use super::{
    datetime::LocalDateTime,
    money::Money,
};
use crate::models::{
    Actor, AppointmentStatus, ApprovalStatus, AuditAction, AuditEntity, AuditEntry, Item,
    ItemStatus, LinkedAppointment, Patient, Phase, PhaseStatus, Plan, PlanStatus, PlanSummary,
    RoleClass, Service, Template,
};

macro_rules! display_as_str {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

display_as_str!(
    PlanStatus,
    ApprovalStatus,
    PhaseStatus,
    ItemStatus,
    AppointmentStatus,
    RoleClass,
    AuditEntity,
    AuditAction,
);

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# {}: {}", self.code, self.name)?;
        writeln!(f)?;

        match &self.patient_name {
            Some(name) => writeln!(f, "- Patient: {name} (ID: {})", self.patient_id)?,
            None => writeln!(f, "- Patient: {}", self.patient_id)?,
        }
        writeln!(f, "- Doctor: {}", self.doctor_id)?;
        writeln!(f, "- Status: {}", self.status)?;
        writeln!(f, "- Approval: {}", self.approval_status)?;
        if let (Some(by), Some(at)) = (self.approved_by, &self.approved_at) {
            writeln!(f, "- Approved by: {by} at {}", LocalDateTime(at))?;
        }
        if let Some(note) = &self.approval_note {
            writeln!(f, "- Review note: {note}")?;
        }
        if let Some(start) = self.start_date {
            writeln!(f, "- Start date: {start}")?;
        }
        if let Some(end) = self.expected_end_date {
            writeln!(f, "- Expected end: {end}")?;
        }
        writeln!(
            f,
            "- Cost: {} - {} discount = **{}**",
            Money(&self.total_cost),
            Money(&self.discount_amount),
            Money(&self.final_cost)
        )?;
        writeln!(f, "- Created: {}", LocalDateTime(&self.created_at))?;
        writeln!(f, "- Updated: {}", LocalDateTime(&self.updated_at))?;

        if self.phases.is_empty() {
            writeln!(f, "\nNo phases in this plan.")?;
        } else {
            for phase in &self.phases {
                writeln!(f)?;
                write!(f, "{phase}")?;
            }
        }

        Ok(())
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## Phase {}: {} ({}, ID: {})",
            self.phase_number, self.name, self.status, self.id
        )?;
        writeln!(f)?;

        if let Some(days) = self.estimated_days {
            writeln!(f, "- Estimated days: {days}")?;
        }
        if let Some(start) = self.start_date {
            writeln!(f, "- Started: {start}")?;
        }
        if let Some(done) = self.completion_date {
            writeln!(f, "- Completed: {done}")?;
        }

        if self.items.is_empty() {
            writeln!(f, "No items in this phase.")?;
            return Ok(());
        }

        writeln!(f)?;
        writeln!(f, "| # | ID | Item | Status | Price |")?;
        writeln!(f, "|---|---|---|---|---:|")?;
        for item in &self.items {
            writeln!(
                f,
                "| {} | {} | {} | {} | {} |",
                item.sequence,
                item.id,
                item.name,
                item.status.with_icon(),
                Money(&item.price)
            )?;
        }

        Ok(())
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "### {}. {} ({})", self.sequence, self.name, self.status.with_icon())?;
        writeln!(f)?;
        writeln!(f, "- ID: {} (phase {})", self.id, self.phase_id)?;
        writeln!(f, "- Price: {}", Money(&self.price))?;
        if let Some(service_id) = self.service_id {
            writeln!(f, "- Service: {service_id}")?;
        }
        if let Some(minutes) = self.estimated_minutes {
            writeln!(f, "- Estimated minutes: {minutes}")?;
        }
        if let Some(doctor) = self.assigned_doctor_id {
            writeln!(f, "- Assigned doctor: {doctor}")?;
        }
        if let Some(completed) = &self.completed_at {
            writeln!(f, "- Completed: {}", LocalDateTime(completed))?;
        }
        if let Some(price_override) = &self.price_override {
            write!(f, "- Price set by {}", price_override.updated_by)?;
            match &price_override.reason {
                Some(reason) => writeln!(f, ": {reason}")?,
                None => writeln!(f)?,
            }
        }
        if let Some(notes) = &self.notes {
            writeln!(f)?;
            writeln!(f, "{notes}")?;
        }
        Ok(())
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "## {}: {} ({}/{} items, {}%)",
            self.code,
            self.name,
            self.resolved_items,
            self.total_items,
            self.progress_percent()
        )?;
        writeln!(f)?;

        match &self.patient_name {
            Some(name) => writeln!(f, "- **Patient**: {name}")?,
            None => writeln!(f, "- **Patient**: {}", self.patient_id)?,
        }
        writeln!(
            f,
            "- **Status**: {} / {}",
            self.status, self.approval_status
        )?;
        writeln!(f, "- **Phases**: {}", self.total_phases)?;
        writeln!(f, "- **Final cost**: {}", Money(&self.final_cost))?;
        writeln!(f, "- **Created**: {}", LocalDateTime(&self.created_at))?;
        writeln!(f)?;

        Ok(())
    }
}

impl fmt::Display for Actor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "- {} (ID: {}, {})", self.name, self.id, self.role)?;
        if let Some(specialization) = &self.specialization {
            write!(f, ", {specialization}")?;
        }
        if let Some(patient_id) = self.patient_id {
            write!(f, ", patient {patient_id}")?;
        }
        if !self.active {
            write!(f, " [inactive]")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Patient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "- {} (ID: {}, since {})",
            self.name,
            self.id,
            LocalDateTime(&self.created_at)
        )
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- `{}` {} (ID: {}): {}",
            self.code,
            self.name,
            self.id,
            Money(&self.price)
        )?;
        if let Some(specialization) = &self.specialization {
            write!(f, ", {specialization}")?;
        }
        if let Some(minutes) = self.estimated_minutes {
            write!(f, ", {minutes} min")?;
        }
        if !self.active {
            write!(f, " [inactive]")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "## `{}` {} (ID: {})", self.code, self.name, self.id)?;
        if !self.active {
            write!(f, " [inactive]")?;
        }
        writeln!(f)?;
        writeln!(f)?;
        if let Some(specialization) = &self.specialization {
            writeln!(f, "- Specialization: {specialization}")?;
        }
        for phase in &self.phases {
            write!(f, "- Phase {}: {}", phase.phase_number, phase.name)?;
            if let Some(days) = phase.estimated_days {
                write!(f, " ({days} days)")?;
            }
            writeln!(f)?;
            for item in &phase.items {
                write!(f, "  - service {} x{}", item.service_id, item.quantity)?;
                if let Some(price) = &item.price {
                    write!(f, " at {}", Money(price))?;
                }
                writeln!(f)?;
            }
        }
        writeln!(f)
    }
}

impl fmt::Display for AuditEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- {} {} {} {} by {}",
            LocalDateTime(&self.recorded_at),
            self.action,
            self.entity,
            self.entity_id,
            self.actor_id
        )?;
        match (&self.status_before, &self.status_after) {
            (Some(before), Some(after)) => write!(f, ": {before} → {after}")?,
            (None, Some(after)) => write!(f, ": {after}")?,
            _ => {}
        }
        if let Some(note) = &self.note {
            write!(f, " ({note})")?;
        }
        writeln!(f)
    }
}

impl fmt::Display for LinkedAppointment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "- Appointment {} for item {}: {}",
            self.id, self.item_id, self.status
        )?;
        if let Some(at) = &self.scheduled_at {
            write!(f, " at {}", LocalDateTime(at))?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;

    use super::*;

    fn item(status: ItemStatus) -> Item {
        Item {
            id: 7,
            phase_id: 2,
            sequence: 1,
            name: "Root canal".to_string(),
            service_id: Some(4),
            price: dec!(250),
            estimated_minutes: Some(90),
            status,
            completed_at: None,
            assigned_doctor_id: None,
            notes: None,
            price_override: None,
            created_at: Timestamp::UNIX_EPOCH,
            updated_at: Timestamp::UNIX_EPOCH,
        }
    }

    #[test]
    fn test_status_display_uses_wire_names() {
        assert_eq!(ItemStatus::ReadyForBooking.to_string(), "READY_FOR_BOOKING");
        assert_eq!(ApprovalStatus::PendingReview.to_string(), "PENDING_REVIEW");
        assert_eq!(AuditAction::AutoProgressed.to_string(), "AUTO_PROGRESSED");
    }

    #[test]
    fn test_phase_display_renders_item_table() {
        let phase = Phase {
            id: 2,
            plan_id: 1,
            phase_number: 1,
            name: "Endodontics".to_string(),
            status: PhaseStatus::InProgress,
            start_date: None,
            completion_date: None,
            estimated_days: Some(14),
            items: vec![item(ItemStatus::Skipped)],
        };

        let output = phase.to_string();
        assert!(output.contains("## Phase 1: Endodontics (IN_PROGRESS, ID: 2)"));
        assert!(output.contains("| 1 | 7 | Root canal | ⤼ Skipped | 250.00 |"));
    }

    #[test]
    fn test_item_display_shows_override_reason() {
        let mut item = item(ItemStatus::Pending);
        item.price_override = Some(crate::models::PriceOverride {
            updated_by: 1,
            updated_at: Timestamp::UNIX_EPOCH,
            reason: Some("insurance".to_string()),
        });

        let output = item.to_string();
        assert!(output.contains("### 1. Root canal (○ Pending)"));
        assert!(output.contains("- Price set by 1: insurance"));
    }
}
