//! Collection wrapper types for displaying groups of domain objects.
//!
//! Each wrapper formats its elements with their own `Display` implementation
//! and prints a fixed message when the collection is empty.

use std::{fmt, ops::Index};

use crate::models::{Actor, AuditEntry, LinkedAppointment, Patient, PlanSummary, Service, Template};

/// Newtype wrapper for displaying collections of plan summaries.
///
/// # Examples
///
/// ```rust
/// use dentplan_core::{
///     display::PlanSummaries,
///     models::{ApprovalStatus, PlanStatus, PlanSummary},
/// };
/// use jiff::Timestamp;
/// use rust_decimal::Decimal;
///
/// let summary = PlanSummary {
///     id: 1,
///     code: "TP-20260101-0001".to_string(),
///     name: "Full-mouth rehabilitation".to_string(),
///     patient_id: 3,
///     patient_name: Some("Jane Doe".to_string()),
///     status: PlanStatus::InProgress,
///     approval_status: ApprovalStatus::Approved,
///     final_cost: Decimal::new(600, 0),
///     created_at: Timestamp::now(),
///     updated_at: Timestamp::now(),
///     total_phases: 2,
///     total_items: 4,
///     resolved_items: 1,
/// };
///
/// let summaries = PlanSummaries(vec![summary]);
/// let output = summaries.to_string();
/// assert!(output.contains("TP-20260101-0001"));
/// assert!(output.contains("(1/4 items, 25%)"));
/// ```
#[derive(Debug)]
pub struct PlanSummaries(pub Vec<PlanSummary>);

impl PlanSummaries {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, index: usize) -> Option<&PlanSummary> {
        self.0.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlanSummary> {
        self.0.iter()
    }
}

impl Index<usize> for PlanSummaries {
    type Output = PlanSummary;

    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}

impl IntoIterator for PlanSummaries {
    type Item = PlanSummary;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a PlanSummaries {
    type Item = &'a PlanSummary;
    type IntoIter = std::slice::Iter<'a, PlanSummary>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for PlanSummaries {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            writeln!(f, "No plans found.")
        } else {
            for plan in &self.0 {
                write!(f, "{plan}")?;
            }
            Ok(())
        }
    }
}

/// Audit entries of one plan, oldest first.
pub struct AuditTrail(pub Vec<AuditEntry>);

impl AuditTrail {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AuditEntry> {
        self.0.iter()
    }
}

impl IntoIterator for AuditTrail {
    type Item = AuditEntry;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a AuditTrail {
    type Item = &'a AuditEntry;
    type IntoIter = std::slice::Iter<'a, AuditEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for AuditTrail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return writeln!(f, "No audit entries recorded.");
        }
        for entry in &self.0 {
            write!(f, "{entry}")?;
        }
        Ok(())
    }
}

// Catalog listings only need iteration and an empty-state message.
macro_rules! catalog_listing {
    ($(#[$meta:meta])* $name:ident, $item:ty, $empty:literal) => {
        $(#[$meta])*
        pub struct $name(pub Vec<$item>);

        impl $name {
            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn iter(&self) -> std::slice::Iter<'_, $item> {
                self.0.iter()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                if self.0.is_empty() {
                    return writeln!(f, $empty);
                }
                for entry in &self.0 {
                    write!(f, "{entry}")?;
                }
                Ok(())
            }
        }
    };
}

catalog_listing!(
    /// Registered actors.
    Actors,
    Actor,
    "No actors registered."
);
catalog_listing!(
    /// Registered patients.
    Patients,
    Patient,
    "No patients registered."
);
catalog_listing!(
    /// Catalog services.
    Services,
    Service,
    "No services in the catalog."
);
catalog_listing!(
    /// Treatment templates.
    Templates,
    Template,
    "No templates in the catalog."
);
catalog_listing!(
    /// Appointments linked to one item.
    Appointments,
    LinkedAppointment,
    "No appointments linked."
);

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{ApprovalStatus, AuditAction, AuditEntity, PlanStatus, RoleClass};

    fn summary(id: u64, code: &str) -> PlanSummary {
        PlanSummary {
            id,
            code: code.to_string(),
            name: "Implant".to_string(),
            patient_id: 9,
            patient_name: None,
            status: PlanStatus::Pending,
            approval_status: ApprovalStatus::Draft,
            final_cost: dec!(1200),
            created_at: Timestamp::from_second(1640995200).unwrap(),
            updated_at: Timestamp::from_second(1640995200).unwrap(),
            total_phases: 1,
            total_items: 0,
            resolved_items: 0,
        }
    }

    #[test]
    fn test_plan_summaries_display() {
        let summaries = PlanSummaries(vec![
            summary(1, "TP-20220101-0001"),
            summary(2, "TP-20220101-0002"),
        ]);
        let output = summaries.to_string();
        assert!(output.contains("## TP-20220101-0001: Implant (0/0 items, 0%)"));
        assert!(output.contains("## TP-20220101-0002"));
        assert!(output.contains("- **Final cost**: 1200.00"));
        assert!(!output.starts_with("# "));

        assert_eq!(PlanSummaries(vec![]).to_string(), "No plans found.\n");
    }

    #[test]
    fn test_audit_trail_display() {
        let entry = AuditEntry {
            plan_id: 1,
            entity: AuditEntity::Item,
            entity_id: 4,
            action: AuditAction::ItemStatusChanged,
            actor_id: 2,
            status_before: Some("PENDING".to_string()),
            status_after: Some("SKIPPED".to_string()),
            note: Some("patient declined".to_string()),
            recorded_at: Timestamp::from_second(1640995200).unwrap(),
        };
        let output = AuditTrail(vec![entry]).to_string();
        assert!(output.contains("ITEM_STATUS_CHANGED ITEM 4 by 2: PENDING → SKIPPED"));
        assert!(output.contains("(patient declined)"));

        assert_eq!(AuditTrail(vec![]).to_string(), "No audit entries recorded.\n");
    }

    #[test]
    fn test_catalog_listing_display() {
        let actors = Actors(vec![Actor {
            id: 3,
            name: "Dr. Molar".to_string(),
            role: RoleClass::Employee,
            specialization: Some("Endodontics".to_string()),
            patient_id: None,
            active: false,
        }]);
        assert_eq!(actors.len(), 1);
        assert_eq!(
            actors.to_string(),
            "- Dr. Molar (ID: 3, EMPLOYEE), Endodontics [inactive]\n"
        );
        assert_eq!(Services(vec![]).to_string(), "No services in the catalog.\n");
    }
}
