//! Ownership-based authorization.

use log::warn;

use crate::{
    error::{PlannerError, Result},
    models::{Actor, Plan, RoleClass},
};

/// Guard run before every mutation of a plan.
///
/// Administrators always pass, patients never do, and staff pass only on plans
/// they created.
pub fn authorize_mutation(actor: &Actor, plan: &Plan) -> Result<()> {
    match actor.role {
        RoleClass::Admin => Ok(()),
        RoleClass::Patient => {
            warn!("Patient actor {} denied mutation of plan {}", actor.id, plan.code);
            Err(PlannerError::access_denied(format!(
                "Patients have read-only access to plan {}",
                plan.code
            )))
        }
        RoleClass::Employee if plan.created_by == actor.id => Ok(()),
        RoleClass::Employee => {
            let owner = plan
                .created_by_name
                .clone()
                .unwrap_or_else(|| format!("actor {}", plan.created_by));
            warn!(
                "Actor {} denied mutation of plan {} owned by {}",
                actor.id, plan.code, plan.created_by
            );
            Err(PlannerError::access_denied(format!(
                "Plan {} belongs to {owner}; only its creator or an administrator may change it",
                plan.code
            )))
        }
    }
}

/// Read visibility: staff see plans they own, treat, or are assigned to;
/// patients see their own plans.
pub fn can_read(actor: &Actor, plan: &Plan) -> bool {
    match actor.role {
        RoleClass::Admin => true,
        RoleClass::Employee => {
            plan.created_by == actor.id
                || plan.doctor_id == actor.id
                || plan
                    .items()
                    .any(|item| item.assigned_doctor_id == Some(actor.id))
        }
        RoleClass::Patient => actor.patient_id == Some(plan.patient_id),
    }
}

pub fn authorize_read(actor: &Actor, plan: &Plan) -> Result<()> {
    if can_read(actor, plan) {
        Ok(())
    } else {
        Err(PlannerError::access_denied(format!(
            "Actor {} may not view plan {}",
            actor.id, plan.code
        )))
    }
}

/// Only staff and administrators open new plans.
pub fn authorize_creation(actor: &Actor) -> Result<()> {
    match actor.role {
        RoleClass::Admin | RoleClass::Employee => Ok(()),
        RoleClass::Patient => Err(PlannerError::access_denied(
            "Patients cannot create treatment plans",
        )),
    }
}

/// Front-desk work such as registering patients and appointments.
pub fn authorize_staff(actor: &Actor, action: &str) -> Result<()> {
    match actor.role {
        RoleClass::Admin | RoleClass::Employee => Ok(()),
        RoleClass::Patient => Err(PlannerError::access_denied(format!(
            "Patients may not {action}"
        ))),
    }
}

/// Approval decisions and catalog administration.
pub fn authorize_admin(actor: &Actor, action: &str) -> Result<()> {
    if actor.is_admin() {
        Ok(())
    } else {
        Err(PlannerError::access_denied(format!(
            "Only administrators may {action}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;

    use super::*;
    use crate::{
        error::ErrorKind,
        models::{ApprovalStatus, Item, ItemStatus, Phase, PlanStatus},
    };

    fn actor(id: u64, role: RoleClass) -> Actor {
        Actor {
            id,
            name: format!("actor {id}"),
            role,
            specialization: None,
            patient_id: None,
            active: true,
        }
    }

    fn plan(created_by: u64) -> Plan {
        let now = Timestamp::now();
        Plan {
            id: 1,
            code: "TP-20260101-0001".into(),
            name: "Restoration".into(),
            patient_id: 50,
            patient_name: None,
            doctor_id: 7,
            created_by,
            created_by_name: Some("Dr. A".into()),
            template_id: None,
            status: PlanStatus::Pending,
            approval_status: ApprovalStatus::Draft,
            total_cost: Decimal::ZERO,
            discount_amount: Decimal::ZERO,
            final_cost: Decimal::ZERO,
            start_date: None,
            expected_end_date: None,
            approved_by: None,
            approved_at: None,
            approval_note: None,
            created_at: now,
            updated_at: now,
            phases: Vec::new(),
        }
    }

    #[test]
    fn test_admin_always_allowed() {
        assert!(authorize_mutation(&actor(99, RoleClass::Admin), &plan(1)).is_ok());
    }

    #[test]
    fn test_patient_always_denied() {
        let mut patient = actor(50, RoleClass::Patient);
        patient.patient_id = Some(50);
        let err = authorize_mutation(&patient, &plan(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
    }

    #[test]
    fn test_employee_owner_only() {
        assert!(authorize_mutation(&actor(1, RoleClass::Employee), &plan(1)).is_ok());

        let err = authorize_mutation(&actor(2, RoleClass::Employee), &plan(1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::AccessDenied);
        assert!(err.to_string().contains("Dr. A"));
    }

    #[test]
    fn test_read_visibility() {
        let mut plan = plan(1);
        assert!(can_read(&actor(1, RoleClass::Employee), &plan));
        assert!(can_read(&actor(7, RoleClass::Employee), &plan));
        assert!(!can_read(&actor(8, RoleClass::Employee), &plan));

        let now = Timestamp::now();
        plan.phases.push(Phase {
            id: 1,
            plan_id: 1,
            phase_number: 1,
            name: "Surgery".into(),
            status: Default::default(),
            start_date: None,
            completion_date: None,
            estimated_days: None,
            items: vec![Item {
                id: 1,
                phase_id: 1,
                sequence: 1,
                name: "Extraction".into(),
                service_id: None,
                price: Decimal::ONE,
                estimated_minutes: None,
                status: ItemStatus::Pending,
                completed_at: None,
                assigned_doctor_id: Some(8),
                notes: None,
                price_override: None,
                created_at: now,
                updated_at: now,
            }],
        });
        assert!(can_read(&actor(8, RoleClass::Employee), &plan));

        let mut own = actor(200, RoleClass::Patient);
        own.patient_id = Some(50);
        let mut other = actor(201, RoleClass::Patient);
        other.patient_id = Some(51);
        assert!(can_read(&own, &plan));
        assert!(!can_read(&other, &plan));
        assert!(authorize_read(&other, &plan).is_err());
    }

    #[test]
    fn test_creation_and_admin_actions() {
        assert!(authorize_creation(&actor(1, RoleClass::Employee)).is_ok());
        assert!(authorize_creation(&actor(1, RoleClass::Patient)).is_err());
        assert!(authorize_admin(&actor(1, RoleClass::Admin), "approve").is_ok());
        assert_eq!(
            authorize_admin(&actor(1, RoleClass::Employee), "approve")
                .unwrap_err()
                .kind(),
            ErrorKind::AccessDenied
        );
    }
}
