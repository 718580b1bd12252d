//! Plan creation and plan-level structure changes.

use jiff::{civil::Date, Span};
use log::info;
use rusqlite::TransactionBehavior;
use rust_decimal::Decimal;

use super::{
    ensure_specialization,
    items::{expand_quantity, resolve_items, ResolvedItem},
    load_doctor, UnitOfWork,
};
use crate::{
    collaborators::Collaborators,
    db::{
        actor_queries, catalog_queries,
        item_queries::{self, NewItemRecord},
        phase_queries,
        plan_queries::{self, NewPlanRecord},
        Database,
    },
    error::{codes, OptionExt, PlannerError, Result},
    models::{Actor, AuditAction, AuditEntity, ItemStatus, Plan, PlanStatus, Template},
    params::{AddPhase, CancelPlan, CreateCustomPlan, CreatePlanFromTemplate},
    rules::{access, approval, ledger},
};

/// A phase about to be written, with its items already resolved.
struct PlannedPhase {
    name: String,
    estimated_days: Option<u32>,
    items: Vec<ResolvedItem>,
}

/// Everything needed to write a new plan besides its phases.
struct PlanHeader<'a> {
    name: &'a str,
    patient_id: u64,
    doctor_id: u64,
    template_id: Option<u64>,
    discount: Option<Decimal>,
    start_date: Option<Date>,
}

fn expected_end_date(start: Date, phases: &[PlannedPhase]) -> Result<Option<Date>> {
    if phases.iter().all(|phase| phase.estimated_days.is_none()) {
        return Ok(None);
    }
    let days: i64 = phases
        .iter()
        .filter_map(|phase| phase.estimated_days)
        .map(i64::from)
        .sum();
    let end = Span::new()
        .try_days(days)
        .and_then(|span| start.checked_add(span))
        .map_err(|e| {
            PlannerError::validation(
                codes::INVALID_DATE,
                format!("Cannot compute expected end date from {start} + {days} days: {e}"),
            )
        })?;
    Ok(Some(end))
}

fn template_phases(
    conn: &rusqlite::Connection,
    template: &Template,
) -> Result<Vec<PlannedPhase>> {
    let mut phases = Vec::with_capacity(template.phases.len());
    for phase in &template.phases {
        let mut items = Vec::new();
        for entry in &phase.items {
            let service = catalog_queries::select_service(conn, entry.service_id)?
                .or_not_found("Service", entry.service_id)?;
            if !service.active {
                return Err(PlannerError::conflict(format!(
                    "Template {} uses inactive service {}",
                    template.code, service.code
                )));
            }
            let item = ResolvedItem {
                name: service.name,
                service_id: Some(service.id),
                price: entry.price.unwrap_or(service.price),
                estimated_minutes: service.estimated_minutes,
                notes: None,
            };
            expand_quantity(item, entry.quantity, &mut items);
        }
        phases.push(PlannedPhase {
            name: phase.name.clone(),
            estimated_days: phase.estimated_days,
            items,
        });
    }
    Ok(phases)
}

impl UnitOfWork<'_> {
    /// Writes a new plan with its phases and items and records its creation.
    fn insert_plan_tree(&mut self, header: &PlanHeader<'_>, phases: Vec<PlannedPhase>) -> Result<u64> {
        let total: Decimal = phases
            .iter()
            .flat_map(|phase| phase.items.iter())
            .map(|item| item.price)
            .sum();
        let costs = ledger::open(total, header.discount.unwrap_or_default())?;
        let code = plan_queries::next_plan_code(self.conn(), self.today)?;
        let expected_end =
            expected_end_date(header.start_date.unwrap_or(self.today), &phases)?;

        let plan_id = plan_queries::insert_plan(
            self.conn(),
            &NewPlanRecord {
                code: &code,
                name: header.name,
                patient_id: header.patient_id,
                doctor_id: header.doctor_id,
                created_by: self.actor.id,
                template_id: header.template_id,
                costs,
                start_date: header.start_date,
                expected_end_date: expected_end,
                now: self.now,
            },
        )?;

        for (index, phase) in phases.into_iter().enumerate() {
            let phase_id = phase_queries::insert_phase(
                self.conn(),
                plan_id,
                index as u32 + 1,
                &phase.name,
                phase.estimated_days,
            )?;
            for (position, item) in phase.items.into_iter().enumerate() {
                let record = NewItemRecord {
                    phase_id,
                    sequence: position as u32 + 1,
                    name: item.name,
                    service_id: item.service_id,
                    price: item.price,
                    estimated_minutes: item.estimated_minutes,
                    status: ItemStatus::Pending,
                    notes: item.notes,
                };
                item_queries::insert_item(self.conn(), &record, self.now)?;
            }
        }

        let note = format!("{code} created, final cost {}", costs.final_cost);
        self.record(plan_id, AuditEntity::Plan, plan_id, AuditAction::Created)
            .with_note(Some(&note));
        info!("Plan {code} created for patient {}", header.patient_id);
        Ok(plan_id)
    }
}

impl Database {
    /// Opens a plan from a catalog template.
    ///
    /// The doctor must share the template's specialization. Template items are
    /// expanded by quantity and their prices snapshotted; the plan starts
    /// PENDING / DRAFT.
    pub fn create_plan_from_template(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &CreatePlanFromTemplate,
    ) -> Result<Plan> {
        params.validate()?;
        access::authorize_creation(actor)?;
        let mut uow =
            UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;

        actor_queries::select_patient(uow.conn(), params.patient_id)?
            .or_not_found("Patient", params.patient_id)?;
        let doctor = load_doctor(uow.conn(), params.doctor_id)?;
        let template = catalog_queries::select_template(uow.conn(), params.template_id)?
            .or_not_found("Template", params.template_id)?;
        if !template.active {
            return Err(PlannerError::conflict(format!(
                "Template {} is inactive",
                template.code
            )));
        }
        ensure_specialization(
            &doctor,
            template.specialization.as_deref(),
            &format!("Template {}", template.code),
        )?;

        let phases = template_phases(uow.conn(), &template)?;
        let header = PlanHeader {
            name: params.name.as_deref().unwrap_or(&template.name),
            patient_id: params.patient_id,
            doctor_id: doctor.id,
            template_id: Some(template.id),
            discount: params.discount,
            start_date: params.start_date,
        };
        let plan_id = uow.insert_plan_tree(&header, phases)?;

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan_id)?;
        uow.commit()?;
        Ok(plan)
    }

    /// Opens a plan from explicitly listed phases and items. Phases may be
    /// empty and filled in later while the plan is DRAFT.
    pub fn create_custom_plan(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &CreateCustomPlan,
    ) -> Result<Plan> {
        params.validate()?;
        access::authorize_creation(actor)?;
        let mut uow =
            UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;

        actor_queries::select_patient(uow.conn(), params.patient_id)?
            .or_not_found("Patient", params.patient_id)?;
        let doctor = load_doctor(uow.conn(), params.doctor_id)?;

        let mut phases = Vec::with_capacity(params.phases.len());
        for phase in &params.phases {
            phases.push(PlannedPhase {
                name: phase.name.trim().to_string(),
                estimated_days: phase.estimated_days,
                items: resolve_items(uow.conn(), &phase.items)?,
            });
        }
        let header = PlanHeader {
            name: params.name.trim(),
            patient_id: params.patient_id,
            doctor_id: doctor.id,
            template_id: None,
            discount: params.discount,
            start_date: params.start_date,
        };
        let plan_id = uow.insert_plan_tree(&header, phases)?;

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan_id)?;
        uow.commit()?;
        Ok(plan)
    }

    /// Appends an empty phase to a DRAFT plan.
    pub fn add_phase(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &AddPhase,
    ) -> Result<Plan> {
        params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let plan = uow.plan_for_mutation(&params.code, "add phase")?;
        approval::ensure_draft(plan.approval_status, "add phase")?;

        let number = phase_queries::next_phase_number(uow.conn(), plan.id)?;
        let phase_id = phase_queries::insert_phase(
            uow.conn(),
            plan.id,
            number,
            params.name.trim(),
            params.estimated_days,
        )?;
        plan_queries::touch_plan(uow.conn(), plan.id, uow.now)?;
        uow.record(plan.id, AuditEntity::Phase, phase_id, AuditAction::PhaseAdded)
            .with_note(Some(params.name.trim()));

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan.id)?;
        uow.commit()?;
        Ok(plan)
    }

    /// Cancels a plan. Terminal: nothing can change it afterwards.
    pub fn cancel_plan(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &CancelPlan,
    ) -> Result<Plan> {
        params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let plan = uow.plan_for_mutation(&params.code, "cancel plan")?;

        plan_queries::set_plan_status(uow.conn(), plan.id, PlanStatus::Cancelled, uow.now)?;
        uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::Cancelled)
            .with_transition(plan.status.as_str(), PlanStatus::Cancelled.as_str())
            .with_note(Some(params.reason.trim()));

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan.id)?;
        uow.commit()?;
        info!("Plan {} cancelled", plan.code);
        Ok(plan)
    }
}
