//! Treatment-plan lifecycle operations.
//!
//! Every mutating operation runs as one [`UnitOfWork`]: a single SQLite
//! transaction, the resolved actor, the collaborator set and the clock reading
//! taken once at the start. The control flow of an operation is always the
//! same:
//!
//! ```text
//! load aggregate ─▶ access guard ─▶ approval guard ─▶ mutate
//!      ─▶ ledger ─▶ cascade (re-read per stage) ─▶ commit ─▶ audit flush
//! ```
//!
//! Audit entries are buffered and only handed to the [`AuditRecorder`] after
//! the transaction commits, so a rolled-back operation leaves no trace.
//!
//! [`AuditRecorder`]: crate::collaborators::AuditRecorder

use jiff::{civil::Date, Timestamp, Zoned};
use log::error;
use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{
    collaborators::Collaborators,
    db::{actor_queries, item_queries, phase_queries, plan_queries, Database},
    error::{codes, DatabaseResultExt, OptionExt, PlannerError, Result},
    models::{Actor, AuditAction, AuditEntity, AuditEntry, Item, Phase, Plan, RoleClass},
    rules::{access, approval},
};

mod catalog;
mod creation;
mod items;
mod pricing;
mod progression;
mod reads;
mod review;
mod status;

pub(crate) struct UnitOfWork<'a> {
    tx: Transaction<'a>,
    collaborators: &'a Collaborators,
    actor: &'a Actor,
    audit: Vec<AuditEntry>,
    today: Date,
    now: Timestamp,
}

impl<'a> UnitOfWork<'a> {
    pub(crate) fn begin(
        db: &'a mut Database,
        collaborators: &'a Collaborators,
        actor: &'a Actor,
        behavior: TransactionBehavior,
    ) -> Result<Self> {
        let tx = db.begin(behavior)?;
        let zoned = Zoned::now();
        Ok(Self {
            tx,
            collaborators,
            actor,
            audit: Vec::new(),
            today: zoned.date(),
            now: zoned.timestamp(),
        })
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.tx
    }

    /// Buffers an audit entry for the current actor. Statuses and note are
    /// filled in through the returned entry.
    pub(crate) fn record(
        &mut self,
        plan_id: u64,
        entity: AuditEntity,
        entity_id: u64,
        action: AuditAction,
    ) -> &mut AuditEntry {
        self.audit.push(AuditEntry {
            plan_id,
            entity,
            entity_id,
            action,
            actor_id: self.actor.id,
            status_before: None,
            status_after: None,
            note: None,
            recorded_at: self.now,
        });
        let last = self.audit.len() - 1;
        &mut self.audit[last]
    }

    /// Commits the transaction, then flushes buffered audit entries.
    ///
    /// The operation has already taken effect when the flush runs, so a
    /// failing recorder is logged rather than reported to the caller.
    pub(crate) fn commit(self) -> Result<()> {
        let UnitOfWork {
            tx,
            collaborators,
            audit,
            ..
        } = self;
        tx.commit().db_context("Failed to commit transaction")?;
        for entry in &audit {
            if let Err(e) = collaborators.audit.append(entry) {
                error!(
                    "Failed to record audit entry {} for plan {}: {e}",
                    entry.action.as_str(),
                    entry.plan_id
                );
            }
        }
        Ok(())
    }

    /// Loads a whole plan and runs the mutation guards.
    pub(crate) fn plan_for_mutation(&self, code: &str, action: &str) -> Result<Plan> {
        let plan = plan_queries::load_plan(self.conn(), code)?;
        access::authorize_mutation(self.actor, &plan)?;
        approval::ensure_open(plan.status, action)?;
        Ok(plan)
    }

    /// Loads the plan owning `item_id` and runs the mutation guards.
    pub(crate) fn item_for_mutation(&self, item_id: u64, action: &str) -> Result<(Plan, Item)> {
        let plan_id =
            item_queries::plan_id_for_item(self.conn(), item_id)?.or_not_found("Item", item_id)?;
        let plan = plan_queries::load_plan_by_id(self.conn(), plan_id)?;
        access::authorize_mutation(self.actor, &plan)?;
        approval::ensure_open(plan.status, action)?;
        let item = plan.item(item_id).cloned().or_not_found("Item", item_id)?;
        Ok((plan, item))
    }

    /// Loads the plan owning `phase_id` and runs the mutation guards.
    pub(crate) fn phase_for_mutation(&self, phase_id: u64, action: &str) -> Result<(Plan, Phase)> {
        let header =
            phase_queries::select_phase(self.conn(), phase_id)?.or_not_found("Phase", phase_id)?;
        let plan = plan_queries::load_plan_by_id(self.conn(), header.plan_id)?;
        access::authorize_mutation(self.actor, &plan)?;
        approval::ensure_open(plan.status, action)?;
        let phase = plan.phase(phase_id).cloned().or_not_found("Phase", phase_id)?;
        Ok((plan, phase))
    }
}

/// Looks up an actor who is to treat a patient: must exist, be staff and be
/// active.
fn load_doctor(conn: &Connection, doctor_id: u64) -> Result<Actor> {
    let doctor = actor_queries::select_actor(conn, doctor_id)?.or_not_found("Doctor", doctor_id)?;
    if doctor.role == RoleClass::Patient {
        return Err(PlannerError::invalid_input("doctor_id")
            .with_reason(format!("actor {doctor_id} is a patient account, not staff")));
    }
    if !doctor.active {
        return Err(PlannerError::validation(
            codes::DOCTOR_INACTIVE,
            format!("Doctor {} is inactive", doctor.name),
        ));
    }
    Ok(doctor)
}

/// Case-insensitive specialization match. No requirement always matches.
fn ensure_specialization(doctor: &Actor, required: Option<&str>, subject: &str) -> Result<()> {
    let Some(required) = required else {
        return Ok(());
    };
    let matches = doctor
        .specialization
        .as_deref()
        .is_some_and(|own| own.eq_ignore_ascii_case(required));
    if !matches {
        return Err(PlannerError::validation(
            codes::SPECIALIZATION_MISMATCH,
            format!(
                "{subject} requires specialization {required}, doctor {} has {}",
                doctor.name,
                doctor.specialization.as_deref().unwrap_or("none")
            ),
        ));
    }
    Ok(())
}
