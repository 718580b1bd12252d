use log::debug;
use rusqlite::TransactionBehavior;

use super::UnitOfWork;
use crate::{
    collaborators::Collaborators,
    db::{item_queries, plan_queries, Database},
    error::{OptionExt, Result},
    models::{Actor, AuditAction, AuditEntity, CascadeReport, ItemStatus, StatusUpdateResult},
    params::UpdateItemStatus,
    rules::{
        approval,
        ledger::{self, Direction},
        transitions, FinancialEffect, Transition,
    },
};

impl Database {
    /// Moves an item to a new clinical status and runs everything that
    /// follows from it: ledger adjustment on entering or leaving SKIPPED, then
    /// the auto-progression cascade.
    ///
    /// Requesting the item's current status is a successful no-op.
    pub fn update_item_status(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &UpdateItemStatus,
    ) -> Result<StatusUpdateResult> {
        let target = params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let (plan, mut item) = uow.item_for_mutation(params.item_id, "update item status")?;

        let appointments = if target == ItemStatus::Skipped {
            collaborators.appointments.appointments_for_item(item.id)?
        } else {
            Vec::new()
        };

        let (from, financial) = match transitions::check(item.status, target, &appointments)? {
            Transition::NoOp => {
                debug!("Item {} already {}", item.id, target.as_str());
                uow.commit()?;
                return Ok(StatusUpdateResult {
                    item,
                    changed: false,
                    ledger: None,
                    cascade: CascadeReport::default(),
                });
            }
            Transition::Apply {
                from, financial, ..
            } => (from, financial),
        };
        if financial.is_some() {
            approval::ensure_ledger_editable(plan.approval_status, "skip or restore item")?;
        }

        item.status = target;
        item.completed_at = if target == ItemStatus::Completed {
            Some(params.completed_at.unwrap_or(uow.now))
        } else {
            None
        };
        if let Some(notes) = &params.notes {
            item.notes = Some(notes.clone());
        }
        item.updated_at = uow.now;
        item_queries::save_item(uow.conn(), &item)?;

        let ledger = match financial {
            Some(effect) => {
                let direction = match effect {
                    FinancialEffect::Remove => Direction::Subtract,
                    FinancialEffect::Restore => Direction::Add,
                };
                let change = ledger::apply_delta(plan.costs(), item.price, direction)?;
                plan_queries::save_ledger(uow.conn(), plan.id, &change.after, uow.now)?;
                Some(change)
            }
            None => None,
        };

        uow.record(plan.id, AuditEntity::Item, item.id, AuditAction::ItemStatusChanged)
            .with_transition(from.as_str(), target.as_str())
            .with_note(params.notes.as_deref());

        let cascade = uow.cascade_after_transition(plan.id, &item)?;
        let item = item_queries::select_item(uow.conn(), item.id)?.or_not_found("Item", item.id)?;
        uow.commit()?;

        Ok(StatusUpdateResult {
            item,
            changed: true,
            ledger,
            cascade,
        })
    }
}
