//! Item-level edits: additions, updates, deletion, reordering and doctor
//! assignment.

use log::{debug, info};
use rusqlite::{Connection, TransactionBehavior};
use rust_decimal::Decimal;

use super::{ensure_specialization, load_doctor, UnitOfWork};
use crate::{
    collaborators::Collaborators,
    db::{
        catalog_queries,
        item_queries::{self, NewItemRecord},
        phase_queries, plan_queries, Database,
    },
    error::{codes, OptionExt, PlannerError, Result},
    models::{
        Actor, AddItemsResult, ApprovalStatus, AuditAction, AuditEntity, DeleteItemResult, Item,
        ItemStatus, PhaseStatus, PriceOverride, ReorderResult,
    },
    params::{AddItems, AssignDoctor, NewItem, ReorderItems, UpdateItem},
    rules::{
        approval,
        ledger::{self, Direction},
    },
};

/// A requested item with catalog defaults filled in, one per unit of
/// quantity.
#[derive(Debug, Clone)]
pub(super) struct ResolvedItem {
    pub name: String,
    pub service_id: Option<u64>,
    pub price: Decimal,
    pub estimated_minutes: Option<u32>,
    pub notes: Option<String>,
}

/// Resolves catalog services and expands quantities.
pub(super) fn resolve_items(conn: &Connection, items: &[NewItem]) -> Result<Vec<ResolvedItem>> {
    let mut resolved = Vec::new();
    for item in items {
        let base = match item.service_id {
            Some(service_id) => {
                let service = catalog_queries::select_service(conn, service_id)?
                    .or_not_found("Service", service_id)?;
                if !service.active {
                    return Err(PlannerError::conflict(format!(
                        "Service {} is inactive",
                        service.code
                    )));
                }
                ResolvedItem {
                    name: item.name.clone().unwrap_or(service.name),
                    service_id: Some(service_id),
                    price: item.price.unwrap_or(service.price),
                    estimated_minutes: item.estimated_minutes.or(service.estimated_minutes),
                    notes: item.notes.clone(),
                }
            }
            None => ResolvedItem {
                name: item.name.clone().unwrap_or_default(),
                service_id: None,
                price: item.price.unwrap_or_default(),
                estimated_minutes: item.estimated_minutes,
                notes: item.notes.clone(),
            },
        };
        expand_quantity(base, item.quantity, &mut resolved);
    }
    Ok(resolved)
}

/// Pushes `quantity` copies of `item`, numbering their names when more than
/// one.
pub(super) fn expand_quantity(item: ResolvedItem, quantity: u32, out: &mut Vec<ResolvedItem>) {
    if quantity <= 1 {
        out.push(item);
        return;
    }
    for index in 1..=quantity {
        out.push(ResolvedItem {
            name: format!("{} ({index}/{quantity})", item.name),
            ..item.clone()
        });
    }
}

fn ensure_editable(item: &Item, action: &str) -> Result<()> {
    if item.status.is_locked_for_edit() {
        return Err(PlannerError::conflict(format!(
            "Cannot {action} item {}: it is {}",
            item.id,
            item.status.as_str()
        )));
    }
    Ok(())
}

impl Database {
    /// Appends items to a phase.
    ///
    /// Allowed while the plan is DRAFT or APPROVED. On an approved plan the
    /// addition is an emergent change: it sends the plan back to review unless
    /// `auto_submit` is off, in which case the new items are activated right
    /// away.
    pub fn add_items_to_phase(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &AddItems,
    ) -> Result<AddItemsResult> {
        params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let (plan, phase) = uow.phase_for_mutation(params.phase_id, "add items")?;
        let policy = approval::addition_policy(plan.approval_status, params.auto_submit)?;

        let resolved = resolve_items(uow.conn(), &params.items)?;
        let mut sequence = item_queries::next_sequence(uow.conn(), phase.id)?;
        let mut new_ids = Vec::with_capacity(resolved.len());
        let mut prices = Vec::with_capacity(resolved.len());

        for entry in resolved {
            let status = match (policy.activate_immediately, entry.service_id) {
                (true, Some(service_id)) => approval::activation_status(
                    collaborators.prerequisites.has_prerequisites(service_id)?,
                ),
                _ => ItemStatus::Pending,
            };
            prices.push(entry.price);
            let record = NewItemRecord {
                phase_id: phase.id,
                sequence,
                name: entry.name,
                service_id: entry.service_id,
                price: entry.price,
                estimated_minutes: entry.estimated_minutes,
                status,
                notes: entry.notes,
            };
            new_ids.push(item_queries::insert_item(uow.conn(), &record, uow.now)?);
            sequence += 1;
        }

        let ledger = ledger::add_items(plan.costs(), &prices)?;
        plan_queries::save_ledger(uow.conn(), plan.id, &ledger.after, uow.now)?;

        if phase.status == PhaseStatus::Completed {
            phase_queries::reopen_phase(uow.conn(), phase.id)?;
            debug!("Phase {} reopened by new items", phase.id);
            uow.record(plan.id, AuditEntity::Phase, phase.id, AuditAction::AutoProgressed)
                .with_transition(
                    PhaseStatus::Completed.as_str(),
                    PhaseStatus::InProgress.as_str(),
                );
        }

        let approval_status = if policy.resubmit {
            plan_queries::set_approval_status(
                uow.conn(),
                plan.id,
                ApprovalStatus::PendingReview,
                uow.now,
            )?;
            info!("Plan {} sent back to review by new items", plan.code);
            uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::Resubmitted)
                .with_transition(
                    plan.approval_status.as_str(),
                    ApprovalStatus::PendingReview.as_str(),
                )
                .with_note(Some("items added to an approved plan"));
            ApprovalStatus::PendingReview
        } else {
            plan.approval_status
        };

        let note = format!("{} item(s) added", new_ids.len());
        uow.record(plan.id, AuditEntity::Phase, phase.id, AuditAction::ItemsAdded)
            .with_note(Some(&note));

        let items = item_queries::select_items_for_phase(uow.conn(), phase.id)?
            .into_iter()
            .filter(|item| new_ids.contains(&item.id))
            .collect();
        uow.commit()?;

        Ok(AddItemsResult {
            phase_id: phase.id,
            items,
            ledger,
            approval_status,
            resubmitted: policy.resubmit,
        })
    }

    /// Edits an item's descriptive fields and price. DRAFT plans only, and
    /// never once the item is scheduled, underway or done.
    pub fn update_item(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &UpdateItem,
    ) -> Result<Item> {
        params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let (plan, mut item) = uow.item_for_mutation(params.item_id, "update item")?;
        approval::ensure_draft(plan.approval_status, "update item")?;
        ensure_editable(&item, "update")?;

        if let Some(name) = &params.name {
            item.name = name.trim().to_string();
        }
        if let Some(minutes) = params.estimated_minutes {
            item.estimated_minutes = Some(minutes);
        }
        if let Some(notes) = &params.notes {
            item.notes = Some(notes.clone());
        }

        match params.price {
            Some(price) if price != item.price => {
                // Skipped items are already out of the total
                if item.status != ItemStatus::Skipped {
                    let change = ledger::reprice(plan.costs(), item.price, price)?;
                    plan_queries::save_ledger(uow.conn(), plan.id, &change.after, uow.now)?;
                }
                debug!("Item {} repriced {} -> {price}", item.id, item.price);
                item.price = price;
                item.price_override = Some(PriceOverride {
                    updated_by: actor.id,
                    updated_at: uow.now,
                    reason: params.reason.clone(),
                });
            }
            _ => {}
        }

        item.updated_at = uow.now;
        item_queries::save_item(uow.conn(), &item)?;
        uow.record(plan.id, AuditEntity::Item, item.id, AuditAction::ItemUpdated)
            .with_note(params.reason.as_deref());
        uow.commit()?;

        Ok(item)
    }

    /// Removes an item from a DRAFT plan, taking its price out of the total in
    /// the same transaction.
    pub fn delete_item(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        item_id: u64,
    ) -> Result<DeleteItemResult> {
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let (plan, item) = uow.item_for_mutation(item_id, "delete item")?;
        approval::ensure_draft(plan.approval_status, "delete item")?;
        ensure_editable(&item, "delete")?;

        let ledger = ledger::apply_delta(plan.costs(), item.billable_price(), Direction::Subtract)?;
        plan_queries::save_ledger(uow.conn(), plan.id, &ledger.after, uow.now)?;
        item_queries::delete_item(uow.conn(), &item)?;

        uow.record(plan.id, AuditEntity::Item, item.id, AuditAction::ItemDeleted)
            .with_note(Some(&item.name));
        let cascade = uow.settle(plan.id, item.phase_id)?;
        uow.commit()?;

        Ok(DeleteItemResult {
            item,
            ledger,
            cascade,
        })
    }

    /// Renumbers a phase's items 1..N in the submitted order.
    ///
    /// Runs in an exclusive transaction so concurrent reorders of the same
    /// phase cannot interleave.
    pub fn reorder_items(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &ReorderItems,
    ) -> Result<ReorderResult> {
        params.validate()?;
        let mut uow =
            UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Exclusive)?;
        let (plan, phase) = uow.phase_for_mutation(params.phase_id, "reorder items")?;
        approval::ensure_reorderable(plan.approval_status)?;

        if params.item_ids.len() != phase.items.len() {
            return Err(PlannerError::validation(
                codes::ITEM_COUNT_MISMATCH,
                format!(
                    "Phase {} has {} item(s) but {} were submitted",
                    phase.id,
                    phase.items.len(),
                    params.item_ids.len()
                ),
            ));
        }
        if let Some(foreign) = params
            .item_ids
            .iter()
            .find(|id| !phase.items.iter().any(|item| item.id == **id))
        {
            return Err(PlannerError::validation(
                codes::ITEM_NOT_IN_PHASE,
                format!("Item {foreign} does not belong to phase {}", phase.id),
            ));
        }

        item_queries::assign_sequences(uow.conn(), &params.item_ids, uow.now)?;
        uow.record(plan.id, AuditEntity::Phase, phase.id, AuditAction::ItemsReordered);
        let items = item_queries::select_items_for_phase(uow.conn(), phase.id)?;
        uow.commit()?;

        Ok(ReorderResult {
            phase_id: phase.id,
            items,
        })
    }

    /// Assigns the treating doctor of an item. Allowed in every approval
    /// state while the item is still open.
    pub fn assign_doctor(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &AssignDoctor,
    ) -> Result<Item> {
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let (plan, mut item) = uow.item_for_mutation(params.item_id, "assign doctor")?;
        if item.status.is_resolved() {
            return Err(PlannerError::conflict(format!(
                "Cannot assign a doctor to item {}: it is {}",
                item.id,
                item.status.as_str()
            )));
        }

        let doctor = load_doctor(uow.conn(), params.doctor_id)?;
        if let Some(service_id) = item.service_id {
            let service = catalog_queries::select_service(uow.conn(), service_id)?
                .or_not_found("Service", service_id)?;
            ensure_specialization(
                &doctor,
                service.specialization.as_deref(),
                &format!("Service {}", service.code),
            )?;
        }

        item.assigned_doctor_id = Some(doctor.id);
        if let Some(notes) = &params.notes {
            item.notes = Some(notes.clone());
        }
        item.updated_at = uow.now;
        item_queries::save_item(uow.conn(), &item)?;

        let note = match &params.notes {
            Some(notes) => format!("assigned {}: {notes}", doctor.name),
            None => format!("assigned {}", doctor.name),
        };
        uow.record(plan.id, AuditEntity::Item, item.id, AuditAction::DoctorAssigned)
            .with_note(Some(&note));
        uow.commit()?;

        Ok(item)
    }
}
