use log::info;
use rusqlite::TransactionBehavior;
use rust_decimal::Decimal;

use super::UnitOfWork;
use crate::{
    collaborators::Collaborators,
    db::{item_queries, plan_queries, Database},
    error::{PlannerError, Result},
    models::{Actor, AuditAction, AuditEntity, PriceOverride, PriceUpdateResult},
    params::UpdatePrices,
    rules::ledger,
};

impl Database {
    /// Finance adjustment of item prices and the plan discount.
    ///
    /// Unlike single-item edits this is allowed in every approval state; only
    /// terminal plans refuse it. The total is re-summed from every item that
    /// is not skipped.
    pub fn update_prices(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &UpdatePrices,
    ) -> Result<PriceUpdateResult> {
        params.validate()?;
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let plan = uow.plan_for_mutation(&params.code, "update prices")?;

        let mut updated_items = Vec::with_capacity(params.items.len());
        for update in &params.items {
            let mut item = plan.item(update.item_id).cloned().ok_or_else(|| {
                PlannerError::not_found(
                    "Item",
                    format!("{} in plan {}", update.item_id, plan.code),
                )
            })?;
            item.price = update.price;
            item.price_override = Some(PriceOverride {
                updated_by: actor.id,
                updated_at: uow.now,
                reason: params.reason.clone(),
            });
            item.updated_at = uow.now;
            item_queries::save_item(uow.conn(), &item)?;
            updated_items.push(item);
        }

        let billable: Vec<Decimal> = item_queries::select_items_for_plan(uow.conn(), plan.id)?
            .iter()
            .map(|item| item.billable_price())
            .collect();
        let ledger = ledger::resum(plan.costs(), &billable, params.discount)?;
        plan_queries::save_ledger(uow.conn(), plan.id, &ledger.after, uow.now)?;

        let note = match &params.reason {
            Some(reason) => format!(
                "{} price(s) changed, final {} -> {}: {reason}",
                updated_items.len(),
                ledger.before.final_cost,
                ledger.after.final_cost
            ),
            None => format!(
                "{} price(s) changed, final {} -> {}",
                updated_items.len(),
                ledger.before.final_cost,
                ledger.after.final_cost
            ),
        };
        uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::PricesUpdated)
            .with_note(Some(&note));
        uow.commit()?;

        info!(
            "Plan {} repriced: final cost {} -> {}",
            plan.code, ledger.before.final_cost, ledger.after.final_cost
        );
        Ok(PriceUpdateResult {
            plan_code: plan.code,
            updated_items,
            ledger,
        })
    }
}
