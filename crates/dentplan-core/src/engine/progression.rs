//! Auto-progression cascade.
//!
//! Each stage re-reads its working set through the open transaction before
//! deciding, so it always observes the writes of the stages before it.

use log::{debug, info};

use super::UnitOfWork;
use crate::{
    db::{item_queries, phase_queries, plan_queries},
    error::{OptionExt, Result},
    models::{
        AuditAction, AuditEntity, CascadeReport, Item, ItemStatus, PhaseStatus, PlanStatus,
        PlanTransition,
    },
    rules::progression,
};

impl UnitOfWork<'_> {
    /// Runs every stage that follows a successful item transition.
    ///
    /// `item` is the item as written, with its new status.
    pub(crate) fn cascade_after_transition(
        &mut self,
        plan_id: u64,
        item: &Item,
    ) -> Result<CascadeReport> {
        let mut report = CascadeReport::default();

        if item.status == ItemStatus::Completed {
            self.activate_next_item(plan_id, item, &mut report)?;
            self.unlock_dependents(plan_id, item, &mut report)?;
        }
        self.start_phase_if_needed(plan_id, item, &mut report)?;
        self.settle_phase(plan_id, item.phase_id, &mut report)?;
        self.activate_plan_if_needed(plan_id, &mut report)?;
        self.settle_plan(plan_id, &mut report)?;

        Ok(report)
    }

    /// Completion checks only; used after structural edits such as deletion.
    pub(crate) fn settle(&mut self, plan_id: u64, phase_id: u64) -> Result<CascadeReport> {
        let mut report = CascadeReport::default();
        self.settle_phase(plan_id, phase_id, &mut report)?;
        self.settle_plan(plan_id, &mut report)?;
        Ok(report)
    }

    fn activate_next_item(
        &mut self,
        plan_id: u64,
        completed: &Item,
        report: &mut CascadeReport,
    ) -> Result<()> {
        let phase_items = item_queries::select_items_for_phase(self.conn(), completed.phase_id)?;
        let Some(next) = progression::next_item_to_activate(completed, &phase_items) else {
            return Ok(());
        };
        let next_id = next.id;

        item_queries::set_item_status(self.conn(), next_id, ItemStatus::ReadyForBooking, self.now)?;
        debug!("Item {next_id} activated after item {} completed", completed.id);
        self.record(plan_id, AuditEntity::Item, next_id, AuditAction::AutoProgressed)
            .with_transition(
                ItemStatus::Pending.as_str(),
                ItemStatus::ReadyForBooking.as_str(),
            )
            .with_note(Some("next item activated"));
        report.activated_items.push(next_id);
        Ok(())
    }

    fn unlock_dependents(
        &mut self,
        plan_id: u64,
        completed: &Item,
        report: &mut CascadeReport,
    ) -> Result<()> {
        let Some(service_id) = completed.service_id else {
            return Ok(());
        };
        let unlocked = self
            .collaborators
            .prerequisites
            .services_unlocked_by(service_id)?;
        if unlocked.is_empty() {
            return Ok(());
        }

        let plan_items = item_queries::select_items_for_plan(self.conn(), plan_id)?;
        let targets: Vec<u64> =
            progression::items_to_unlock(&plan_items, completed.id, |s| unlocked.contains(&s))
                .into_iter()
                .map(|item| item.id)
                .collect();

        for item_id in targets {
            item_queries::set_item_status(
                self.conn(),
                item_id,
                ItemStatus::ReadyForBooking,
                self.now,
            )?;
            debug!("Item {item_id} unlocked by service {service_id}");
            self.record(plan_id, AuditEntity::Item, item_id, AuditAction::AutoProgressed)
                .with_transition(
                    ItemStatus::WaitingForPrerequisite.as_str(),
                    ItemStatus::ReadyForBooking.as_str(),
                )
                .with_note(Some("prerequisite completed"));
            report.unlocked_items.push(item_id);
        }
        Ok(())
    }

    fn start_phase_if_needed(
        &mut self,
        plan_id: u64,
        item: &Item,
        report: &mut CascadeReport,
    ) -> Result<()> {
        let phase = phase_queries::select_phase(self.conn(), item.phase_id)?
            .or_not_found("Phase", item.phase_id)?;
        if !progression::phase_should_start(phase.status, item.status) {
            return Ok(());
        }

        phase_queries::start_phase(self.conn(), phase.id, self.today)?;
        debug!("Phase {} started", phase.id);
        self.record(plan_id, AuditEntity::Phase, phase.id, AuditAction::AutoProgressed)
            .with_transition(phase.status.as_str(), PhaseStatus::InProgress.as_str());
        report.started_phases.push(phase.id);
        Ok(())
    }

    fn settle_phase(
        &mut self,
        plan_id: u64,
        phase_id: u64,
        report: &mut CascadeReport,
    ) -> Result<()> {
        let phase =
            phase_queries::select_phase(self.conn(), phase_id)?.or_not_found("Phase", phase_id)?;
        let items = item_queries::select_items_for_phase(self.conn(), phase_id)?;
        if !progression::phase_should_complete(phase.status, &items) {
            return Ok(());
        }

        phase_queries::complete_phase(self.conn(), phase_id, self.today)?;
        debug!("Phase {phase_id} completed");
        self.record(plan_id, AuditEntity::Phase, phase_id, AuditAction::AutoProgressed)
            .with_transition(phase.status.as_str(), PhaseStatus::Completed.as_str());
        report.completed_phases.push(phase_id);
        Ok(())
    }

    fn activate_plan_if_needed(&mut self, plan_id: u64, report: &mut CascadeReport) -> Result<()> {
        let plan =
            plan_queries::select_plan_by_id(self.conn(), plan_id)?.or_not_found("Plan", plan_id)?;
        let items = item_queries::select_items_for_plan(self.conn(), plan_id)?;
        if !progression::plan_should_activate(plan.status, &items) {
            return Ok(());
        }

        plan_queries::set_plan_status(self.conn(), plan_id, PlanStatus::InProgress, self.now)?;
        plan_queries::set_start_date_if_unset(self.conn(), plan_id, self.today)?;
        info!("Plan {} is now in progress", plan.code);
        self.transition_plan(plan_id, plan.status, PlanStatus::InProgress, report);
        Ok(())
    }

    fn settle_plan(&mut self, plan_id: u64, report: &mut CascadeReport) -> Result<()> {
        let plan =
            plan_queries::select_plan_by_id(self.conn(), plan_id)?.or_not_found("Plan", plan_id)?;
        let phases = phase_queries::select_phases(self.conn(), plan_id)?;
        if !progression::plan_should_complete(plan.status, &phases) {
            return Ok(());
        }

        plan_queries::set_plan_status(self.conn(), plan_id, PlanStatus::Completed, self.now)?;
        info!("Plan {} completed", plan.code);
        self.transition_plan(plan_id, plan.status, PlanStatus::Completed, report);
        Ok(())
    }

    fn transition_plan(
        &mut self,
        plan_id: u64,
        from: PlanStatus,
        to: PlanStatus,
        report: &mut CascadeReport,
    ) {
        self.record(plan_id, AuditEntity::Plan, plan_id, AuditAction::AutoProgressed)
            .with_transition(from.as_str(), to.as_str());
        // Keep the earliest origin when several stages move the plan
        let from = report.plan_transition.map_or(from, |earlier| earlier.from);
        report.plan_transition = Some(PlanTransition { from, to });
    }
}
