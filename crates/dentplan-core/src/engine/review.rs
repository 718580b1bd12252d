//! Approval workflow transitions.

use log::{debug, info};
use rusqlite::TransactionBehavior;

use super::UnitOfWork;
use crate::{
    collaborators::Collaborators,
    db::{item_queries, plan_queries, Database},
    error::Result,
    models::{Actor, ApprovalStatus, AuditAction, AuditEntity, ItemStatus, Plan},
    params::{DecidePlan, SubmitPlan},
    rules::{access, approval, Decision},
};

impl Database {
    /// DRAFT -> PENDING_REVIEW. The plan must own at least one item.
    pub fn submit_for_review(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &SubmitPlan,
    ) -> Result<Plan> {
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let plan = uow.plan_for_mutation(&params.code, "submit plan")?;
        approval::ensure_submittable(plan.approval_status, &plan.phases)?;

        plan_queries::set_approval_status(
            uow.conn(),
            plan.id,
            ApprovalStatus::PendingReview,
            uow.now,
        )?;
        uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::Submitted)
            .with_transition(
                plan.approval_status.as_str(),
                ApprovalStatus::PendingReview.as_str(),
            )
            .with_note(params.notes.as_deref());

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan.id)?;
        uow.commit()?;
        info!("Plan {} submitted for review", plan.code);
        Ok(plan)
    }

    /// Approves or rejects a plan pending review.
    ///
    /// Approval stamps the approver and activates every PENDING item that is
    /// linked to a catalog service: to WAITING_FOR_PREREQUISITE when the
    /// service has prerequisites, otherwise to READY_FOR_BOOKING. Rejection
    /// returns the plan to DRAFT; REJECTED is kept only in the audit trail.
    pub fn decide(
        &mut self,
        collaborators: &Collaborators,
        actor: &Actor,
        params: &DecidePlan,
    ) -> Result<Plan> {
        let mut uow = UnitOfWork::begin(self, collaborators, actor, TransactionBehavior::Immediate)?;
        let plan = uow.plan_for_mutation(&params.code, "decide on plan")?;
        access::authorize_admin(actor, "approve or reject plans")?;
        let note =
            approval::ensure_decidable(plan.approval_status, params.decision, params.notes.as_deref())?;
        let status = approval::status_after(params.decision);

        match params.decision {
            Decision::Approve => {
                plan_queries::record_decision(
                    uow.conn(),
                    plan.id,
                    status,
                    Some(actor.id),
                    Some(uow.now),
                    note.as_deref(),
                    uow.now,
                )?;

                let pending: Vec<(u64, u64)> = plan
                    .items()
                    .filter(|item| item.status == ItemStatus::Pending)
                    .filter_map(|item| item.service_id.map(|service_id| (item.id, service_id)))
                    .collect();
                for (item_id, service_id) in pending {
                    let target = approval::activation_status(
                        collaborators.prerequisites.has_prerequisites(service_id)?,
                    );
                    item_queries::set_item_status(uow.conn(), item_id, target, uow.now)?;
                    debug!("Item {item_id} activated on approval as {}", target.as_str());
                    uow.record(plan.id, AuditEntity::Item, item_id, AuditAction::AutoProgressed)
                        .with_transition(ItemStatus::Pending.as_str(), target.as_str())
                        .with_note(Some("activated on approval"));
                }

                uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::Approved)
                    .with_transition(plan.approval_status.as_str(), status.as_str())
                    .with_note(note.as_deref());
            }
            Decision::Reject => {
                plan_queries::record_decision(
                    uow.conn(),
                    plan.id,
                    status,
                    None,
                    None,
                    note.as_deref(),
                    uow.now,
                )?;
                uow.record(plan.id, AuditEntity::Plan, plan.id, AuditAction::Rejected)
                    .with_transition(
                        plan.approval_status.as_str(),
                        ApprovalStatus::Rejected.as_str(),
                    )
                    .with_note(note.as_deref());
            }
        }

        let plan = plan_queries::load_plan_by_id(uow.conn(), plan.id)?;
        uow.commit()?;
        info!(
            "Plan {} {} by actor {}",
            plan.code,
            match params.decision {
                Decision::Approve => "approved",
                Decision::Reject => "rejected",
            },
            actor.id
        );
        Ok(plan)
    }
}
