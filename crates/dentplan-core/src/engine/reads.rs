//! Read operations. These never open a write transaction.

use crate::{
    collaborators::Collaborators,
    db::{actor_queries, item_queries, plan_queries, Database},
    error::{OptionExt, PlannerError, Result},
    models::{Actor, AuditEntry, Item, Plan, PlanSummary, RoleClass},
    params::ListPlans,
    rules::access,
};

impl Database {
    /// Resolves the acting user once at the request boundary.
    pub fn resolve_actor(&self, actor_id: u64) -> Result<Actor> {
        let actor = actor_queries::select_actor(self.connection(), actor_id)?
            .or_not_found("Actor", actor_id)?;
        if !actor.active {
            return Err(PlannerError::access_denied(format!(
                "Actor {} is deactivated",
                actor.name
            )));
        }
        Ok(actor)
    }

    pub fn get_plan(&self, actor: &Actor, code: &str) -> Result<Plan> {
        let plan = plan_queries::load_plan(self.connection(), code)?;
        access::authorize_read(actor, &plan)?;
        Ok(plan)
    }

    /// Lists plans visible to `actor`. Patient accounts only ever see their
    /// own plans, whatever the filter asks for.
    pub fn list_plans(&self, actor: &Actor, params: &ListPlans) -> Result<Vec<PlanSummary>> {
        let mut filter = params.to_filter(actor.id)?;
        if actor.role == RoleClass::Patient {
            filter.patient_id = actor.patient_id;
            if filter.patient_id.is_none() {
                return Ok(Vec::new());
            }
        }

        let mut summaries = Vec::new();
        for mut plan in plan_queries::select_plans(self.connection(), &filter)? {
            plan_queries::attach_phases(self.connection(), &mut plan)?;
            if access::can_read(actor, &plan) {
                summaries.push(PlanSummary::from(&plan));
            }
        }
        Ok(summaries)
    }

    pub fn get_item(&self, actor: &Actor, item_id: u64) -> Result<Item> {
        let plan_id = item_queries::plan_id_for_item(self.connection(), item_id)?
            .or_not_found("Item", item_id)?;
        let plan = plan_queries::load_plan_by_id(self.connection(), plan_id)?;
        access::authorize_read(actor, &plan)?;
        plan.item(item_id).cloned().or_not_found("Item", item_id)
    }

    /// Audit entries of a plan, oldest first, as kept by the recorder.
    pub fn audit_trail(
        &self,
        collaborators: &Collaborators,
        actor: &Actor,
        code: &str,
    ) -> Result<Vec<AuditEntry>> {
        let plan = self.get_plan(actor, code)?;
        collaborators.audit.trail(plan.id)
    }
}
