//! Plan operations for the Planner.

use super::Planner;
use crate::{
    display::{AuditTrail, PlanSummaries},
    error::Result,
    models::{Actor, Plan},
    params::{AddPhase, CancelPlan, CreateCustomPlan, CreatePlanFromTemplate, ListPlans, PlanCode},
};

impl Planner {
    /// Resolves the acting user. Fails for unknown and deactivated actors.
    pub async fn resolve_actor(&self, actor_id: u64) -> Result<Actor> {
        self.run(move |db, _| db.resolve_actor(actor_id)).await
    }

    /// Creates a plan from a catalog template.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use dentplan_core::{params::CreatePlanFromTemplate, PlannerBuilder};
    /// # async {
    /// let planner = PlannerBuilder::new().build().await?;
    /// let admin = planner.resolve_actor(1).await?;
    /// let plan = planner
    ///     .create_plan_from_template(
    ///         &admin,
    ///         &CreatePlanFromTemplate {
    ///             patient_id: 1,
    ///             doctor_id: 2,
    ///             template_id: 1,
    ///             ..Default::default()
    ///         },
    ///     )
    ///     .await?;
    /// println!("{}", plan.code);
    /// # Result::<(), dentplan_core::PlannerError>::Ok(())
    /// # };
    /// ```
    pub async fn create_plan_from_template(
        &self,
        actor: &Actor,
        params: &CreatePlanFromTemplate,
    ) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| {
            db.create_plan_from_template(collaborators, &actor, &params)
        })
        .await
    }

    pub async fn create_custom_plan(&self, actor: &Actor, params: &CreateCustomPlan) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.create_custom_plan(collaborators, &actor, &params))
            .await
    }

    /// Retrieves a plan with all its phases and items.
    pub async fn get_plan(&self, actor: &Actor, params: &PlanCode) -> Result<Plan> {
        let actor = actor.clone();
        let code = params.code.clone();
        self.run(move |db, _| db.get_plan(&actor, &code)).await
    }

    /// Lists the plans visible to `actor` as progress summaries.
    pub async fn list_plans(&self, actor: &Actor, params: &ListPlans) -> Result<PlanSummaries> {
        let actor = actor.clone();
        let params = params.clone();
        let summaries = self.run(move |db, _| db.list_plans(&actor, &params)).await?;
        Ok(PlanSummaries(summaries))
    }

    pub async fn add_phase(&self, actor: &Actor, params: &AddPhase) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.add_phase(collaborators, &actor, &params))
            .await
    }

    pub async fn cancel_plan(&self, actor: &Actor, params: &CancelPlan) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.cancel_plan(collaborators, &actor, &params))
            .await
    }

    /// Audit entries of a plan, oldest first.
    pub async fn audit_trail(&self, actor: &Actor, params: &PlanCode) -> Result<AuditTrail> {
        let actor = actor.clone();
        let code = params.code.clone();
        let entries = self
            .run(move |db, collaborators| db.audit_trail(collaborators, &actor, &code))
            .await?;
        Ok(AuditTrail(entries))
    }
}
