//! Approval workflow and finance operations for the Planner.

use super::Planner;
use crate::{
    error::Result,
    models::{Actor, Plan, PriceUpdateResult},
    params::{DecidePlan, SubmitPlan, UpdatePrices},
};

impl Planner {
    pub async fn submit_for_review(&self, actor: &Actor, params: &SubmitPlan) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.submit_for_review(collaborators, &actor, &params))
            .await
    }

    /// Approves or rejects a plan. Administrators only.
    pub async fn decide(&self, actor: &Actor, params: &DecidePlan) -> Result<Plan> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.decide(collaborators, &actor, &params))
            .await
    }

    pub async fn update_prices(
        &self,
        actor: &Actor,
        params: &UpdatePrices,
    ) -> Result<PriceUpdateResult> {
        let actor = actor.clone();
        let params = params.clone();
        self.run(move |db, collaborators| db.update_prices(collaborators, &actor, &params))
            .await
    }
}
