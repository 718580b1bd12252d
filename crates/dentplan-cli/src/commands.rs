//! Command handlers that run parsed CLI commands against the planner.

use anyhow::{anyhow, Context, Result};
use dentplan_core::{
    display::{CreateResult, OperationStatus, UpdateResult},
    models::Actor,
    params::{Id, ListPlans},
    Decision, Planner,
};
use log::debug;

use crate::{
    cli::{
        ActorCommands, AppointmentCommands, BootstrapArgs, ItemCommands, PatientCommands,
        PlanCommands, ServiceCommands, TemplateCommands,
    },
    renderer::TerminalRenderer,
};

/// Runs one CLI invocation on behalf of the user given with `--as`.
pub struct Cli {
    planner: Planner,
    renderer: TerminalRenderer,
    actor_id: Option<u64>,
}

impl Cli {
    pub fn new(planner: Planner, renderer: TerminalRenderer, actor_id: Option<u64>) -> Self {
        Self {
            planner,
            renderer,
            actor_id,
        }
    }

    /// Resolves the acting user. Called once per command.
    async fn actor(&self) -> Result<Actor> {
        let actor_id = self
            .actor_id
            .ok_or_else(|| anyhow!("This command needs an acting user; pass --as <ACTOR_ID>"))?;
        let actor = self
            .planner
            .resolve_actor(actor_id)
            .await
            .with_context(|| format!("Failed to resolve actor {actor_id}"))?;
        debug!("Acting as {} ({})", actor.name, actor.role);
        Ok(actor)
    }

    pub fn into_planner(self) -> Planner {
        self.planner
    }

    fn print(&self, output: impl ToString) -> Result<()> {
        self.renderer.render(&output.to_string())
    }

    pub async fn bootstrap(&self, args: BootstrapArgs) -> Result<()> {
        let actor = self
            .planner
            .register_actor(None, &args.into())
            .await
            .context("Failed to bootstrap administrator")?;
        self.print(CreateResult::new(actor))
    }

    pub async fn list_plans(&self, params: &ListPlans) -> Result<()> {
        let actor = self.actor().await?;
        let plans = self
            .planner
            .list_plans(&actor, params)
            .await
            .context("Failed to list plans")?;
        self.print(plans)
    }

    pub async fn handle_plan_command(&self, command: PlanCommands) -> Result<()> {
        let actor = self.actor().await?;
        let planner = &self.planner;

        match command {
            PlanCommands::Create(args) => {
                let plan = planner
                    .create_custom_plan(&actor, &args.into_params()?)
                    .await
                    .context("Failed to create plan")?;
                self.print(CreateResult::new(plan))
            }
            PlanCommands::FromTemplate(args) => {
                let plan = planner
                    .create_plan_from_template(&actor, &args.into())
                    .await
                    .context("Failed to create plan from template")?;
                self.print(CreateResult::new(plan))
            }
            PlanCommands::List(args) => {
                let plans = planner
                    .list_plans(&actor, &args.into())
                    .await
                    .context("Failed to list plans")?;
                self.print(plans)
            }
            PlanCommands::Show(args) => {
                let plan = planner
                    .get_plan(&actor, &args.into())
                    .await
                    .context("Failed to show plan")?;
                self.print(plan)
            }
            PlanCommands::Submit(args) => {
                let plan = planner
                    .submit_for_review(&actor, &args.into())
                    .await
                    .context("Failed to submit plan")?;
                let changes = vec![format!("Approval status: {}", plan.approval_status)];
                self.print(UpdateResult::with_changes(plan, changes))
            }
            PlanCommands::Approve(args) => self.decide(&actor, args, Decision::Approve).await,
            PlanCommands::Reject(args) => self.decide(&actor, args, Decision::Reject).await,
            PlanCommands::Cancel(args) => {
                let plan = planner
                    .cancel_plan(&actor, &args.into())
                    .await
                    .context("Failed to cancel plan")?;
                self.print(UpdateResult::with_changes(
                    plan,
                    vec!["Status: CANCELLED".to_string()],
                ))
            }
            PlanCommands::AddPhase(args) => {
                let plan = planner
                    .add_phase(&actor, &args.into())
                    .await
                    .context("Failed to add phase")?;
                self.print(UpdateResult::new(plan))
            }
            PlanCommands::Prices(args) => {
                let result = planner
                    .update_prices(&actor, &args.into())
                    .await
                    .context("Failed to update prices")?;
                self.print(result)
            }
            PlanCommands::Audit(args) => {
                let trail = planner
                    .audit_trail(&actor, &args.into())
                    .await
                    .context("Failed to read audit trail")?;
                self.print(trail)
            }
        }
    }

    async fn decide(
        &self,
        actor: &Actor,
        args: crate::cli::DecideArgs,
        decision: Decision,
    ) -> Result<()> {
        let plan = self
            .planner
            .decide(actor, &args.into_params(decision))
            .await
            .with_context(|| format!("Failed to {decision} plan"))?;
        let changes = vec![format!("Approval status: {}", plan.approval_status)];
        self.print(UpdateResult::with_changes(plan, changes))
    }

    pub async fn handle_item_command(&self, command: ItemCommands) -> Result<()> {
        let actor = self.actor().await?;
        let planner = &self.planner;

        match command {
            ItemCommands::Status(args) => {
                let result = planner
                    .update_item_status(&actor, &args.into())
                    .await
                    .context("Failed to update item status")?;
                self.print(result)
            }
            ItemCommands::Show(args) => {
                let item = planner
                    .get_item(&actor, &args.into())
                    .await
                    .context("Failed to show item")?;
                self.print(item)
            }
            ItemCommands::Add(args) => {
                let result = planner
                    .add_items_to_phase(&actor, &args.into())
                    .await
                    .context("Failed to add items")?;
                self.print(result)
            }
            ItemCommands::Update(args) => {
                let item = planner
                    .update_item(&actor, &args.into())
                    .await
                    .context("Failed to update item")?;
                self.print(UpdateResult::new(item))
            }
            ItemCommands::Delete(args) => {
                let result = planner
                    .delete_item(&actor, &args.into())
                    .await
                    .context("Failed to delete item")?;
                self.print(result)
            }
            ItemCommands::Reorder(args) => {
                let result = planner
                    .reorder_items(&actor, &args.into())
                    .await
                    .context("Failed to reorder items")?;
                self.print(result)
            }
            ItemCommands::Assign(args) => {
                let doctor_id = args.doctor;
                let item = planner
                    .assign_doctor(&actor, &args.into())
                    .await
                    .context("Failed to assign doctor")?;
                self.print(UpdateResult::with_changes(
                    item,
                    vec![format!("Assigned doctor: {doctor_id}")],
                ))
            }
            ItemCommands::Appointments(args) => {
                let appointments = planner
                    .list_appointments(&actor, &args.into())
                    .await
                    .context("Failed to list appointments")?;
                self.print(appointments)
            }
        }
    }

    pub async fn handle_actor_command(&self, command: ActorCommands) -> Result<()> {
        let actor = self.actor().await?;

        match command {
            ActorCommands::Add(args) => {
                let registered = self
                    .planner
                    .register_actor(Some(&actor), &args.into())
                    .await
                    .context("Failed to register actor")?;
                self.print(CreateResult::new(registered))
            }
            ActorCommands::List => {
                let actors = self
                    .planner
                    .list_actors(&actor)
                    .await
                    .context("Failed to list actors")?;
                self.print(actors)
            }
            ActorCommands::Deactivate(args) => self.set_active(&actor, args.id, false).await,
            ActorCommands::Activate(args) => self.set_active(&actor, args.id, true).await,
        }
    }

    async fn set_active(&self, actor: &Actor, actor_id: u64, active: bool) -> Result<()> {
        let updated = self
            .planner
            .set_actor_active(actor, actor_id, active)
            .await
            .context("Failed to change actor state")?;
        let state = if active { "active" } else { "inactive" };
        self.print(UpdateResult::with_changes(
            updated,
            vec![format!("Now {state}")],
        ))
    }

    pub async fn handle_patient_command(&self, command: PatientCommands) -> Result<()> {
        let actor = self.actor().await?;

        match command {
            PatientCommands::Add(args) => {
                let patient = self
                    .planner
                    .register_patient(&actor, &args.into())
                    .await
                    .context("Failed to register patient")?;
                self.print(CreateResult::new(patient))
            }
            PatientCommands::List => {
                let patients = self
                    .planner
                    .list_patients(&actor)
                    .await
                    .context("Failed to list patients")?;
                self.print(patients)
            }
        }
    }

    pub async fn handle_service_command(&self, command: ServiceCommands) -> Result<()> {
        match command {
            ServiceCommands::Add(args) => {
                let actor = self.actor().await?;
                let service = self
                    .planner
                    .register_service(&actor, &args.into())
                    .await
                    .context("Failed to register service")?;
                self.print(CreateResult::new(service))
            }
            ServiceCommands::List => {
                let services = self
                    .planner
                    .list_services()
                    .await
                    .context("Failed to list services")?;
                self.print(services)
            }
            ServiceCommands::Require(args) => {
                let actor = self.actor().await?;
                let (service_id, prerequisite_id) = (args.service_id, args.prerequisite_id);
                self.planner
                    .add_prerequisite(&actor, &args.into())
                    .await
                    .context("Failed to add prerequisite")?;
                self.print(OperationStatus::success(format!(
                    "Service {service_id} now requires service {prerequisite_id}"
                )))
            }
        }
    }

    pub async fn handle_template_command(&self, command: TemplateCommands) -> Result<()> {
        match command {
            TemplateCommands::Add(args) => {
                let actor = self.actor().await?;
                let template = self
                    .planner
                    .register_template(&actor, &args.into_params()?)
                    .await
                    .context("Failed to register template")?;
                self.print(CreateResult::new(template))
            }
            TemplateCommands::List => {
                let templates = self
                    .planner
                    .list_templates()
                    .await
                    .context("Failed to list templates")?;
                self.print(templates)
            }
            TemplateCommands::Show(args) => {
                let template = self
                    .planner
                    .get_template(&Id::from(args))
                    .await
                    .context("Failed to show template")?;
                self.print(template)
            }
        }
    }

    pub async fn handle_appointment_command(&self, command: AppointmentCommands) -> Result<()> {
        let actor = self.actor().await?;

        match command {
            AppointmentCommands::Add(args) => {
                let appointment = self
                    .planner
                    .register_appointment(&actor, &args.into())
                    .await
                    .context("Failed to link appointment")?;
                self.print(CreateResult::new(appointment))
            }
            AppointmentCommands::Update(args) => {
                let appointment = self
                    .planner
                    .update_appointment(&actor, &args.into())
                    .await
                    .context("Failed to update appointment")?;
                self.print(UpdateResult::new(appointment))
            }
        }
    }
}
