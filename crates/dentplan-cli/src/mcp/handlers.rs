//! MCP tool handlers implementation

use std::sync::Arc;

use dentplan_core::{
    display::{CreateResult, UpdateResult},
    models::Actor,
    params as core, Planner,
};
use log::debug;
use rmcp::{
    handler::server::tool::Parameters,
    model::{
        CallToolResult, Content, GetPromptRequestParam, GetPromptResult, ListPromptsResult,
        PaginatedRequestParam, Prompt, PromptArgument, PromptMessage, PromptMessageContent,
        PromptMessageRole,
    },
    service::RequestContext,
    ErrorData, RoleServer,
};
use schemars::JsonSchema;
use serde::Deserialize;
use tokio::sync::Mutex;

use super::{errors::to_mcp_error, prompts::prompt_templates};

// ============================================================================
// Generic Parameter Wrapper
// ============================================================================
//
// Core parameter types stay free of MCP concerns. This transparent wrapper
// adds what the tool router needs (Deserialize + JsonSchema) and hands the
// core type through unchanged.

/// Generic MCP wrapper for core parameter types
#[derive(Debug, Deserialize)]
#[serde(transparent)]
pub struct McpParams<T>(T)
where
    T: JsonSchema;

impl<T> JsonSchema for McpParams<T>
where
    T: JsonSchema,
{
    fn schema_name() -> std::borrow::Cow<'static, str> {
        T::schema_name()
    }

    fn json_schema(g: &mut schemars::SchemaGenerator) -> schemars::Schema {
        T::json_schema(g)
    }
}

impl<T> AsRef<T> for McpParams<T>
where
    T: JsonSchema,
{
    fn as_ref(&self) -> &T {
        &self.0
    }
}

pub type Id = McpParams<core::Id>;
pub type PlanCode = McpParams<core::PlanCode>;
pub type CreateCustomPlan = McpParams<core::CreateCustomPlan>;
pub type CreatePlanFromTemplate = McpParams<core::CreatePlanFromTemplate>;
pub type ListPlans = McpParams<core::ListPlans>;
pub type AddPhase = McpParams<core::AddPhase>;
pub type CancelPlan = McpParams<core::CancelPlan>;
pub type UpdateItemStatus = McpParams<core::UpdateItemStatus>;
pub type AddItems = McpParams<core::AddItems>;
pub type UpdateItem = McpParams<core::UpdateItem>;
pub type ReorderItems = McpParams<core::ReorderItems>;
pub type AssignDoctor = McpParams<core::AssignDoctor>;
pub type SubmitPlan = McpParams<core::SubmitPlan>;
pub type DecidePlan = McpParams<core::DecidePlan>;
pub type UpdatePrices = McpParams<core::UpdatePrices>;
pub type RegisterPatient = McpParams<core::RegisterPatient>;
pub type RegisterAppointment = McpParams<core::RegisterAppointment>;
pub type UpdateAppointment = McpParams<core::UpdateAppointment>;

pub type McpResult = Result<CallToolResult, ErrorData>;

fn text(output: impl ToString) -> McpResult {
    Ok(CallToolResult::success(vec![Content::text(
        output.to_string(),
    )]))
}

/// Handler implementations for the MCP server.
///
/// Every tool call resolves the server's actor afresh, so a deactivation
/// takes effect on the next call.
pub struct McpHandlers {
    planner: Arc<Mutex<Planner>>,
    actor_id: u64,
}

impl McpHandlers {
    pub fn new(planner: Arc<Mutex<Planner>>, actor_id: u64) -> Self {
        Self { planner, actor_id }
    }

    async fn actor(&self, planner: &Planner) -> Result<Actor, ErrorData> {
        planner
            .resolve_actor(self.actor_id)
            .await
            .map_err(|e| to_mcp_error("Failed to resolve actor", &e))
    }

    // ------------------------------------------------------------------
    // Plans
    // ------------------------------------------------------------------

    pub async fn create_custom_plan(
        &self,
        Parameters(params): Parameters<CreateCustomPlan>,
    ) -> McpResult {
        debug!("create_custom_plan: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .create_custom_plan(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create plan", &e))?;
        text(CreateResult::new(plan))
    }

    pub async fn create_plan_from_template(
        &self,
        Parameters(params): Parameters<CreatePlanFromTemplate>,
    ) -> McpResult {
        debug!("create_plan_from_template: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .create_plan_from_template(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to create plan from template", &e))?;
        text(CreateResult::new(plan))
    }

    pub async fn list_plans(&self, Parameters(params): Parameters<ListPlans>) -> McpResult {
        debug!("list_plans: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let inner_params = params.as_ref();
        let summaries = planner
            .list_plans(&actor, inner_params)
            .await
            .map_err(|e| to_mcp_error("Failed to list plans", &e))?;

        let title = if inner_params.open_only {
            "Open Plans"
        } else {
            "Plans"
        };
        text(format!("# {title}\n\n{summaries}"))
    }

    pub async fn show_plan(&self, Parameters(params): Parameters<PlanCode>) -> McpResult {
        debug!("show_plan: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .get_plan(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get plan", &e))?;
        text(plan)
    }

    pub async fn add_phase(&self, Parameters(params): Parameters<AddPhase>) -> McpResult {
        debug!("add_phase: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .add_phase(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add phase", &e))?;
        text(UpdateResult::with_changes(
            plan,
            vec![format!("Added phase '{}'", params.as_ref().name)],
        ))
    }

    pub async fn cancel_plan(&self, Parameters(params): Parameters<CancelPlan>) -> McpResult {
        debug!("cancel_plan: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .cancel_plan(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to cancel plan", &e))?;
        text(UpdateResult::with_changes(
            plan,
            vec!["Status: CANCELLED".to_string()],
        ))
    }

    pub async fn audit_trail(&self, Parameters(params): Parameters<PlanCode>) -> McpResult {
        debug!("audit_trail: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let trail = planner
            .audit_trail(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to read audit trail", &e))?;
        text(format!("# Audit trail of {}\n\n{trail}", params.as_ref().code))
    }

    // ------------------------------------------------------------------
    // Items
    // ------------------------------------------------------------------

    pub async fn update_item_status(
        &self,
        Parameters(params): Parameters<UpdateItemStatus>,
    ) -> McpResult {
        debug!("update_item_status: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let result = planner
            .update_item_status(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update item status", &e))?;
        text(result)
    }

    pub async fn show_item(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_item: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let item = planner
            .get_item(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get item", &e))?;
        text(item)
    }

    pub async fn add_items(&self, Parameters(params): Parameters<AddItems>) -> McpResult {
        debug!("add_items: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let result = planner
            .add_items_to_phase(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to add items", &e))?;
        text(result)
    }

    pub async fn update_item(&self, Parameters(params): Parameters<UpdateItem>) -> McpResult {
        debug!("update_item: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let item = planner
            .update_item(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update item", &e))?;
        text(UpdateResult::new(item))
    }

    pub async fn delete_item(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("delete_item: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let result = planner
            .delete_item(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to delete item", &e))?;
        text(result)
    }

    pub async fn reorder_items(&self, Parameters(params): Parameters<ReorderItems>) -> McpResult {
        debug!("reorder_items: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let result = planner
            .reorder_items(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to reorder items", &e))?;
        text(result)
    }

    pub async fn assign_doctor(&self, Parameters(params): Parameters<AssignDoctor>) -> McpResult {
        debug!("assign_doctor: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let item = planner
            .assign_doctor(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to assign doctor", &e))?;
        text(UpdateResult::with_changes(
            item,
            vec![format!("Assigned doctor: {}", params.as_ref().doctor_id)],
        ))
    }

    // ------------------------------------------------------------------
    // Review and pricing
    // ------------------------------------------------------------------

    pub async fn submit_for_review(&self, Parameters(params): Parameters<SubmitPlan>) -> McpResult {
        debug!("submit_for_review: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .submit_for_review(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to submit plan", &e))?;
        let changes = vec![format!("Approval status: {}", plan.approval_status)];
        text(UpdateResult::with_changes(plan, changes))
    }

    pub async fn decide_plan(&self, Parameters(params): Parameters<DecidePlan>) -> McpResult {
        debug!("decide_plan: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let plan = planner
            .decide(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to record decision", &e))?;
        let changes = vec![format!("Approval status: {}", plan.approval_status)];
        text(UpdateResult::with_changes(plan, changes))
    }

    pub async fn update_prices(&self, Parameters(params): Parameters<UpdatePrices>) -> McpResult {
        debug!("update_prices: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let result = planner
            .update_prices(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update prices", &e))?;
        text(result)
    }

    // ------------------------------------------------------------------
    // Catalog
    // ------------------------------------------------------------------

    pub async fn list_services(&self) -> McpResult {
        debug!("list_services");

        let services = self
            .planner
            .lock()
            .await
            .list_services()
            .await
            .map_err(|e| to_mcp_error("Failed to list services", &e))?;
        text(format!("# Services\n\n{services}"))
    }

    pub async fn list_templates(&self) -> McpResult {
        debug!("list_templates");

        let templates = self
            .planner
            .lock()
            .await
            .list_templates()
            .await
            .map_err(|e| to_mcp_error("Failed to list templates", &e))?;
        text(templates)
    }

    pub async fn show_template(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("show_template: {params:?}");

        let template = self
            .planner
            .lock()
            .await
            .get_template(params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to get template", &e))?;
        text(template)
    }

    pub async fn list_patients(&self) -> McpResult {
        debug!("list_patients");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let patients = planner
            .list_patients(&actor)
            .await
            .map_err(|e| to_mcp_error("Failed to list patients", &e))?;
        text(format!("# Patients\n\n{patients}"))
    }

    pub async fn register_patient(
        &self,
        Parameters(params): Parameters<RegisterPatient>,
    ) -> McpResult {
        debug!("register_patient: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let patient = planner
            .register_patient(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to register patient", &e))?;
        text(CreateResult::new(patient))
    }

    pub async fn register_appointment(
        &self,
        Parameters(params): Parameters<RegisterAppointment>,
    ) -> McpResult {
        debug!("register_appointment: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let appointment = planner
            .register_appointment(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to link appointment", &e))?;
        text(CreateResult::new(appointment))
    }

    pub async fn update_appointment(
        &self,
        Parameters(params): Parameters<UpdateAppointment>,
    ) -> McpResult {
        debug!("update_appointment: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let appointment = planner
            .update_appointment(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to update appointment", &e))?;
        text(UpdateResult::new(appointment))
    }

    pub async fn list_appointments(&self, Parameters(params): Parameters<Id>) -> McpResult {
        debug!("list_appointments: {params:?}");

        let planner = self.planner.lock().await;
        let actor = self.actor(&planner).await?;
        let appointments = planner
            .list_appointments(&actor, params.as_ref())
            .await
            .map_err(|e| to_mcp_error("Failed to list appointments", &e))?;
        text(appointments)
    }

    // ------------------------------------------------------------------
    // Prompts
    // ------------------------------------------------------------------

    /// List all available prompts
    pub async fn list_prompts(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, ErrorData> {
        debug!("list_prompts");

        let prompts = prompt_templates()
            .iter()
            .map(|template| {
                Prompt::new(
                    &template.name,
                    Some(&template.description),
                    Some(
                        template
                            .arguments
                            .iter()
                            .map(|arg| PromptArgument {
                                name: arg.name.clone(),
                                description: Some(arg.description.clone()),
                                required: Some(arg.required),
                            })
                            .collect(),
                    ),
                )
            })
            .collect();

        Ok(ListPromptsResult {
            next_cursor: None,
            prompts,
        })
    }

    /// Get a specific prompt by name and apply arguments
    pub async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, ErrorData> {
        debug!("get_prompt: {}", request.name);

        let templates = prompt_templates();
        let template = templates
            .iter()
            .find(|t| t.name == request.name)
            .ok_or_else(|| ErrorData::invalid_params("Prompt not found", None))?;

        let mut values = Vec::new();
        for arg_def in &template.arguments {
            let value = request
                .arguments
                .as_ref()
                .and_then(|args| args.get(&arg_def.name));
            match value.map(|v| v.as_str()) {
                Some(Some(value)) => values.push((arg_def.name.as_str(), value)),
                Some(None) => {
                    return Err(ErrorData::invalid_params(
                        format!("Argument '{}' must be a string", arg_def.name),
                        None,
                    ))
                }
                None if arg_def.required => {
                    return Err(ErrorData::invalid_params(
                        format!("Required argument '{}' is missing", arg_def.name),
                        None,
                    ))
                }
                None => {}
            }
        }

        Ok(GetPromptResult {
            description: Some(template.description.clone()),
            messages: vec![PromptMessage {
                role: PromptMessageRole::User,
                content: PromptMessageContent::text(template.render(values)),
            }],
        })
    }
}
