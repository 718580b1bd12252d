//! MCP server for dentplan
//!
//! Exposes the treatment-plan engine to AI assistants over the Model Context
//! Protocol. The server acts as a single actor, chosen with `--as` when it is
//! started, and every tool goes through the same engine operations as the
//! CLI.

use std::{future::Future, sync::Arc};

use anyhow::Result;
use dentplan_core::Planner;
use log::{debug, error, info};
use rmcp::{
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{
        GetPromptRequestParam, GetPromptResult, Implementation, ListPromptsResult,
        PaginatedRequestParam, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    tool, tool_handler, tool_router, ErrorData as McpError, RoleServer, ServerHandler,
};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::Mutex,
};

pub mod errors;
pub mod handlers;
pub mod prompts;

pub use handlers::{
    AddItems, AddPhase, AssignDoctor, CancelPlan, CreateCustomPlan, CreatePlanFromTemplate,
    DecidePlan, Id, ListPlans, McpHandlers, McpResult, PlanCode, RegisterAppointment,
    RegisterPatient, ReorderItems, SubmitPlan, UpdateAppointment, UpdateItem, UpdateItemStatus,
    UpdatePrices,
};

/// MCP server for dentplan
#[derive(Clone)]
pub struct DentplanMcpServer {
    planner: Arc<Mutex<Planner>>,
    actor_id: u64,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl DentplanMcpServer {
    /// Creates a server that acts as `actor_id`.
    pub fn new(planner: Planner, actor_id: u64) -> Self {
        Self {
            planner: Arc::new(Mutex::new(planner)),
            actor_id,
            tool_router: Self::tool_router(),
        }
    }

    fn handlers(&self) -> McpHandlers {
        McpHandlers::new(self.planner.clone(), self.actor_id)
    }

    #[tool(
        name = "create_custom_plan",
        description = "Create a treatment plan without a template. Requires patient_id, doctor_id and name. Phases are listed in clinical order, each with a name, optional estimated_days and items. An item either links a catalog service (service_id; name and price default to the catalog) or gives both name and price. quantity creates that many identical items. Optional discount (plan-level amount, must not exceed the total) and start_date (YYYY-MM-DD). The plan starts as a PENDING draft; returns its code."
    )]
    async fn create_custom_plan(&self, params: Parameters<CreateCustomPlan>) -> McpResult {
        self.handlers().create_custom_plan(params).await
    }

    #[tool(
        name = "create_plan_from_template",
        description = "Create a treatment plan from a catalog template (see list_templates). Requires patient_id, doctor_id and template_id. The doctor must share the template's specialization. Item prices come from the template, or the catalog when the template does not override them. Optional name, discount and start_date."
    )]
    async fn create_plan_from_template(
        &self,
        params: Parameters<CreatePlanFromTemplate>,
    ) -> McpResult {
        self.handlers().create_plan_from_template(params).await
    }

    #[tool(
        name = "list_plans",
        description = "List treatment plans visible to the acting user with progress (resolved/total items). Optional filters: patient_id, status (PENDING, IN_PROGRESS, COMPLETED, CANCELLED), approval_status (DRAFT, PENDING_REVIEW, APPROVED), name (case-insensitive fragment), mine (created by the acting user), open_only (hide completed and cancelled)."
    )]
    async fn list_plans(&self, params: Parameters<ListPlans>) -> McpResult {
        self.handlers().list_plans(params).await
    }

    #[tool(
        name = "show_plan",
        description = "Show a plan by code (e.g. TP-20260115-0001) with its status, approval state, costs, phases and every item with ID, status and price."
    )]
    async fn show_plan(&self, params: Parameters<PlanCode>) -> McpResult {
        self.handlers().show_plan(params).await
    }

    #[tool(
        name = "add_phase",
        description = "Append a phase to a DRAFT plan. Requires code and name; optional estimated_days. The phase gets the next phase number."
    )]
    async fn add_phase(&self, params: Parameters<AddPhase>) -> McpResult {
        self.handlers().add_phase(params).await
    }

    #[tool(
        name = "cancel_plan",
        description = "Cancel a plan that is not yet completed or cancelled. Requires code and a reason. Cancellation is final."
    )]
    async fn cancel_plan(&self, params: Parameters<CancelPlan>) -> McpResult {
        self.handlers().cancel_plan(params).await
    }

    #[tool(
        name = "audit_trail",
        description = "Show every recorded change of a plan in order: creation, status changes, automatic progressions, review decisions and price changes, each with actor and time."
    )]
    async fn audit_trail(&self, params: Parameters<PlanCode>) -> McpResult {
        self.handlers().audit_trail(params).await
    }

    #[tool(
        name = "update_item_status",
        description = "Change an item's clinical status. Statuses: PENDING, WAITING_FOR_PREREQUISITE, READY_FOR_BOOKING, SCHEDULED, IN_PROGRESS, COMPLETED, SKIPPED. Only allowed transitions succeed; the error lists the valid targets. Completing or skipping cascades: the next item of the phase becomes READY_FOR_BOOKING, items waiting on this one unlock, and finished phases and plans complete automatically. Skipping removes the item's price from the plan cost and is refused while an appointment is active. Optional notes and completed_at."
    )]
    async fn update_item_status(&self, params: Parameters<UpdateItemStatus>) -> McpResult {
        self.handlers().update_item_status(params).await
    }

    #[tool(
        name = "show_item",
        description = "Show one item by ID with its status, price, service, assigned doctor and notes."
    )]
    async fn show_item(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_item(params).await
    }

    #[tool(
        name = "add_items",
        description = "Add items to a phase (phase_id, items). Allowed on DRAFT and APPROVED plans. Adding to an APPROVED plan sends it back to PENDING_REVIEW unless auto_submit is false, in which case the new items become ready right away. Adding to a completed phase reopens it."
    )]
    async fn add_items(&self, params: Parameters<AddItems>) -> McpResult {
        self.handlers().add_items(params).await
    }

    #[tool(
        name = "update_item",
        description = "Edit an item of a DRAFT plan: name, price, estimated_minutes, notes. A price change re-prices the plan and records reason with the override."
    )]
    async fn update_item(&self, params: Parameters<UpdateItem>) -> McpResult {
        self.handlers().update_item(params).await
    }

    #[tool(
        name = "delete_item",
        description = "Delete an item of a DRAFT plan by ID. Remaining items are renumbered and the plan cost is recalculated."
    )]
    async fn delete_item(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().delete_item(params).await
    }

    #[tool(
        name = "reorder_items",
        description = "Reorder the items of a phase. item_ids must list every item of the phase exactly once, in the new order. Refused while the plan is PENDING_REVIEW."
    )]
    async fn reorder_items(&self, params: Parameters<ReorderItems>) -> McpResult {
        self.handlers().reorder_items(params).await
    }

    #[tool(
        name = "assign_doctor",
        description = "Assign an active doctor (doctor_id) to an item (item_id), with optional notes."
    )]
    async fn assign_doctor(&self, params: Parameters<AssignDoctor>) -> McpResult {
        self.handlers().assign_doctor(params).await
    }

    #[tool(
        name = "submit_for_review",
        description = "Submit a DRAFT plan for review. The plan must contain at least one item. Optional notes for the reviewer."
    )]
    async fn submit_for_review(&self, params: Parameters<SubmitPlan>) -> McpResult {
        self.handlers().submit_for_review(params).await
    }

    #[tool(
        name = "decide_plan",
        description = "Approve or reject a plan PENDING_REVIEW (administrators only). decision is 'approve' or 'reject'; notes are required when rejecting. Approval makes pending items READY_FOR_BOOKING, or WAITING_FOR_PREREQUISITE when a clinical prerequisite is still open. Rejection returns the plan to DRAFT."
    )]
    async fn decide_plan(&self, params: Parameters<DecidePlan>) -> McpResult {
        self.handlers().decide_plan(params).await
    }

    #[tool(
        name = "update_prices",
        description = "Adjust item prices (items: [{item_id, price}]) and/or the plan discount of a non-terminal plan. The total is re-summed from all non-skipped items; the discount may not exceed it. Optional reason."
    )]
    async fn update_prices(&self, params: Parameters<UpdatePrices>) -> McpResult {
        self.handlers().update_prices(params).await
    }

    #[tool(
        name = "list_services",
        description = "List catalog services with code, ID, price, specialization and duration."
    )]
    async fn list_services(&self) -> McpResult {
        self.handlers().list_services().await
    }

    #[tool(
        name = "list_templates",
        description = "List treatment templates with their phases and items."
    )]
    async fn list_templates(&self) -> McpResult {
        self.handlers().list_templates().await
    }

    #[tool(name = "show_template", description = "Show one treatment template by ID.")]
    async fn show_template(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().show_template(params).await
    }

    #[tool(name = "list_patients", description = "List registered patients.")]
    async fn list_patients(&self) -> McpResult {
        self.handlers().list_patients().await
    }

    #[tool(
        name = "register_patient",
        description = "Register a patient record (staff only). Requires name; returns the patient ID."
    )]
    async fn register_patient(&self, params: Parameters<RegisterPatient>) -> McpResult {
        self.handlers().register_patient(params).await
    }

    #[tool(
        name = "register_appointment",
        description = "Link an externally scheduled appointment to an item (item_id). Optional status (default SCHEDULED) and scheduled_at (RFC 3339). Active appointments prevent skipping the item."
    )]
    async fn register_appointment(&self, params: Parameters<RegisterAppointment>) -> McpResult {
        self.handlers().register_appointment(params).await
    }

    #[tool(
        name = "update_appointment",
        description = "Move an appointment (id) to a new status: SCHEDULED, CHECKED_IN, IN_PROGRESS, COMPLETED, CANCELLED or NO_SHOW."
    )]
    async fn update_appointment(&self, params: Parameters<UpdateAppointment>) -> McpResult {
        self.handlers().update_appointment(params).await
    }

    #[tool(
        name = "list_appointments",
        description = "List appointments linked to an item (id)."
    )]
    async fn list_appointments(&self, params: Parameters<Id>) -> McpResult {
        self.handlers().list_appointments(params).await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for DentplanMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .enable_prompts()
                .build(),
            server_info: Implementation {
                name: "dentplan".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            instructions: Some(r#"dentplan tracks dental treatment plans from draft to completion.

## Core Concepts
- **Plan**: a patient's course of care, addressed by a code like TP-20260115-0001. Clinical status PENDING → IN_PROGRESS → COMPLETED (or CANCELLED); approval status DRAFT → PENDING_REVIEW → APPROVED.
- **Phase**: an ordered stage of a plan (diagnosis, surgery, restoration...).
- **Item**: one billable procedure in a phase, optionally linked to a catalog service.

## Typical Workflow
1. `create_custom_plan` or `create_plan_from_template`
2. Adjust while in DRAFT: `add_phase`, `add_items`, `update_item`, `delete_item`, `reorder_items`
3. `submit_for_review`, then an administrator calls `decide_plan`
4. Work through items with `update_item_status` (READY_FOR_BOOKING → SCHEDULED → IN_PROGRESS → COMPLETED, or SKIPPED). Phases and the plan progress on their own.
5. Check progress with `show_plan`, `list_plans` and `audit_trail`

## Money
Plan total = sum of non-skipped item prices; final cost = total - discount. Use `update_prices` for finance adjustments.

## Permissions
The server acts as one actor. Staff may change plans they created; administrators may change any plan and are the only ones who approve or reject."#.to_string()),
        }
    }

    async fn list_prompts(
        &self,
        request: Option<PaginatedRequestParam>,
        context: RequestContext<RoleServer>,
    ) -> Result<ListPromptsResult, McpError> {
        self.handlers().list_prompts(request, context).await
    }

    async fn get_prompt(
        &self,
        request: GetPromptRequestParam,
        context: RequestContext<RoleServer>,
    ) -> Result<GetPromptResult, McpError> {
        self.handlers().get_prompt(request, context).await
    }
}

/// Run the MCP server with stdio transport
pub async fn run_stdio_server(server: DentplanMcpServer) -> Result<()> {
    use rmcp::{transport::stdio, ServiceExt};

    info!("Starting dentplan MCP server on stdio");
    debug!(
        "Server created with {} tools",
        server.tool_router.list_all().len()
    );

    let service = server.serve(stdio()).await.inspect_err(|e| {
        error!("serving error: {e:?}");
    })?;

    let mut sigint = signal(SignalKind::interrupt())?;
    let mut sigterm = signal(SignalKind::terminate())?;

    tokio::select! {
        result = service.waiting() => {
            match result {
                Ok(_) => info!("MCP server stopped normally"),
                Err(e) => error!("MCP server error: {e:?}"),
            }
        }
        _ = sigint.recv() => {
            info!("Received SIGINT, shutting down gracefully...");
        }
        _ = sigterm.recv() => {
            info!("Received SIGTERM, shutting down gracefully...");
        }
    }

    info!("MCP server shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use dentplan_core::PlannerBuilder;
    use tempfile::TempDir;

    use super::*;

    #[tokio::test]
    async fn test_every_engine_tool_is_registered() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let planner = PlannerBuilder::new()
            .with_database_path(Some(temp_dir.path().join("mcp.db")))
            .build()
            .await
            .expect("Failed to create planner");
        let server = DentplanMcpServer::new(planner, 1);

        let names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        for expected in [
            "create_custom_plan",
            "create_plan_from_template",
            "update_item_status",
            "add_items",
            "submit_for_review",
            "decide_plan",
            "update_prices",
            "reorder_items",
            "audit_trail",
        ] {
            assert!(names.iter().any(|name| name == expected), "{expected}");
        }
        assert_eq!(server.get_info().server_info.name, "dentplan");
    }
}
