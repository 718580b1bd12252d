//! dentplan CLI application
//!
//! Command-line interface and MCP server for the dentplan treatment-plan
//! engine.

mod args;
mod cli;
mod commands;
mod mcp;
mod renderer;

use anyhow::{anyhow, Context, Result};
use args::{Args, Commands};
use clap::Parser;
use commands::Cli;
use dentplan_core::{params::ListPlans, PlannerBuilder};
use log::info;
use mcp::{run_stdio_server, DentplanMcpServer};
use renderer::TerminalRenderer;
use Commands::*;

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let Args {
        database_file,
        no_color,
        as_actor,
        command,
    } = Args::parse();

    let planner = PlannerBuilder::new()
        .with_database_path(database_file)
        .build()
        .await
        .context("Failed to initialize planner")?;

    let renderer = TerminalRenderer::new(!no_color);

    info!("dentplan started");

    let cli = Cli::new(planner, renderer, as_actor);
    match command {
        Some(Plan { command }) => cli.handle_plan_command(command).await,
        Some(Item { command }) => cli.handle_item_command(command).await,
        Some(Actor { command }) => cli.handle_actor_command(command).await,
        Some(Patient { command }) => cli.handle_patient_command(command).await,
        Some(Service { command }) => cli.handle_service_command(command).await,
        Some(Template { command }) => cli.handle_template_command(command).await,
        Some(Appointment { command }) => cli.handle_appointment_command(command).await,
        Some(Bootstrap(args)) => cli.bootstrap(args).await,
        Some(Serve) => {
            let actor_id =
                as_actor.ok_or_else(|| anyhow!("The MCP server needs --as <ACTOR_ID>"))?;
            // Fail fast on an unknown or inactive actor
            let planner = cli.into_planner();
            planner
                .resolve_actor(actor_id)
                .await
                .with_context(|| format!("Failed to resolve actor {actor_id}"))?;
            info!("Starting dentplan MCP server as actor {actor_id}");
            run_stdio_server(DentplanMcpServer::new(planner, actor_id))
                .await
                .context("MCP server failed")
        }
        None => cli.list_plans(&ListPlans::default()).await,
    }
}
