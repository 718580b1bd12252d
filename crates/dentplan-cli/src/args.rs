use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::cli::{
    ActorCommands, AppointmentCommands, BootstrapArgs, ItemCommands, PatientCommands,
    PlanCommands, ServiceCommands, TemplateCommands,
};

/// Command-line interface for dentplan, the dental treatment-plan tracker
///
/// Treatment plans group a patient's care into ordered phases of billable
/// items. dentplan keeps item status, phase and plan progress, the approval
/// workflow and the cost ledger consistent, and records an audit trail of
/// every change. It runs as a one-shot CLI or as an MCP server for AI
/// assistants.
#[derive(Parser)]
#[command(version, about, name = "dentplan")]
pub struct Args {
    /// Path to the SQLite database file. Defaults to
    /// $XDG_DATA_HOME/dentplan/dentplan.db
    #[arg(long, global = true)]
    pub database_file: Option<PathBuf>,

    /// Disable colored output and use plain text
    #[arg(long, global = true)]
    pub no_color: bool,

    /// ID of the acting user; every command except bootstrap and catalog
    /// listings needs one
    #[arg(long = "as", value_name = "ACTOR_ID", global = true)]
    pub as_actor: Option<u64>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands for the dentplan CLI
///
/// - `plan` and `item`: the treatment-plan lifecycle
/// - `actor`, `patient`, `service`, `template`, `appointment`: the catalog
///   those plans draw on
/// - `bootstrap`: register the first administrator of an empty database
/// - `serve`: start the MCP server
#[derive(Subcommand)]
pub enum Commands {
    /// Manage treatment plans
    #[command(alias = "p")]
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Manage items within plan phases
    #[command(alias = "i")]
    Item {
        #[command(subcommand)]
        command: ItemCommands,
    },
    /// Manage staff, administrators and patient accounts
    #[command(alias = "a")]
    Actor {
        #[command(subcommand)]
        command: ActorCommands,
    },
    /// Manage patient records
    Patient {
        #[command(subcommand)]
        command: PatientCommands,
    },
    /// Manage catalog services and their prerequisites
    #[command(alias = "svc")]
    Service {
        #[command(subcommand)]
        command: ServiceCommands,
    },
    /// Manage treatment templates
    #[command(alias = "t")]
    Template {
        #[command(subcommand)]
        command: TemplateCommands,
    },
    /// Record externally scheduled appointments
    #[command(alias = "appt")]
    Appointment {
        #[command(subcommand)]
        command: AppointmentCommands,
    },
    /// Register the first administrator of an empty database
    Bootstrap(BootstrapArgs),
    /// Start the MCP server, acting as the user given with --as
    Serve,
}
