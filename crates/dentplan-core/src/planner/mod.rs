//! High-level async API over the treatment-plan engine.
//!
//! The [`Planner`] is what the CLI and the MCP server talk to. Each call opens
//! a short-lived [`Database`] connection on a blocking thread, runs one engine
//! operation as a single unit of work, and returns the result:
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐    ┌─────────────────┐
//! │     Planner     │    │     Engine      │    │    Database     │
//! │ (plan_ops,      │───▶│ (engine/, one   │───▶│   (via db/)     │
//! │  item_ops, ...) │    │  transaction)   │    │                 │
//! └─────────────────┘    └─────────────────┘    └─────────────────┘
//!    async boundary        Business rules        Data persistence
//! ```
//!
//! Every operation takes the acting [`Actor`] explicitly. Resolve it once per
//! request with [`Planner::resolve_actor`].
//!
//! [`Actor`]: crate::models::Actor
//!
//! ## Submodules
//!
//! - [`builder`]: configures the database path and collaborators
//! - [`plan_ops`]: plan creation, reads, cancellation and phases
//! - [`item_ops`]: item status changes and item edits
//! - [`review_ops`]: approval workflow and the finance path
//! - [`catalog_ops`]: actors, patients, services, templates, appointments
//!
//! # Usage Examples
//!
//! ```rust
//! use dentplan_core::{params::RegisterActor, PlannerBuilder};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let planner = PlannerBuilder::new()
//!     .with_database_path(Some("/tmp/dentplan-doc.db"))
//!     .build()
//!     .await?;
//!
//! let admin = planner
//!     .register_actor(
//!         None,
//!         &RegisterActor {
//!             name: "Clinic Admin".to_string(),
//!             role: "ADMIN".to_string(),
//!             ..Default::default()
//!         },
//!     )
//!     .await?;
//! let admin = planner.resolve_actor(admin.id).await?;
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tokio::task;

use crate::{
    collaborators::Collaborators,
    db::Database,
    error::{PlannerError, Result},
};

pub mod builder;
pub mod catalog_ops;
pub mod item_ops;
pub mod plan_ops;
pub mod review_ops;


pub use builder::PlannerBuilder;

/// Main interface for managing treatment plans.
pub struct Planner {
    pub(crate) db_path: PathBuf,
    pub(crate) collaborators: Collaborators,
}

impl Planner {
    pub(crate) fn new(db_path: PathBuf, collaborators: Collaborators) -> Self {
        Self {
            db_path,
            collaborators,
        }
    }

    /// Runs `operation` against a fresh connection on the blocking pool.
    pub(crate) async fn run<T, F>(&self, operation: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut Database, &Collaborators) -> Result<T> + Send + 'static,
    {
        let db_path = self.db_path.clone();
        let collaborators = self.collaborators.clone();

        task::spawn_blocking(move || {
            let mut db = Database::new(&db_path)?;
            operation(&mut db, &collaborators)
        })
        .await
        .map_err(|e| PlannerError::Configuration {
            message: format!("Task join error: {e}"),
        })?
    }
}
