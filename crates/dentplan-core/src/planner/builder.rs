//! Builder for creating and configuring Planner instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use tokio::task;

use super::Planner;
use crate::{
    collaborators::{AppointmentLookup, AuditRecorder, Collaborators, PrerequisiteResolver},
    db::Database,
    error::{PlannerError, Result},
};

/// Builder for creating and configuring Planner instances.
#[derive(Clone, Default)]
pub struct PlannerBuilder {
    database_path: Option<PathBuf>,
    prerequisites: Option<Arc<dyn PrerequisiteResolver>>,
    appointments: Option<Arc<dyn AppointmentLookup>>,
    audit: Option<Arc<dyn AuditRecorder>>,
}

impl PlannerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/dentplan/dentplan.db` or
    /// `~/.local/share/dentplan/dentplan.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    pub fn with_prerequisites(mut self, resolver: Arc<dyn PrerequisiteResolver>) -> Self {
        self.prerequisites = Some(resolver);
        self
    }

    pub fn with_appointments(mut self, lookup: Arc<dyn AppointmentLookup>) -> Self {
        self.appointments = Some(lookup);
        self
    }

    pub fn with_audit_recorder(mut self, recorder: Arc<dyn AuditRecorder>) -> Self {
        self.audit = Some(recorder);
        self
    }

    /// Builds the configured planner instance.
    ///
    /// Collaborators that were not supplied are backed by the plan database
    /// itself.
    ///
    /// # Errors
    ///
    /// Returns `PlannerError::FileSystem` if the database path is invalid
    /// Returns `PlannerError::Database` if database initialization fails
    pub async fn build(self) -> Result<Planner> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| PlannerError::FileSystem {
                    path: parent.to_path_buf(),
                    source: e,
                })?;
            }
        }

        let needs_sqlite =
            self.prerequisites.is_none() || self.appointments.is_none() || self.audit.is_none();
        let db_path_clone = db_path.clone();
        let sqlite = task::spawn_blocking(move || {
            let _db = Database::new(&db_path_clone)?;
            if needs_sqlite {
                Collaborators::sqlite(&db_path_clone).map(Some)
            } else {
                Ok(None)
            }
        })
        .await
        .map_err(|e| PlannerError::Configuration {
            message: format!("Task join error: {e}"),
        })??;

        let collaborators = match (sqlite, self.prerequisites, self.appointments, self.audit) {
            (_, Some(prerequisites), Some(appointments), Some(audit)) => Collaborators {
                prerequisites,
                appointments,
                audit,
            },
            (Some(sqlite), prerequisites, appointments, audit) => Collaborators {
                prerequisites: prerequisites.unwrap_or(sqlite.prerequisites),
                appointments: appointments.unwrap_or(sqlite.appointments),
                audit: audit.unwrap_or(sqlite.audit),
            },
            (None, ..) => {
                return Err(PlannerError::Configuration {
                    message: "No collaborators configured".to_string(),
                })
            }
        };

        Ok(Planner::new(db_path, collaborators))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("dentplan")
            .place_data_file("dentplan.db")
            .map_err(|e| PlannerError::XdgDirectory(e.to_string()))
    }
}
