//! Contracts for the services the engine consults but does not own.
//!
//! The engine queries prerequisites and appointments and appends audit
//! entries. It owns every status write that results from their answers.
//! [`sqlite`] backs all three with tables in the plan database;
//! [`memory`] provides fixed in-process implementations for tests and
//! embedding.

use std::{collections::HashSet, path::Path, sync::Arc};

use crate::{
    error::Result,
    models::{AuditEntry, LinkedAppointment},
};

pub mod memory;
pub mod sqlite;

pub use memory::{MemoryAuditLog, StaticAppointments, StaticPrerequisites};
pub use sqlite::SqliteCollaborators;

/// Clinical dependency rules between catalog services.
pub trait PrerequisiteResolver: Send + Sync {
    /// True if the service depends on another service being done first.
    fn has_prerequisites(&self, service_id: u64) -> Result<bool>;

    /// Services whose prerequisite is satisfied once `service_id` is done.
    fn services_unlocked_by(&self, service_id: u64) -> Result<HashSet<u64>>;
}

/// Read access to the appointments booked against an item.
pub trait AppointmentLookup: Send + Sync {
    fn appointments_for_item(&self, item_id: u64) -> Result<Vec<LinkedAppointment>>;
}

/// Append-only sink for audit entries.
pub trait AuditRecorder: Send + Sync {
    fn append(&self, entry: &AuditEntry) -> Result<()>;

    /// Entries recorded for a plan, oldest first.
    fn trail(&self, plan_id: u64) -> Result<Vec<AuditEntry>>;
}

/// The collaborator set handed to every unit of work.
#[derive(Clone)]
pub struct Collaborators {
    pub prerequisites: Arc<dyn PrerequisiteResolver>,
    pub appointments: Arc<dyn AppointmentLookup>,
    pub audit: Arc<dyn AuditRecorder>,
}

impl Collaborators {
    /// All three collaborators backed by the plan database at `path`.
    pub fn sqlite<P: AsRef<Path>>(path: P) -> Result<Self> {
        let shared = Arc::new(SqliteCollaborators::open(path)?);
        Ok(Self {
            prerequisites: shared.clone(),
            appointments: shared.clone(),
            audit: shared,
        })
    }

    /// No prerequisites, no appointments, audit kept in memory.
    pub fn in_memory() -> Self {
        Self {
            prerequisites: Arc::new(StaticPrerequisites::default()),
            appointments: Arc::new(StaticAppointments::default()),
            audit: Arc::new(MemoryAuditLog::default()),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators").finish_non_exhaustive()
    }
}
