//! Collaborators backed by the plan database.

use std::{
    collections::HashSet,
    path::Path,
    sync::{Mutex, MutexGuard},
};

use super::{AppointmentLookup, AuditRecorder, PrerequisiteResolver};
use crate::{
    db::{appointment_queries, audit_queries, catalog_queries, Database},
    error::{PlannerError, Result},
    models::{AuditEntry, LinkedAppointment},
};

/// Prerequisite rules, appointments and the audit log read from and written to
/// a dedicated connection on the plan database.
pub struct SqliteCollaborators {
    db: Mutex<Database>,
}

impl SqliteCollaborators {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self {
            db: Mutex::new(Database::new(path)?),
        })
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| PlannerError::Configuration {
            message: "Collaborator connection lock poisoned".to_string(),
        })
    }
}

impl PrerequisiteResolver for SqliteCollaborators {
    fn has_prerequisites(&self, service_id: u64) -> Result<bool> {
        catalog_queries::has_prerequisites(self.lock()?.connection(), service_id)
    }

    fn services_unlocked_by(&self, service_id: u64) -> Result<HashSet<u64>> {
        catalog_queries::services_unlocked_by(self.lock()?.connection(), service_id)
    }
}

impl AppointmentLookup for SqliteCollaborators {
    fn appointments_for_item(&self, item_id: u64) -> Result<Vec<LinkedAppointment>> {
        appointment_queries::select_appointments_for_item(self.lock()?.connection(), item_id)
    }
}

impl AuditRecorder for SqliteCollaborators {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        audit_queries::insert_entry(self.lock()?.connection(), entry)
    }

    fn trail(&self, plan_id: u64) -> Result<Vec<AuditEntry>> {
        audit_queries::select_entries(self.lock()?.connection(), plan_id)
    }
}
