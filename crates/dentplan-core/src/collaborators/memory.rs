//! In-process collaborators with fixed answers.

use std::{
    collections::{HashMap, HashSet},
    sync::Mutex,
};

use super::{AppointmentLookup, AuditRecorder, PrerequisiteResolver};
use crate::{
    error::{PlannerError, Result},
    models::{AuditEntry, LinkedAppointment},
};

/// Prerequisite rules given as `(service, prerequisite)` pairs.
#[derive(Debug, Default, Clone)]
pub struct StaticPrerequisites {
    requires: HashMap<u64, HashSet<u64>>,
}

impl StaticPrerequisites {
    pub fn new(pairs: impl IntoIterator<Item = (u64, u64)>) -> Self {
        let mut requires: HashMap<u64, HashSet<u64>> = HashMap::new();
        for (service, prerequisite) in pairs {
            requires.entry(service).or_default().insert(prerequisite);
        }
        Self { requires }
    }
}

impl PrerequisiteResolver for StaticPrerequisites {
    fn has_prerequisites(&self, service_id: u64) -> Result<bool> {
        Ok(self
            .requires
            .get(&service_id)
            .is_some_and(|prerequisites| !prerequisites.is_empty()))
    }

    fn services_unlocked_by(&self, service_id: u64) -> Result<HashSet<u64>> {
        Ok(self
            .requires
            .iter()
            .filter(|(_, prerequisites)| prerequisites.contains(&service_id))
            .map(|(service, _)| *service)
            .collect())
    }
}

/// A fixed appointment book.
#[derive(Debug, Default, Clone)]
pub struct StaticAppointments {
    appointments: Vec<LinkedAppointment>,
}

impl StaticAppointments {
    pub fn new(appointments: Vec<LinkedAppointment>) -> Self {
        Self { appointments }
    }
}

impl AppointmentLookup for StaticAppointments {
    fn appointments_for_item(&self, item_id: u64) -> Result<Vec<LinkedAppointment>> {
        Ok(self
            .appointments
            .iter()
            .filter(|appointment| appointment.item_id == item_id)
            .cloned()
            .collect())
    }
}

/// Audit log kept in memory.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    /// Everything recorded so far, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries
            .lock()
            .map(|entries| entries.clone())
            .unwrap_or_default()
    }
}

impl AuditRecorder for MemoryAuditLog {
    fn append(&self, entry: &AuditEntry) -> Result<()> {
        self.entries
            .lock()
            .map_err(|_| PlannerError::Configuration {
                message: "Audit log lock poisoned".to_string(),
            })?
            .push(entry.clone());
        Ok(())
    }

    fn trail(&self, plan_id: u64) -> Result<Vec<AuditEntry>> {
        Ok(self
            .entries()
            .into_iter()
            .filter(|entry| entry.plan_id == plan_id)
            .collect())
    }
}
