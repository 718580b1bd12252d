//! Audit entries emitted by every mutation.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Kind of aggregate member an audit entry is about.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditEntity {
    Plan,
    Phase,
    Item,
}

impl AuditEntity {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditEntity::Plan => "PLAN",
            AuditEntity::Phase => "PHASE",
            AuditEntity::Item => "ITEM",
        }
    }
}

impl FromStr for AuditEntity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PLAN" => Ok(AuditEntity::Plan),
            "PHASE" => Ok(AuditEntity::Phase),
            "ITEM" => Ok(AuditEntity::Item),
            _ => Err(format!("Invalid audit entity: {s}")),
        }
    }
}

/// What happened.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Created,
    PhaseAdded,
    ItemStatusChanged,
    ItemsAdded,
    ItemUpdated,
    ItemDeleted,
    ItemsReordered,
    DoctorAssigned,
    Submitted,
    Approved,
    Rejected,
    Resubmitted,
    PricesUpdated,
    Cancelled,
    /// Status change made by the cascade rather than the caller
    AutoProgressed,
}

impl AuditAction {
    pub const ALL: [AuditAction; 15] = [
        AuditAction::Created,
        AuditAction::PhaseAdded,
        AuditAction::ItemStatusChanged,
        AuditAction::ItemsAdded,
        AuditAction::ItemUpdated,
        AuditAction::ItemDeleted,
        AuditAction::ItemsReordered,
        AuditAction::DoctorAssigned,
        AuditAction::Submitted,
        AuditAction::Approved,
        AuditAction::Rejected,
        AuditAction::Resubmitted,
        AuditAction::PricesUpdated,
        AuditAction::Cancelled,
        AuditAction::AutoProgressed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Created => "CREATED",
            AuditAction::PhaseAdded => "PHASE_ADDED",
            AuditAction::ItemStatusChanged => "ITEM_STATUS_CHANGED",
            AuditAction::ItemsAdded => "ITEMS_ADDED",
            AuditAction::ItemUpdated => "ITEM_UPDATED",
            AuditAction::ItemDeleted => "ITEM_DELETED",
            AuditAction::ItemsReordered => "ITEMS_REORDERED",
            AuditAction::DoctorAssigned => "DOCTOR_ASSIGNED",
            AuditAction::Submitted => "SUBMITTED",
            AuditAction::Approved => "APPROVED",
            AuditAction::Rejected => "REJECTED",
            AuditAction::Resubmitted => "RESUBMITTED",
            AuditAction::PricesUpdated => "PRICES_UPDATED",
            AuditAction::Cancelled => "CANCELLED",
            AuditAction::AutoProgressed => "AUTO_PROGRESSED",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AuditAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("Invalid audit action: {s}"))
    }
}

/// One structured, append-only audit record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditEntry {
    pub plan_id: u64,
    pub entity: AuditEntity,
    pub entity_id: u64,
    pub action: AuditAction,
    pub actor_id: u64,
    pub status_before: Option<String>,
    pub status_after: Option<String>,
    pub note: Option<String>,
    pub recorded_at: Timestamp,
}

impl AuditEntry {
    pub fn with_transition(&mut self, before: &str, after: &str) -> &mut Self {
        self.status_before = Some(before.to_string());
        self.status_after = Some(after.to_string());
        self
    }

    pub fn with_note(&mut self, note: Option<&str>) -> &mut Self {
        self.note = note.map(String::from);
        self
    }
}
