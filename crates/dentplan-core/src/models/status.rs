//! Status enumerations for plans, phases, items and linked appointments.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Clinical status of a treatment plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PlanStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl PlanStatus {
    pub const ALL: [PlanStatus; 4] = [
        PlanStatus::Pending,
        PlanStatus::InProgress,
        PlanStatus::Completed,
        PlanStatus::Cancelled,
    ];

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanStatus::Pending => "PENDING",
            PlanStatus::InProgress => "IN_PROGRESS",
            PlanStatus::Completed => "COMPLETED",
            PlanStatus::Cancelled => "CANCELLED",
        }
    }

    /// Completed and cancelled plans accept no further financial or item
    /// mutation.
    pub fn is_terminal(&self) -> bool {
        matches!(self, PlanStatus::Completed | PlanStatus::Cancelled)
    }
}

impl FromStr for PlanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlanStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid plan status: {s}"))
    }
}

/// Approval workflow status, independent of the clinical status.
///
/// `Rejected` is never persisted on a plan: a rejection moves the plan back to
/// `Draft` and only the audit trail keeps the `Rejected` value.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ApprovalStatus {
    #[default]
    Draft,
    PendingReview,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: [ApprovalStatus; 4] = [
        ApprovalStatus::Draft,
        ApprovalStatus::PendingReview,
        ApprovalStatus::Approved,
        ApprovalStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Draft => "DRAFT",
            ApprovalStatus::PendingReview => "PENDING_REVIEW",
            ApprovalStatus::Approved => "APPROVED",
            ApprovalStatus::Rejected => "REJECTED",
        }
    }
}

impl FromStr for ApprovalStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ApprovalStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid approval status: {s}"))
    }
}

/// Status of a phase within a plan.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PhaseStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl PhaseStatus {
    pub const ALL: [PhaseStatus; 3] = [
        PhaseStatus::Pending,
        PhaseStatus::InProgress,
        PhaseStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PhaseStatus::Pending => "PENDING",
            PhaseStatus::InProgress => "IN_PROGRESS",
            PhaseStatus::Completed => "COMPLETED",
        }
    }
}

impl FromStr for PhaseStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PhaseStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("Invalid phase status: {s}"))
    }
}

/// Lifecycle status of a single billable item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemStatus {
    /// Newly created, not yet surfaced for booking
    #[default]
    Pending,
    /// Blocked by an unmet clinical dependency
    WaitingForPrerequisite,
    /// May be scheduled
    ReadyForBooking,
    /// Bound to a future appointment
    Scheduled,
    /// Appointment underway
    InProgress,
    /// Terminal success
    Completed,
    /// Removed from the financial total; reversible
    Skipped,
}

impl ItemStatus {
    pub const ALL: [ItemStatus; 7] = [
        ItemStatus::Pending,
        ItemStatus::WaitingForPrerequisite,
        ItemStatus::ReadyForBooking,
        ItemStatus::Scheduled,
        ItemStatus::InProgress,
        ItemStatus::Completed,
        ItemStatus::Skipped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "PENDING",
            ItemStatus::WaitingForPrerequisite => "WAITING_FOR_PREREQUISITE",
            ItemStatus::ReadyForBooking => "READY_FOR_BOOKING",
            ItemStatus::Scheduled => "SCHEDULED",
            ItemStatus::InProgress => "IN_PROGRESS",
            ItemStatus::Completed => "COMPLETED",
            ItemStatus::Skipped => "SKIPPED",
        }
    }

    /// Completed or skipped items count as done for phase completion.
    pub fn is_resolved(&self) -> bool {
        matches!(self, ItemStatus::Completed | ItemStatus::Skipped)
    }

    /// Items bound to, or inside, an appointment cannot be edited or deleted.
    pub fn is_locked_for_edit(&self) -> bool {
        matches!(
            self,
            ItemStatus::Scheduled | ItemStatus::InProgress | ItemStatus::Completed
        )
    }

    /// Get status with consistent icon formatting for display.
    pub fn with_icon(&self) -> &'static str {
        match self {
            ItemStatus::Pending => "○ Pending",
            ItemStatus::WaitingForPrerequisite => "⧗ Waiting for prerequisite",
            ItemStatus::ReadyForBooking => "◇ Ready for booking",
            ItemStatus::Scheduled => "◆ Scheduled",
            ItemStatus::InProgress => "➤ In progress",
            ItemStatus::Completed => "✓ Completed",
            ItemStatus::Skipped => "⤼ Skipped",
        }
    }
}

impl FromStr for ItemStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', ' '], "_");
        ItemStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("Invalid item status: {s}"))
    }
}

/// Status of an externally tracked appointment linked to an item.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    Scheduled,
    CheckedIn,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 6] = [
        AppointmentStatus::Scheduled,
        AppointmentStatus::CheckedIn,
        AppointmentStatus::InProgress,
        AppointmentStatus::Completed,
        AppointmentStatus::Cancelled,
        AppointmentStatus::NoShow,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "SCHEDULED",
            AppointmentStatus::CheckedIn => "CHECKED_IN",
            AppointmentStatus::InProgress => "IN_PROGRESS",
            AppointmentStatus::Completed => "COMPLETED",
            AppointmentStatus::Cancelled => "CANCELLED",
            AppointmentStatus::NoShow => "NO_SHOW",
        }
    }

    /// Appointments that still hold the item and block skipping it.
    pub fn is_active(&self) -> bool {
        matches!(
            self,
            AppointmentStatus::Scheduled
                | AppointmentStatus::CheckedIn
                | AppointmentStatus::InProgress
        )
    }
}

impl FromStr for AppointmentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().replace(['-', ' '], "_");
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(&normalized))
            .ok_or_else(|| format!("Invalid appointment status: {s}"))
    }
}
