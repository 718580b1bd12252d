//! Item status state machine.
//!
//! The legal edges live in [`TRANSITIONS`], a plain data table. Every check
//! goes through [`allowed_targets`], so the table is the single source of
//! truth and can be tested exhaustively.

use crate::{
    error::{PlannerError, Result},
    models::{ItemStatus, LinkedAppointment},
};

use ItemStatus::*;

/// From-state to allowed to-states.
pub const TRANSITIONS: [(ItemStatus, &[ItemStatus]); 7] = [
    (
        Pending,
        &[ReadyForBooking, WaitingForPrerequisite, Skipped, Completed],
    ),
    (ReadyForBooking, &[Scheduled, Skipped, Completed]),
    (WaitingForPrerequisite, &[ReadyForBooking, Skipped]),
    (Scheduled, &[InProgress, Completed]),
    (InProgress, &[Completed]),
    (Skipped, &[ReadyForBooking, Completed]),
    (Completed, &[]),
];

/// Money consequence of an applied transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinancialEffect {
    /// Item entered SKIPPED; its price leaves the plan total
    Remove,
    /// Item left SKIPPED; its price returns to the plan total
    Restore,
}

/// Result of validating a requested transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Requested status equals the current one
    NoOp,
    Apply {
        from: ItemStatus,
        to: ItemStatus,
        financial: Option<FinancialEffect>,
    },
}

impl Transition {
    /// True iff the item enters or leaves SKIPPED.
    pub fn has_financial_effect(&self) -> bool {
        matches!(
            self,
            Transition::Apply {
                financial: Some(_),
                ..
            }
        )
    }
}

/// Statuses reachable from `from` in one step.
pub fn allowed_targets(from: ItemStatus) -> &'static [ItemStatus] {
    TRANSITIONS
        .iter()
        .find(|(state, _)| *state == from)
        .map(|(_, targets)| *targets)
        .unwrap_or(&[])
}

pub fn is_allowed(from: ItemStatus, to: ItemStatus) -> bool {
    allowed_targets(from).contains(&to)
}

/// Validates `from -> to` against the table and the appointment guard.
///
/// `appointments` only matters when entering SKIPPED: an item still held by a
/// scheduled, checked-in or in-progress appointment cannot be skipped until the
/// appointment is released.
pub fn check(
    from: ItemStatus,
    to: ItemStatus,
    appointments: &[LinkedAppointment],
) -> Result<Transition> {
    if from == to {
        return Ok(Transition::NoOp);
    }

    if !is_allowed(from, to) {
        let allowed = allowed_targets(from)
            .iter()
            .map(ItemStatus::as_str)
            .collect::<Vec<_>>();
        let allowed = if allowed.is_empty() {
            "none".to_string()
        } else {
            allowed.join(", ")
        };
        return Err(PlannerError::conflict(format!(
            "Invalid transition {} -> {}; allowed from {}: {allowed}",
            from.as_str(),
            to.as_str(),
            from.as_str()
        )));
    }

    if to == Skipped {
        let active: Vec<u64> = appointments
            .iter()
            .filter(|appointment| appointment.status.is_active())
            .map(|appointment| appointment.id)
            .collect();
        if !active.is_empty() {
            return Err(PlannerError::conflict(format!(
                "Item has {} active appointment(s) {:?}; cancel or complete them before skipping",
                active.len(),
                active
            )));
        }
    }

    let financial = match (from, to) {
        (_, Skipped) => Some(FinancialEffect::Remove),
        (Skipped, _) => Some(FinancialEffect::Restore),
        _ => None,
    };

    Ok(Transition::Apply {
        from,
        to,
        financial,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::ErrorKind, models::AppointmentStatus};

    fn appointment(id: u64, status: AppointmentStatus) -> LinkedAppointment {
        LinkedAppointment {
            id,
            item_id: 1,
            status,
            scheduled_at: None,
        }
    }

    #[test]
    fn test_table_covers_every_status_once() {
        for status in ItemStatus::ALL {
            let rows = TRANSITIONS.iter().filter(|(s, _)| *s == status).count();
            assert_eq!(rows, 1, "{status:?} must have exactly one row");
        }
    }

    #[test]
    fn test_self_transition_is_noop_for_every_status() {
        for status in ItemStatus::ALL {
            assert_eq!(check(status, status, &[]).unwrap(), Transition::NoOp);
        }
    }

    #[test]
    fn test_exhaustive_pairs_follow_table() {
        for from in ItemStatus::ALL {
            for to in ItemStatus::ALL {
                if from == to {
                    continue;
                }
                let result = check(from, to, &[]);
                if allowed_targets(from).contains(&to) {
                    assert!(result.is_ok(), "{from:?} -> {to:?} should be allowed");
                } else {
                    let err = result.expect_err("edge not in table");
                    assert_eq!(err.kind(), ErrorKind::Conflict, "{from:?} -> {to:?}");
                }
            }
        }
    }

    #[test]
    fn test_invalid_transition_names_allowed_set() {
        let err = check(Scheduled, Skipped, &[]).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("IN_PROGRESS"));
        assert!(message.contains("COMPLETED"));

        let err = check(Completed, Pending, &[]).unwrap_err();
        assert!(err.to_string().contains("none"));
    }

    #[test]
    fn test_financial_effect_only_around_skipped() {
        assert_eq!(
            check(ReadyForBooking, Skipped, &[]).unwrap(),
            Transition::Apply {
                from: ReadyForBooking,
                to: Skipped,
                financial: Some(FinancialEffect::Remove)
            }
        );
        assert_eq!(
            check(Skipped, ReadyForBooking, &[]).unwrap(),
            Transition::Apply {
                from: Skipped,
                to: ReadyForBooking,
                financial: Some(FinancialEffect::Restore)
            }
        );
        assert!(check(Skipped, Completed, &[]).unwrap().has_financial_effect());
        assert!(!check(Pending, ReadyForBooking, &[])
            .unwrap()
            .has_financial_effect());
        assert!(!check(Scheduled, Completed, &[]).unwrap().has_financial_effect());
    }

    #[test]
    fn test_skip_blocked_by_active_appointments() {
        for status in [
            AppointmentStatus::Scheduled,
            AppointmentStatus::CheckedIn,
            AppointmentStatus::InProgress,
        ] {
            let err = check(ReadyForBooking, Skipped, &[appointment(7, status)]).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::Conflict);
        }
    }

    #[test]
    fn test_skip_allowed_with_released_appointments() {
        let released = [
            appointment(1, AppointmentStatus::Cancelled),
            appointment(2, AppointmentStatus::Completed),
            appointment(3, AppointmentStatus::NoShow),
        ];
        assert!(check(Pending, Skipped, &released).is_ok());
    }

    #[test]
    fn test_appointments_ignored_for_other_targets() {
        let busy = [appointment(1, AppointmentStatus::Scheduled)];
        assert!(check(ReadyForBooking, Completed, &busy).is_ok());
    }
}
