//! Pure decisions of the auto-progression cascade.
//!
//! Each function looks at a freshly read working set and answers one question.
//! The engine re-reads the store between stages and applies the answers, so
//! nothing here trusts state from an earlier stage.

use crate::models::{Item, ItemStatus, Phase, PhaseStatus, PlanStatus};

/// The item directly after `completed` in its phase, if it is still PENDING.
pub fn next_item_to_activate<'a>(completed: &Item, phase_items: &'a [Item]) -> Option<&'a Item> {
    phase_items.iter().find(|item| {
        item.sequence == completed.sequence + 1 && item.status == ItemStatus::Pending
    })
}

/// Items waiting on a prerequisite whose service was just unlocked.
pub fn items_to_unlock<'a, F>(plan_items: &'a [Item], completed_item_id: u64, is_unlocked: F) -> Vec<&'a Item>
where
    F: Fn(u64) -> bool,
{
    plan_items
        .iter()
        .filter(|item| item.id != completed_item_id)
        .filter(|item| item.status == ItemStatus::WaitingForPrerequisite)
        .filter(|item| item.service_id.is_some_and(&is_unlocked))
        .collect()
}

/// A PENDING phase starts once one of its items is booked or done.
pub fn phase_should_start(phase_status: PhaseStatus, item_status: ItemStatus) -> bool {
    phase_status == PhaseStatus::Pending
        && matches!(
            item_status,
            ItemStatus::Scheduled | ItemStatus::InProgress | ItemStatus::Completed
        )
}

/// Non-empty and every item completed or skipped.
pub fn phase_should_complete(phase_status: PhaseStatus, items: &[Item]) -> bool {
    phase_status != PhaseStatus::Completed
        && !items.is_empty()
        && items.iter().all(|item| item.status.is_resolved())
}

/// A pending plan becomes active once any item is booked or underway.
pub fn plan_should_activate(plan_status: PlanStatus, items: &[Item]) -> bool {
    plan_status == PlanStatus::Pending
        && items
            .iter()
            .any(|item| matches!(item.status, ItemStatus::Scheduled | ItemStatus::InProgress))
}

/// Unconditional on prior status: any non-terminal plan whose phases are all
/// completed is completed.
pub fn plan_should_complete(plan_status: PlanStatus, phases: &[Phase]) -> bool {
    !plan_status.is_terminal()
        && !phases.is_empty()
        && phases
            .iter()
            .all(|phase| phase.status == PhaseStatus::Completed)
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: u64, sequence: u32, status: ItemStatus) -> Item {
        let now = Timestamp::now();
        Item {
            id,
            phase_id: 1,
            sequence,
            name: format!("item {id}"),
            service_id: Some(id * 10),
            price: Decimal::ONE_HUNDRED,
            estimated_minutes: None,
            status,
            completed_at: None,
            assigned_doctor_id: None,
            notes: None,
            price_override: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn phase(status: PhaseStatus) -> Phase {
        Phase {
            id: 1,
            plan_id: 1,
            phase_number: 1,
            name: "Phase".into(),
            status,
            start_date: None,
            completion_date: None,
            estimated_days: None,
            items: Vec::new(),
        }
    }

    #[test]
    fn test_next_item_requires_adjacent_pending() {
        let items = vec![
            item(1, 1, ItemStatus::Completed),
            item(2, 2, ItemStatus::Pending),
            item(3, 3, ItemStatus::Pending),
        ];
        assert_eq!(next_item_to_activate(&items[0], &items).map(|i| i.id), Some(2));

        let items = vec![
            item(1, 1, ItemStatus::Completed),
            item(2, 2, ItemStatus::WaitingForPrerequisite),
            item(3, 3, ItemStatus::Pending),
        ];
        assert!(next_item_to_activate(&items[0], &items).is_none());
        assert!(next_item_to_activate(&items[2], &items).is_none());
    }

    #[test]
    fn test_unlock_only_waiting_items_in_set() {
        let items = vec![
            item(1, 1, ItemStatus::Completed),
            item(2, 2, ItemStatus::WaitingForPrerequisite),
            item(3, 3, ItemStatus::WaitingForPrerequisite),
            item(4, 4, ItemStatus::Pending),
        ];
        let unlocked = items_to_unlock(&items, 1, |service| service == 20 || service == 40);
        let ids: Vec<u64> = unlocked.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn test_unlock_skips_items_without_service() {
        let mut waiting = item(2, 2, ItemStatus::WaitingForPrerequisite);
        waiting.service_id = None;
        assert!(items_to_unlock(&[waiting], 1, |_| true).is_empty());
    }

    #[test]
    fn test_phase_start() {
        assert!(phase_should_start(PhaseStatus::Pending, ItemStatus::Scheduled));
        assert!(phase_should_start(PhaseStatus::Pending, ItemStatus::Completed));
        assert!(!phase_should_start(PhaseStatus::Pending, ItemStatus::Skipped));
        assert!(!phase_should_start(PhaseStatus::InProgress, ItemStatus::Scheduled));
    }

    #[test]
    fn test_empty_phase_never_completes() {
        assert!(!phase_should_complete(PhaseStatus::InProgress, &[]));
    }

    #[test]
    fn test_phase_completion_needs_all_resolved() {
        let items = vec![
            item(1, 1, ItemStatus::Completed),
            item(2, 2, ItemStatus::Skipped),
        ];
        assert!(phase_should_complete(PhaseStatus::InProgress, &items));
        assert!(phase_should_complete(PhaseStatus::Pending, &items));
        assert!(!phase_should_complete(PhaseStatus::Completed, &items));

        let items = vec![
            item(1, 1, ItemStatus::Completed),
            item(2, 2, ItemStatus::ReadyForBooking),
        ];
        assert!(!phase_should_complete(PhaseStatus::InProgress, &items));
    }

    #[test]
    fn test_plan_activation() {
        let booked = vec![item(1, 1, ItemStatus::Scheduled)];
        let idle = vec![item(1, 1, ItemStatus::ReadyForBooking)];
        assert!(plan_should_activate(PlanStatus::Pending, &booked));
        assert!(!plan_should_activate(PlanStatus::Pending, &idle));
        assert!(!plan_should_activate(PlanStatus::InProgress, &booked));
    }

    #[test]
    fn test_plan_completion_is_unconditional_on_prior_status() {
        let done = vec![phase(PhaseStatus::Completed), phase(PhaseStatus::Completed)];
        assert!(plan_should_complete(PlanStatus::Pending, &done));
        assert!(plan_should_complete(PlanStatus::InProgress, &done));
        assert!(!plan_should_complete(PlanStatus::Completed, &done));
        assert!(!plan_should_complete(PlanStatus::Cancelled, &done));
        assert!(!plan_should_complete(PlanStatus::InProgress, &[]));

        let open = vec![phase(PhaseStatus::Completed), phase(PhaseStatus::InProgress)];
        assert!(!plan_should_complete(PlanStatus::InProgress, &open));
    }
}
