#[cfg(test)]
mod model_tests {
    use jiff::Timestamp;
    use rust_decimal_macros::dec;

    use crate::models::{
        AppointmentStatus, ApprovalStatus, AuditAction, Item, ItemStatus, Phase, PhaseStatus,
        Plan, PlanStatus, PlanSummary, RoleClass,
    };

    fn epoch() -> Timestamp {
        Timestamp::from_second(1640995200).unwrap() // 2022-01-01 00:00:00 UTC
    }

    fn create_test_item(id: u64, sequence: u32, status: ItemStatus) -> Item {
        Item {
            id,
            phase_id: 1,
            sequence,
            name: format!("Item {id}"),
            service_id: None,
            price: dec!(100),
            estimated_minutes: None,
            status,
            completed_at: None,
            assigned_doctor_id: None,
            notes: None,
            price_override: None,
            created_at: epoch(),
            updated_at: epoch(),
        }
    }

    fn create_test_plan() -> Plan {
        Plan {
            id: 7,
            code: "TP-20220101-0001".to_string(),
            name: "Restorative".to_string(),
            patient_id: 3,
            patient_name: Some("Jane Doe".to_string()),
            doctor_id: 2,
            created_by: 2,
            created_by_name: None,
            template_id: None,
            status: PlanStatus::InProgress,
            approval_status: ApprovalStatus::Approved,
            total_cost: dec!(300),
            discount_amount: dec!(50),
            final_cost: dec!(250),
            start_date: None,
            expected_end_date: None,
            approved_by: Some(1),
            approved_at: Some(epoch()),
            approval_note: None,
            created_at: epoch(),
            updated_at: epoch(),
            phases: vec![
                Phase {
                    id: 1,
                    plan_id: 7,
                    phase_number: 1,
                    name: "Preparation".to_string(),
                    status: PhaseStatus::Completed,
                    start_date: None,
                    completion_date: None,
                    estimated_days: Some(7),
                    items: vec![
                        create_test_item(1, 1, ItemStatus::Completed),
                        create_test_item(2, 2, ItemStatus::Skipped),
                    ],
                },
                Phase {
                    id: 2,
                    plan_id: 7,
                    phase_number: 2,
                    name: "Restoration".to_string(),
                    status: PhaseStatus::InProgress,
                    start_date: None,
                    completion_date: None,
                    estimated_days: None,
                    items: vec![
                        create_test_item(3, 1, ItemStatus::Scheduled),
                        create_test_item(4, 2, ItemStatus::Pending),
                    ],
                },
            ],
        }
    }

    #[test]
    fn test_item_status_parsing_is_lenient() {
        assert_eq!("ready-for-booking".parse::<ItemStatus>(), Ok(ItemStatus::ReadyForBooking));
        assert_eq!(" skipped ".parse::<ItemStatus>(), Ok(ItemStatus::Skipped));
        assert!("booked".parse::<ItemStatus>().is_err());
    }

    #[test]
    fn test_status_round_trip_through_str() {
        for status in PlanStatus::ALL {
            assert_eq!(status.as_str().parse::<PlanStatus>(), Ok(status));
        }
        for status in ItemStatus::ALL {
            assert_eq!(status.as_str().parse::<ItemStatus>(), Ok(status));
        }
        for action in AuditAction::ALL {
            assert_eq!(action.as_str().parse::<AuditAction>(), Ok(action));
        }
    }

    #[test]
    fn test_status_predicates() {
        assert!(PlanStatus::Completed.is_terminal());
        assert!(PlanStatus::Cancelled.is_terminal());
        assert!(!PlanStatus::InProgress.is_terminal());

        assert!(ItemStatus::Skipped.is_resolved());
        assert!(!ItemStatus::InProgress.is_resolved());

        assert!(ItemStatus::Scheduled.is_locked_for_edit());
        assert!(!ItemStatus::Skipped.is_locked_for_edit());

        assert!(AppointmentStatus::CheckedIn.is_active());
        assert!(!AppointmentStatus::NoShow.is_active());
    }

    #[test]
    fn test_role_class_aliases() {
        assert_eq!("doctor".parse::<RoleClass>(), Ok(RoleClass::Employee));
        assert_eq!("Administrator".parse::<RoleClass>(), Ok(RoleClass::Admin));
        assert!("receptionist".parse::<RoleClass>().is_err());
    }

    #[test]
    fn test_skipped_item_is_not_billable() {
        assert_eq!(create_test_item(1, 1, ItemStatus::Pending).billable_price(), dec!(100));
        assert_eq!(
            create_test_item(1, 1, ItemStatus::Skipped).billable_price(),
            dec!(0)
        );
    }

    #[test]
    fn test_plan_navigation_helpers() {
        let plan = create_test_plan();
        assert_eq!(plan.item_count(), 4);
        assert_eq!(plan.item(3).map(|item| item.status), Some(ItemStatus::Scheduled));
        assert!(plan.item(99).is_none());
        assert_eq!(plan.phase(2).map(|phase| phase.phase_number), Some(2));

        let costs = plan.costs();
        assert_eq!(costs.final_cost, costs.total_cost - costs.discount_amount);
    }

    #[test]
    fn test_plan_summary_from_plan() {
        let summary = PlanSummary::from(&create_test_plan());
        assert_eq!(summary.total_phases, 2);
        assert_eq!(summary.total_items, 4);
        assert_eq!(summary.resolved_items, 2);
        assert_eq!(summary.progress_percent(), 50);
        assert_eq!(summary.final_cost, dec!(250));
    }

    #[test]
    fn test_empty_plan_progress_is_zero() {
        let mut plan = create_test_plan();
        plan.phases.clear();
        assert_eq!(PlanSummary::from(&plan).progress_percent(), 0);
    }

    #[test]
    fn test_serde_uses_screaming_snake_case() {
        let json = serde_json::to_string(&ItemStatus::WaitingForPrerequisite).unwrap();
        assert_eq!(json, "\"WAITING_FOR_PREREQUISITE\"");

        let status: ApprovalStatus = serde_json::from_str("\"PENDING_REVIEW\"").unwrap();
        assert_eq!(status, ApprovalStatus::PendingReview);
    }

    #[test]
    fn test_plan_serialization_omits_absent_names() {
        let mut plan = create_test_plan();
        plan.patient_name = None;
        let value = serde_json::to_value(&plan).unwrap();
        assert!(value.get("patient_name").is_none());
        assert_eq!(value["code"], "TP-20220101-0001");
        assert_eq!(value["phases"][1]["items"][0]["status"], "SCHEDULED");
    }
}
