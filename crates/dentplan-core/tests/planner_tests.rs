mod common;

use std::sync::Arc;

use common::{create_test_planner, priced};
use dentplan_core::{
    collaborators::MemoryAuditLog,
    models::{AuditAction, ItemStatus, PlanStatus},
    params::{
        AddItems, CreateCustomPlan, CreatePlanFromTemplate, DecidePlan, Id, ListPlans, NewPhase,
        NewTemplateItem, NewTemplatePhase, PlanCode, RegisterActor, RegisterPatient,
        RegisterService, RegisterTemplate, SubmitPlan, UpdateItemStatus,
    },
    ApprovalStatus, Decision, ErrorKind, PlannerBuilder, PlannerError,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use tempfile::TempDir;

#[tokio::test]
#[allow(clippy::too_many_lines)]
async fn test_complete_template_workflow() {
    let (_temp_dir, planner) = create_test_planner().await;

    let admin = planner
        .register_actor(
            None,
            &RegisterActor {
                name: "Front desk".to_string(),
                role: "ADMIN".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to bootstrap admin");
    let doctor = planner
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Dr. Moss".to_string(),
                role: "EMPLOYEE".to_string(),
                specialization: Some("Endodontics".to_string()),
                patient_id: None,
            },
        )
        .await
        .expect("Failed to register doctor");
    let patient = planner
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Ana Ruiz".to_string(),
            },
        )
        .await
        .expect("Failed to register patient");

    let mut services = Vec::new();
    for (code, name, price) in [("XRAY", "X-ray", 60), ("RCT", "Root canal", 800)] {
        let service = planner
            .register_service(
                &admin,
                &RegisterService {
                    code: code.to_string(),
                    name: name.to_string(),
                    price: Decimal::new(price, 0),
                    specialization: None,
                    estimated_minutes: Some(45),
                },
            )
            .await
            .expect("Failed to register service");
        services.push(service);
    }
    let template = planner
        .register_template(
            &admin,
            &RegisterTemplate {
                code: "ENDO".to_string(),
                name: "Root canal therapy".to_string(),
                specialization: Some("Endodontics".to_string()),
                phases: vec![
                    NewTemplatePhase {
                        name: "Diagnosis".to_string(),
                        estimated_days: Some(3),
                        items: vec![NewTemplateItem {
                            service_id: services[0].id,
                            quantity: 1,
                            price: None,
                        }],
                    },
                    NewTemplatePhase {
                        name: "Treatment".to_string(),
                        estimated_days: Some(10),
                        items: vec![NewTemplateItem {
                            service_id: services[1].id,
                            quantity: 1,
                            price: None,
                        }],
                    },
                ],
            },
        )
        .await
        .expect("Failed to register template");

    let plan = planner
        .create_plan_from_template(
            &doctor,
            &CreatePlanFromTemplate {
                patient_id: patient.id,
                doctor_id: doctor.id,
                template_id: template.id,
                discount: Some(Decimal::new(60, 0)),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create plan");
    assert_eq!(plan.total_cost, Decimal::new(860, 0));
    assert_eq!(plan.final_cost, Decimal::new(800, 0));
    assert_eq!(plan.status, PlanStatus::Pending);
    assert_eq!(plan.approval_status, ApprovalStatus::Draft);

    planner
        .submit_for_review(
            &doctor,
            &SubmitPlan {
                code: plan.code.clone(),
                notes: None,
            },
        )
        .await
        .expect("Failed to submit");
    let approved = planner
        .decide(
            &admin,
            &DecidePlan {
                code: plan.code.clone(),
                decision: Decision::Approve,
                notes: Some("Covered by insurance".to_string()),
            },
        )
        .await
        .expect("Failed to approve");
    assert_eq!(approved.approval_status, ApprovalStatus::Approved);
    assert!(approved
        .items()
        .all(|item| item.status == ItemStatus::ReadyForBooking));

    // Work through every item in order
    let item_ids: Vec<u64> = approved.items().map(|item| item.id).collect();
    for item_id in &item_ids {
        for status in ["SCHEDULED", "IN_PROGRESS", "COMPLETED"] {
            planner
                .update_item_status(
                    &doctor,
                    &UpdateItemStatus {
                        item_id: *item_id,
                        status: status.to_string(),
                        ..Default::default()
                    },
                )
                .await
                .unwrap_or_else(|e| panic!("Failed to set {status} on item {item_id}: {e}"));
        }
    }

    let code = PlanCode {
        code: plan.code.clone(),
    };
    let finished = planner.get_plan(&doctor, &code).await.unwrap();
    assert_eq!(finished.status, PlanStatus::Completed);
    assert!(finished.start_date.is_some());
    assert_eq!(finished.final_cost, Decimal::new(800, 0));

    let rendered = finished.to_string();
    assert!(rendered.contains(&format!("# {}: Root canal therapy", plan.code)));
    assert!(rendered.contains("## Phase 1: Diagnosis"));

    let summaries = planner.list_plans(&admin, &ListPlans::default()).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries.0[0].progress_percent(), 100);

    let trail = planner.audit_trail(&admin, &code).await.unwrap();
    let actions: Vec<AuditAction> = trail.iter().map(|entry| entry.action).collect();
    assert_eq!(actions.first(), Some(&AuditAction::Created));
    assert!(actions.contains(&AuditAction::Submitted));
    assert!(actions.contains(&AuditAction::Approved));
    assert_eq!(
        trail
            .iter()
            .filter(|entry| entry.action == AuditAction::ItemStatusChanged)
            .count(),
        6
    );

    let item = planner.get_item(&doctor, &Id { id: item_ids[0] }).await.unwrap();
    assert_eq!(item.status, ItemStatus::Completed);
    assert!(item.completed_at.is_some());
}

#[tokio::test]
async fn test_custom_audit_recorder_receives_committed_entries() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let audit = Arc::new(MemoryAuditLog::default());
    let planner = PlannerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("audit.db")))
        .with_audit_recorder(audit.clone())
        .build()
        .await
        .expect("Failed to create planner");

    let admin = planner
        .register_actor(
            None,
            &RegisterActor {
                name: "Admin".to_string(),
                role: "ADMIN".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let patient = planner
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Sam".to_string(),
            },
        )
        .await
        .unwrap();

    let plan = planner
        .create_custom_plan(
            &admin,
            &CreateCustomPlan {
                patient_id: patient.id,
                doctor_id: admin.id,
                name: "Check-up".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    // A refused submission is rolled back and leaves no entry behind
    let err = planner
        .submit_for_review(
            &admin,
            &SubmitPlan {
                code: plan.code.clone(),
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let entries = audit.entries();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].action, AuditAction::Created);
    assert_eq!(entries[0].actor_id, admin.id);
}

#[tokio::test]
async fn test_concurrent_planners_share_one_database() {
    let (temp_dir, planner) = create_test_planner().await;
    let admin = planner
        .register_actor(
            None,
            &RegisterActor {
                name: "Admin".to_string(),
                role: "ADMIN".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let patient = planner
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Kim".to_string(),
            },
        )
        .await
        .unwrap();

    let second = PlannerBuilder::new()
        .with_database_path(Some(temp_dir.path().join("test.db")))
        .build()
        .await
        .unwrap();

    let create = |name: &str| CreateCustomPlan {
        patient_id: patient.id,
        doctor_id: admin.id,
        name: name.to_string(),
        ..Default::default()
    };
    let (first, other) = (create("First"), create("Second"));
    let (a, b) = tokio::join!(
        planner.create_custom_plan(&admin, &first),
        second.create_custom_plan(&admin, &other),
    );
    let (a, b) = (a.unwrap(), b.unwrap());
    assert_ne!(a.code, b.code);

    let summaries = second.list_plans(&admin, &ListPlans::default()).await.unwrap();
    assert_eq!(summaries.len(), 2);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_parallel_additions_to_one_plan_all_succeed() {
    let (temp_dir, planner) = create_test_planner().await;
    let admin = planner
        .register_actor(
            None,
            &RegisterActor {
                name: "Admin".to_string(),
                role: "ADMIN".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let patient = planner
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Lee".to_string(),
            },
        )
        .await
        .unwrap();
    let plan = planner
        .create_custom_plan(
            &admin,
            &CreateCustomPlan {
                patient_id: patient.id,
                doctor_id: admin.id,
                name: "Busy chair".to_string(),
                phases: vec![NewPhase {
                    name: "Treatment".to_string(),
                    estimated_days: None,
                    items: vec![priced("Exam", 100)],
                }],
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let phase_id = plan.phases[0].id;

    const WORKERS: usize = 8;
    const ADDITIONS: usize = 5;
    let mut handles = Vec::new();
    for worker in 0..WORKERS {
        let planner = PlannerBuilder::new()
            .with_database_path(Some(temp_dir.path().join("test.db")))
            .build()
            .await
            .unwrap();
        let admin = admin.clone();
        handles.push(tokio::spawn(async move {
            for n in 0..ADDITIONS {
                planner
                    .add_items_to_phase(
                        &admin,
                        &AddItems {
                            phase_id,
                            items: vec![priced(&format!("Filling {worker}-{n}"), 10)],
                            auto_submit: true,
                        },
                    )
                    .await?;
            }
            Ok::<_, PlannerError>(())
        }));
    }
    for handle in handles {
        handle.await.unwrap().expect("Parallel addition failed");
    }

    let plan = planner
        .get_plan(&admin, &PlanCode { code: plan.code })
        .await
        .unwrap();
    let sequences: Vec<u32> = plan.phases[0].items.iter().map(|item| item.sequence).collect();
    let expected: Vec<u32> = (1..=(1 + WORKERS * ADDITIONS) as u32).collect();
    assert_eq!(sequences, expected);
    assert_eq!(plan.total_cost, dec!(500));
    assert_eq!(plan.final_cost, dec!(500));
}
