//! Integration tests comparing CLI output with the core Display
//! implementations
//!
//! The CLI and the MCP server both print the core crate's markdown, so plain
//! CLI output must match the Display output of the same records exactly.

use std::process::Command;

use dentplan_core::{
    display::CreateResult,
    models::Actor,
    params::{
        AddItems, CreateCustomPlan, ListPlans, NewItem, NewPhase, PlanCode, RegisterActor,
        RegisterPatient, UpdateItemStatus,
    },
    Planner, PlannerBuilder,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// Helper function to create a test planner with temporary database
async fn create_test_planner() -> (Planner, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temporary directory");
    let db_path = temp_dir.path().join("test.db");

    let planner = PlannerBuilder::new()
        .with_database_path(Some(db_path))
        .build()
        .await
        .expect("Failed to create planner");

    (planner, temp_dir)
}

/// Run a CLI command as the given actor and capture its output
fn run_cli_command(db_path: &str, actor_id: u64, args: &[&str]) -> String {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_dentplan"));
    cmd.arg("--no-color")
        .arg("--database-file")
        .arg(db_path)
        .arg("--as")
        .arg(actor_id.to_string());

    for arg in args {
        cmd.arg(arg);
    }

    let output = cmd.output().expect("Failed to run CLI command");
    String::from_utf8(output.stdout).expect("Invalid UTF-8 in CLI output")
}

/// Bootstraps an administrator and a patient, then creates a two-item plan.
async fn seed_plan(planner: &Planner) -> (Actor, String) {
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
        .expect("Failed to bootstrap admin");
    let patient = planner
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Noor Haddad".to_string(),
            },
        )
        .await
        .expect("Failed to register patient");

    let item = |name: &str, price: i64| NewItem {
        name: Some(name.to_string()),
        price: Some(Decimal::new(price, 0)),
        quantity: 1,
        ..Default::default()
    };
    let plan = planner
        .create_custom_plan(
            &admin,
            &CreateCustomPlan {
                patient_id: patient.id,
                doctor_id: admin.id,
                name: "Restoration".to_string(),
                discount: Some(Decimal::new(25, 0)),
                phases: vec![NewPhase {
                    name: "Fillings".to_string(),
                    estimated_days: Some(14),
                    items: vec![item("Filling 36", 150), item("Filling 46", 150)],
                }],
                ..Default::default()
            },
        )
        .await
        .expect("Failed to create plan");
    (admin, plan.code)
}

#[tokio::test]
async fn test_plan_show_matches_display() {
    let (planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    let (admin, code) = seed_plan(&planner).await;

    let cli_output = run_cli_command(db_path.to_str().unwrap(), admin.id, &["plan", "show", &code]);

    let plan = planner
        .get_plan(&admin, &PlanCode { code: code.clone() })
        .await
        .expect("Failed to get plan");
    assert_eq!(cli_output, plan.to_string());
    assert!(cli_output.contains("275.00"));
}

#[tokio::test]
async fn test_plan_list_matches_display() {
    let (planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    let (admin, code) = seed_plan(&planner).await;

    let plan = planner
        .get_plan(&admin, &PlanCode { code })
        .await
        .unwrap();
    planner
        .update_item_status(
            &admin,
            &UpdateItemStatus {
                item_id: plan.phases[0].items[0].id,
                status: "COMPLETED".to_string(),
                ..Default::default()
            },
        )
        .await
        .expect("Failed to complete item");

    let cli_output = run_cli_command(db_path.to_str().unwrap(), admin.id, &["plan", "list"]);
    let summaries = planner
        .list_plans(&admin, &ListPlans::default())
        .await
        .expect("Failed to list plans");

    assert_eq!(cli_output, summaries.to_string());
    assert!(cli_output.contains("(1/2 items, 50%)"));
}

#[tokio::test]
async fn test_item_add_and_audit_match_display() {
    let (planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    let db_str = db_path.to_str().unwrap();
    let (admin, code) = seed_plan(&planner).await;
    let phase_id = planner
        .get_plan(&admin, &PlanCode { code: code.clone() })
        .await
        .unwrap()
        .phases[0]
        .id;

    let cli_output = run_cli_command(
        db_str,
        admin.id,
        &[
            "item",
            "add",
            &phase_id.to_string(),
            "--name",
            "Polishing",
            "--price",
            "40",
        ],
    );
    assert!(cli_output.starts_with(&format!("Added 1 item(s) to phase {phase_id}")));
    assert!(cli_output.contains("275.00 → 315.00"));

    // A direct addition renders through the same Display implementation
    let direct = planner
        .add_items_to_phase(
            &admin,
            &AddItems {
                phase_id,
                items: vec![NewItem {
                    name: Some("Fluoride".to_string()),
                    price: Some(Decimal::new(20, 0)),
                    quantity: 1,
                    ..Default::default()
                }],
                auto_submit: true,
            },
        )
        .await
        .expect("Failed to add item");
    assert!(direct
        .to_string()
        .starts_with(&format!("Added 1 item(s) to phase {phase_id}")));

    let cli_trail = run_cli_command(db_str, admin.id, &["plan", "audit", &code]);
    let trail = planner
        .audit_trail(&admin, &PlanCode { code: code.clone() })
        .await
        .expect("Failed to read audit trail");
    assert_eq!(cli_trail, trail.to_string());
}

#[tokio::test]
async fn test_create_output_matches_create_result() {
    let (planner, temp_dir) = create_test_planner().await;
    let db_path = temp_dir.path().join("test.db");
    let (admin, _code) = seed_plan(&planner).await;

    let cli_output = run_cli_command(
        db_path.to_str().unwrap(),
        admin.id,
        &["patient", "add", "Ravi Kumar"],
    );

    let patients = planner.list_patients(&admin).await.unwrap();
    let created = patients
        .iter()
        .find(|patient| patient.name == "Ravi Kumar")
        .cloned()
        .expect("Patient was not stored");
    assert_eq!(cli_output, CreateResult::new(created).to_string());
}
