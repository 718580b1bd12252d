use dentplan_core::{
    collaborators::Collaborators,
    models::{Actor, RoleClass},
    params::{
        AddPrerequisite, CreateCustomPlan, NewItem, NewPhase, NewTemplateItem, NewTemplatePhase,
        RegisterActor, RegisterPatient, RegisterService, RegisterTemplate,
    },
    Database, ErrorKind,
};
use rust_decimal_macros::dec;
use tempfile::NamedTempFile;

/// Helper function to create a temporary database for testing
fn create_test_db() -> (NamedTempFile, Database) {
    let temp_file = NamedTempFile::new().expect("Failed to create temporary file");
    let db = Database::new(temp_file.path()).expect("Failed to create test database");
    (temp_file, db)
}

fn bootstrap(db: &mut Database) -> Actor {
    db.register_actor(
        None,
        &RegisterActor {
            name: "Admin".to_string(),
            role: "admin".to_string(),
            ..Default::default()
        },
    )
    .expect("Failed to bootstrap admin")
}

#[test]
fn test_database_initialization_is_repeatable() {
    let (temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);
    drop(db);

    // Reopening runs the schema again over existing tables
    let db = Database::new(temp_file.path()).expect("Failed to reopen database");
    let actors = db.list_actors(&admin).expect("Failed to list actors");
    assert_eq!(actors.len(), 1);
    assert_eq!(actors[0].role, RoleClass::Admin);
}

#[test]
fn test_plan_codes_are_sequential_per_day() {
    let (_temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);
    let patient = db
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Ola".to_string(),
            },
        )
        .unwrap();
    let collaborators = Collaborators::in_memory();

    let mut codes = Vec::new();
    for name in ["First", "Second", "Third"] {
        let plan = db
            .create_custom_plan(
                &collaborators,
                &admin,
                &CreateCustomPlan {
                    patient_id: patient.id,
                    doctor_id: admin.id,
                    name: name.to_string(),
                    ..Default::default()
                },
            )
            .expect("Failed to create plan");
        codes.push(plan.code);
    }

    let prefix = &codes[0][..12];
    assert!(prefix.starts_with("TP-"));
    assert!(codes.iter().all(|code| code.starts_with(prefix)));
    let suffixes: Vec<&str> = codes.iter().map(|code| &code[12..]).collect();
    assert_eq!(suffixes, vec!["0001", "0002", "0003"]);
}

#[test]
fn test_decimal_prices_survive_storage() {
    let (_temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);
    let patient = db
        .register_patient(
            &admin,
            &RegisterPatient {
                name: "Ola".to_string(),
            },
        )
        .unwrap();

    let plan = db
        .create_custom_plan(
            &Collaborators::in_memory(),
            &admin,
            &CreateCustomPlan {
                patient_id: patient.id,
                doctor_id: admin.id,
                name: "Cents".to_string(),
                discount: Some(dec!(0.10)),
                phases: vec![NewPhase {
                    name: "Only".to_string(),
                    items: vec![
                        NewItem {
                            name: Some("A".to_string()),
                            price: Some(dec!(0.10)),
                            quantity: 1,
                            ..Default::default()
                        },
                        NewItem {
                            name: Some("B".to_string()),
                            price: Some(dec!(0.20)),
                            quantity: 1,
                            ..Default::default()
                        },
                    ],
                    ..Default::default()
                }],
                ..Default::default()
            },
        )
        .unwrap();

    let stored = db.get_plan(&admin, &plan.code).unwrap();
    assert_eq!(stored.total_cost, dec!(0.30));
    assert_eq!(stored.final_cost, dec!(0.20));
    assert_eq!(stored.phases[0].items[1].price, dec!(0.20));
}

#[test]
fn test_service_catalog() {
    let (_temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);

    let service = |code: &str| RegisterService {
        code: code.to_string(),
        name: format!("{code} service"),
        price: dec!(45.50),
        specialization: None,
        estimated_minutes: Some(20),
    };
    let scan = db.register_service(&admin, &service("SCAN")).unwrap();
    let guide = db.register_service(&admin, &service("GUIDE")).unwrap();

    let err = db.register_service(&admin, &service("SCAN")).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    db.add_prerequisite(
        &admin,
        &AddPrerequisite {
            service_id: guide.id,
            prerequisite_id: scan.id,
        },
    )
    .unwrap();
    let err = db
        .add_prerequisite(
            &admin,
            &AddPrerequisite {
                service_id: guide.id,
                prerequisite_id: 404,
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let services = db.list_services().unwrap();
    assert_eq!(services.len(), 2);
    assert_eq!(services.iter().find(|s| s.id == scan.id).map(|s| s.price), Some(dec!(45.50)));
}

#[test]
fn test_template_round_trip() {
    let (_temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);
    let exam = db
        .register_service(
            &admin,
            &RegisterService {
                code: "EXAM".to_string(),
                name: "Exam".to_string(),
                price: dec!(80),
                ..Default::default()
            },
        )
        .unwrap();

    let template = db
        .register_template(
            &admin,
            &RegisterTemplate {
                code: "CHECK".to_string(),
                name: "Check-up".to_string(),
                specialization: None,
                phases: vec![NewTemplatePhase {
                    name: "Exam".to_string(),
                    estimated_days: Some(1),
                    items: vec![NewTemplateItem {
                        service_id: exam.id,
                        quantity: 2,
                        price: Some(dec!(70)),
                    }],
                }],
            },
        )
        .unwrap();

    let loaded = db.get_template(template.id).unwrap();
    assert_eq!(loaded, template);
    assert_eq!(loaded.phases[0].phase_number, 1);
    assert_eq!(loaded.phases[0].items[0].quantity, 2);
    assert_eq!(loaded.phases[0].items[0].price, Some(dec!(70)));
    assert_eq!(db.list_templates().unwrap().len(), 1);

    let err = db.get_template(template.id + 1).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[test]
fn test_only_admins_register_actors() {
    let (_temp_file, mut db) = create_test_db();
    let admin = bootstrap(&mut db);
    let doctor = db
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Dr. Lin".to_string(),
                role: "doctor".to_string(),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(doctor.role, RoleClass::Employee);

    let err = db
        .register_actor(
            Some(&doctor),
            &RegisterActor {
                name: "Someone".to_string(),
                role: "EMPLOYEE".to_string(),
                ..Default::default()
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = db
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Ghost".to_string(),
                role: "PATIENT".to_string(),
                specialization: None,
                patient_id: Some(77),
            },
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}
