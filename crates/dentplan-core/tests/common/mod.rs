#![allow(dead_code)]

use std::sync::Arc;

use dentplan_core::{
    collaborators::{Collaborators, MemoryAuditLog, StaticAppointments, StaticPrerequisites},
    models::{Actor, LinkedAppointment, Plan, Service},
    params::{CreateCustomPlan, NewItem, NewPhase, RegisterActor, RegisterPatient, RegisterService},
    Database, Planner, PlannerBuilder,
};
use rust_decimal::Decimal;
use tempfile::TempDir;

/// A seeded clinic: one administrator, two doctors, one patient with a
/// patient account, and three catalog services where the crown requires the
/// exam.
pub struct Clinic {
    pub _dir: TempDir,
    pub db: Database,
    pub admin: Actor,
    /// Prosthodontist, owns most test plans
    pub doctor_a: Actor,
    /// General dentist without specialization
    pub doctor_b: Actor,
    pub patient_id: u64,
    pub patient_account: Actor,
    pub exam: Service,
    pub cleaning: Service,
    pub crown: Service,
}

pub fn clinic() -> Clinic {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut db = Database::new(dir.path().join("clinic.db")).expect("Failed to open database");

    let admin = db
        .register_actor(
            None,
            &RegisterActor {
                name: "Admin".to_string(),
                role: "ADMIN".to_string(),
                ..Default::default()
            },
        )
        .expect("Failed to bootstrap admin");
    let doctor_a = db
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Dr. Able".to_string(),
                role: "EMPLOYEE".to_string(),
                specialization: Some("Prosthodontics".to_string()),
                patient_id: None,
            },
        )
        .expect("Failed to register doctor A");
    let doctor_b = db
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Dr. Baker".to_string(),
                role: "EMPLOYEE".to_string(),
                ..Default::default()
            },
        )
        .expect("Failed to register doctor B");
    let patient = db
        .register_patient(&admin, &RegisterPatient { name: "Pat Smith".to_string() })
        .expect("Failed to register patient");
    let patient_account = db
        .register_actor(
            Some(&admin),
            &RegisterActor {
                name: "Pat Smith".to_string(),
                role: "PATIENT".to_string(),
                specialization: None,
                patient_id: Some(patient.id),
            },
        )
        .expect("Failed to register patient account");

    let exam = register_service(&mut db, &admin, "EXAM", "Examination", 100, None);
    let cleaning = register_service(&mut db, &admin, "CLEAN", "Cleaning", 200, None);
    let crown = register_service(
        &mut db,
        &admin,
        "CROWN",
        "Crown",
        300,
        Some("Prosthodontics"),
    );

    Clinic {
        _dir: dir,
        db,
        admin,
        doctor_a,
        doctor_b,
        patient_id: patient.id,
        patient_account,
        exam,
        cleaning,
        crown,
    }
}

fn register_service(
    db: &mut Database,
    admin: &Actor,
    code: &str,
    name: &str,
    price: i64,
    specialization: Option<&str>,
) -> Service {
    db.register_service(
        admin,
        &RegisterService {
            code: code.to_string(),
            name: name.to_string(),
            price: Decimal::new(price, 0),
            specialization: specialization.map(String::from),
            estimated_minutes: Some(30),
        },
    )
    .expect("Failed to register service")
}

impl Clinic {
    /// In-memory collaborators: the crown requires the exam, appointments
    /// come from `appointments`.
    pub fn collaborators(
        &self,
        appointments: Vec<LinkedAppointment>,
    ) -> (Collaborators, Arc<MemoryAuditLog>) {
        let audit = Arc::new(MemoryAuditLog::default());
        let collaborators = Collaborators {
            prerequisites: Arc::new(StaticPrerequisites::new([(self.crown.id, self.exam.id)])),
            appointments: Arc::new(StaticAppointments::new(appointments)),
            audit: audit.clone(),
        };
        (collaborators, audit)
    }

    /// A one-phase plan owned by doctor A.
    pub fn single_phase_plan(&mut self, collaborators: &Collaborators, items: Vec<NewItem>) -> Plan {
        let owner = self.doctor_a.clone();
        self.custom_plan(collaborators, &owner, items, None)
    }

    pub fn custom_plan(
        &mut self,
        collaborators: &Collaborators,
        owner: &Actor,
        items: Vec<NewItem>,
        discount: Option<Decimal>,
    ) -> Plan {
        self.db
            .create_custom_plan(
                collaborators,
                owner,
                &CreateCustomPlan {
                    patient_id: self.patient_id,
                    doctor_id: self.doctor_a.id,
                    name: "Restorative care".to_string(),
                    discount,
                    start_date: None,
                    phases: vec![NewPhase {
                        name: "Treatment".to_string(),
                        estimated_days: None,
                        items,
                    }],
                },
            )
            .expect("Failed to create plan")
    }
}

/// A free-form item with a fixed price.
pub fn priced(name: &str, price: i64) -> NewItem {
    NewItem {
        name: Some(name.to_string()),
        price: Some(Decimal::new(price, 0)),
        quantity: 1,
        ..Default::default()
    }
}

/// An item linked to a catalog service at its catalog price.
pub fn from_service(service: &Service) -> NewItem {
    NewItem {
        service_id: Some(service.id),
        quantity: 1,
        ..Default::default()
    }
}

/// Item IDs of the first phase, in sequence order.
pub fn item_ids(plan: &Plan) -> Vec<u64> {
    plan.phases[0].items.iter().map(|item| item.id).collect()
}

pub async fn create_test_planner() -> (TempDir, Planner) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = temp_dir.path().join("test.db");
    let planner = PlannerBuilder::new()
        .with_database_path(Some(&db_path))
        .build()
        .await
        .expect("Failed to create planner");
    (temp_dir, planner)
}
