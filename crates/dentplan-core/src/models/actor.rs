//! Actors (staff, administrators, patient accounts) and patients.

use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// Role class used by the ownership guard.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoleClass {
    Admin,
    Employee,
    Patient,
}

impl RoleClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoleClass::Admin => "ADMIN",
            RoleClass::Employee => "EMPLOYEE",
            RoleClass::Patient => "PATIENT",
        }
    }
}

impl FromStr for RoleClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" | "ADMINISTRATOR" => Ok(RoleClass::Admin),
            "EMPLOYEE" | "STAFF" | "DOCTOR" => Ok(RoleClass::Employee),
            "PATIENT" => Ok(RoleClass::Patient),
            _ => Err(format!("Invalid role class: {s}")),
        }
    }
}

/// The resolved identity performing a request.
///
/// Resolved once at the request boundary and passed explicitly to every engine
/// operation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Actor {
    pub id: u64,
    pub name: String,
    pub role: RoleClass,

    /// Clinical specialization for doctors
    pub specialization: Option<String>,

    /// Patient record behind a patient-class account
    pub patient_id: Option<u64>,

    pub active: bool,
}

impl Actor {
    pub fn is_admin(&self) -> bool {
        self.role == RoleClass::Admin
    }
}

/// A patient receiving treatment.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Patient {
    pub id: u64,
    pub name: String,
    pub created_at: Timestamp,
}
