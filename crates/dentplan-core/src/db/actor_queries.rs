//! Actors and patients.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{optional_id, parse_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Actor, Patient, RoleClass},
};

const ACTOR_COLUMNS: &str = "id, name, role, specialization, patient_id, active";
const INSERT_ACTOR_SQL: &str = "INSERT INTO actors (name, role, specialization, patient_id, created_at) VALUES (?1, ?2, ?3, ?4, ?5)";
const COUNT_ADMINS_SQL: &str = "SELECT COUNT(*) FROM actors WHERE role = 'ADMIN' AND active = 1";
const SET_ACTIVE_SQL: &str = "UPDATE actors SET active = ?1 WHERE id = ?2";
const SELECT_PATIENT_SQL: &str = "SELECT id, name, created_at FROM patients WHERE id = ?1";
const SELECT_PATIENTS_SQL: &str = "SELECT id, name, created_at FROM patients ORDER BY id";
const INSERT_PATIENT_SQL: &str = "INSERT INTO patients (name, created_at) VALUES (?1, ?2)";

fn build_actor_from_row(row: &rusqlite::Row) -> rusqlite::Result<Actor> {
    Ok(Actor {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        role: parse_column::<RoleClass>(row, 2)?,
        specialization: row.get(3)?,
        patient_id: optional_id(row, 4)?,
        active: row.get(5)?,
    })
}

pub fn select_actor(conn: &Connection, actor_id: u64) -> Result<Option<Actor>> {
    conn.query_row(
        &format!("SELECT {ACTOR_COLUMNS} FROM actors WHERE id = ?1"),
        params![actor_id as i64],
        build_actor_from_row,
    )
    .optional()
    .db_context("Failed to query actor")
}

pub fn select_actors(conn: &Connection) -> Result<Vec<Actor>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {ACTOR_COLUMNS} FROM actors ORDER BY id"))
        .db_context("Failed to prepare query")?;
    let actors = stmt
        .query_map([], build_actor_from_row)
        .db_context("Failed to query actors")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch actors")?;
    Ok(actors)
}

pub fn count_active_admins(conn: &Connection) -> Result<u64> {
    let count: i64 = conn
        .query_row(COUNT_ADMINS_SQL, [], |row| row.get(0))
        .db_context("Failed to count administrators")?;
    Ok(count as u64)
}

pub fn insert_actor(
    conn: &Connection,
    name: &str,
    role: RoleClass,
    specialization: Option<&str>,
    patient_id: Option<u64>,
    now: Timestamp,
) -> Result<Actor> {
    conn.execute(
        INSERT_ACTOR_SQL,
        params![
            name,
            role.as_str(),
            specialization,
            patient_id.map(|id| id as i64),
            now.to_string()
        ],
    )
    .db_context("Failed to insert actor")?;

    Ok(Actor {
        id: conn.last_insert_rowid() as u64,
        name: name.to_string(),
        role,
        specialization: specialization.map(String::from),
        patient_id,
        active: true,
    })
}

/// Returns false when no such actor exists.
pub fn set_actor_active(conn: &Connection, actor_id: u64, active: bool) -> Result<bool> {
    let rows = conn
        .execute(SET_ACTIVE_SQL, params![active, actor_id as i64])
        .db_context("Failed to update actor")?;
    Ok(rows > 0)
}

fn build_patient_from_row(row: &rusqlite::Row) -> rusqlite::Result<Patient> {
    Ok(Patient {
        id: row.get::<_, i64>(0)? as u64,
        name: row.get(1)?,
        created_at: parse_column(row, 2)?,
    })
}

pub fn select_patient(conn: &Connection, patient_id: u64) -> Result<Option<Patient>> {
    conn.query_row(
        SELECT_PATIENT_SQL,
        params![patient_id as i64],
        build_patient_from_row,
    )
    .optional()
    .db_context("Failed to query patient")
}

pub fn select_patients(conn: &Connection) -> Result<Vec<Patient>> {
    let mut stmt = conn
        .prepare(SELECT_PATIENTS_SQL)
        .db_context("Failed to prepare query")?;
    let patients = stmt
        .query_map([], build_patient_from_row)
        .db_context("Failed to query patients")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch patients")?;
    Ok(patients)
}

pub fn insert_patient(conn: &Connection, name: &str, now: Timestamp) -> Result<Patient> {
    conn.execute(INSERT_PATIENT_SQL, params![name, now.to_string()])
        .db_context("Failed to insert patient")?;
    Ok(Patient {
        id: conn.last_insert_rowid() as u64,
        name: name.to_string(),
        created_at: now,
    })
}
