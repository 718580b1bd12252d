//! Externally scheduled appointments linked to items.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{AppointmentStatus, LinkedAppointment},
};

const APPOINTMENT_COLUMNS: &str = "id, item_id, status, scheduled_at";
const INSERT_APPOINTMENT_SQL: &str =
    "INSERT INTO appointments (item_id, status, scheduled_at, created_at) VALUES (?1, ?2, ?3, ?4)";
const UPDATE_STATUS_SQL: &str = "UPDATE appointments SET status = ?1 WHERE id = ?2";

fn build_appointment_from_row(row: &rusqlite::Row) -> rusqlite::Result<LinkedAppointment> {
    Ok(LinkedAppointment {
        id: row.get::<_, i64>(0)? as u64,
        item_id: row.get::<_, i64>(1)? as u64,
        status: parse_column::<AppointmentStatus>(row, 2)?,
        scheduled_at: parse_optional_column(row, 3)?,
    })
}

pub fn select_appointments_for_item(
    conn: &Connection,
    item_id: u64,
) -> Result<Vec<LinkedAppointment>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE item_id = ?1 ORDER BY id"
        ))
        .db_context("Failed to prepare query")?;
    let appointments = stmt
        .query_map(params![item_id as i64], build_appointment_from_row)
        .db_context("Failed to query appointments")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch appointments")?;
    Ok(appointments)
}

pub fn select_appointment(conn: &Connection, id: u64) -> Result<Option<LinkedAppointment>> {
    conn.query_row(
        &format!("SELECT {APPOINTMENT_COLUMNS} FROM appointments WHERE id = ?1"),
        params![id as i64],
        build_appointment_from_row,
    )
    .optional()
    .db_context("Failed to query appointment")
}

pub fn insert_appointment(
    conn: &Connection,
    item_id: u64,
    status: AppointmentStatus,
    scheduled_at: Option<Timestamp>,
    now: Timestamp,
) -> Result<LinkedAppointment> {
    conn.execute(
        INSERT_APPOINTMENT_SQL,
        params![
            item_id as i64,
            status.as_str(),
            scheduled_at.map(|t| t.to_string()),
            now.to_string()
        ],
    )
    .db_context("Failed to insert appointment")?;
    Ok(LinkedAppointment {
        id: conn.last_insert_rowid() as u64,
        item_id,
        status,
        scheduled_at,
    })
}

pub fn set_appointment_status(
    conn: &Connection,
    id: u64,
    status: AppointmentStatus,
) -> Result<bool> {
    let rows = conn
        .execute(UPDATE_STATUS_SQL, params![status.as_str(), id as i64])
        .db_context("Failed to update appointment")?;
    Ok(rows > 0)
}
