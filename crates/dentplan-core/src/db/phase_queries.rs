//! Phase queries.

use jiff::civil::Date;
use rusqlite::{params, Connection, OptionalExtension};

use super::{optional_u32, parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Phase, PhaseStatus},
};

const PHASE_COLUMNS: &str =
    "id, plan_id, phase_number, name, status, start_date, completion_date, estimated_days";
const INSERT_PHASE_SQL: &str = "INSERT INTO phases (plan_id, phase_number, name, status, estimated_days) VALUES (?1, ?2, ?3, ?4, ?5)";
const NEXT_PHASE_NUMBER_SQL: &str =
    "SELECT COALESCE(MAX(phase_number), 0) + 1 FROM phases WHERE plan_id = ?1";
const START_PHASE_SQL: &str =
    "UPDATE phases SET status = ?1, start_date = COALESCE(start_date, ?2) WHERE id = ?3";
const COMPLETE_PHASE_SQL: &str = "UPDATE phases SET status = ?1, start_date = COALESCE(start_date, ?2), completion_date = ?2 WHERE id = ?3";
const REOPEN_PHASE_SQL: &str =
    "UPDATE phases SET status = ?1, completion_date = NULL WHERE id = ?2";

fn build_phase_from_row(row: &rusqlite::Row) -> rusqlite::Result<Phase> {
    Ok(Phase {
        id: row.get::<_, i64>(0)? as u64,
        plan_id: row.get::<_, i64>(1)? as u64,
        phase_number: row.get::<_, i64>(2)? as u32,
        name: row.get(3)?,
        status: parse_column::<PhaseStatus>(row, 4)?,
        start_date: parse_optional_column(row, 5)?,
        completion_date: parse_optional_column(row, 6)?,
        estimated_days: optional_u32(row, 7)?,
        items: Vec::new(),
    })
}

/// Phases of a plan in phase-number order, without items.
pub fn select_phases(conn: &Connection, plan_id: u64) -> Result<Vec<Phase>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {PHASE_COLUMNS} FROM phases WHERE plan_id = ?1 ORDER BY phase_number"
        ))
        .db_context("Failed to prepare query")?;
    let phases = stmt
        .query_map(params![plan_id as i64], build_phase_from_row)
        .db_context("Failed to query phases")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch phases")?;
    Ok(phases)
}

/// A single phase without items.
pub fn select_phase(conn: &Connection, phase_id: u64) -> Result<Option<Phase>> {
    conn.query_row(
        &format!("SELECT {PHASE_COLUMNS} FROM phases WHERE id = ?1"),
        params![phase_id as i64],
        build_phase_from_row,
    )
    .optional()
    .db_context("Failed to query phase")
}

pub fn next_phase_number(conn: &Connection, plan_id: u64) -> Result<u32> {
    let next: i64 = conn
        .query_row(NEXT_PHASE_NUMBER_SQL, params![plan_id as i64], |row| {
            row.get(0)
        })
        .db_context("Failed to get next phase number")?;
    Ok(next as u32)
}

pub fn insert_phase(
    conn: &Connection,
    plan_id: u64,
    phase_number: u32,
    name: &str,
    estimated_days: Option<u32>,
) -> Result<u64> {
    conn.execute(
        INSERT_PHASE_SQL,
        params![
            plan_id as i64,
            phase_number as i64,
            name,
            PhaseStatus::Pending.as_str(),
            estimated_days.map(i64::from)
        ],
    )
    .db_context("Failed to insert phase")?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Moves a phase to IN_PROGRESS, stamping the start date if unset.
pub fn start_phase(conn: &Connection, phase_id: u64, today: Date) -> Result<()> {
    conn.execute(
        START_PHASE_SQL,
        params![
            PhaseStatus::InProgress.as_str(),
            today.to_string(),
            phase_id as i64
        ],
    )
    .db_context("Failed to start phase")?;
    Ok(())
}

pub fn complete_phase(conn: &Connection, phase_id: u64, today: Date) -> Result<()> {
    conn.execute(
        COMPLETE_PHASE_SQL,
        params![
            PhaseStatus::Completed.as_str(),
            today.to_string(),
            phase_id as i64
        ],
    )
    .db_context("Failed to complete phase")?;
    Ok(())
}

/// Returns a completed phase to IN_PROGRESS and clears its completion date.
pub fn reopen_phase(conn: &Connection, phase_id: u64) -> Result<()> {
    conn.execute(
        REOPEN_PHASE_SQL,
        params![PhaseStatus::InProgress.as_str(), phase_id as i64],
    )
    .db_context("Failed to reopen phase")?;
    Ok(())
}
