//! Append-only audit log.

use rusqlite::{params, Connection};

use super::parse_column;
use crate::{
    error::{DatabaseResultExt, Result},
    models::{AuditAction, AuditEntity, AuditEntry},
};

const INSERT_ENTRY_SQL: &str = "INSERT INTO audit_log (plan_id, entity, entity_id, action, actor_id, status_before, status_after, note, recorded_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)";
const SELECT_ENTRIES_SQL: &str = "SELECT plan_id, entity, entity_id, action, actor_id, status_before, status_after, note, recorded_at FROM audit_log WHERE plan_id = ?1 ORDER BY id";

pub fn insert_entry(conn: &Connection, entry: &AuditEntry) -> Result<()> {
    conn.execute(
        INSERT_ENTRY_SQL,
        params![
            entry.plan_id as i64,
            entry.entity.as_str(),
            entry.entity_id as i64,
            entry.action.as_str(),
            entry.actor_id as i64,
            entry.status_before,
            entry.status_after,
            entry.note,
            entry.recorded_at.to_string()
        ],
    )
    .db_context("Failed to append audit entry")?;
    Ok(())
}

/// Entries for one plan in insertion order.
pub fn select_entries(conn: &Connection, plan_id: u64) -> Result<Vec<AuditEntry>> {
    let mut stmt = conn
        .prepare(SELECT_ENTRIES_SQL)
        .db_context("Failed to prepare query")?;
    let entries = stmt
        .query_map(params![plan_id as i64], |row| {
            Ok(AuditEntry {
                plan_id: row.get::<_, i64>(0)? as u64,
                entity: parse_column::<AuditEntity>(row, 1)?,
                entity_id: row.get::<_, i64>(2)? as u64,
                action: parse_column::<AuditAction>(row, 3)?,
                actor_id: row.get::<_, i64>(4)? as u64,
                status_before: row.get(5)?,
                status_after: row.get(6)?,
                note: row.get(7)?,
                recorded_at: parse_column(row, 8)?,
            })
        })
        .db_context("Failed to query audit log")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch audit log")?;
    Ok(entries)
}
