//! Item queries, including sequence maintenance.

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};
use rust_decimal::Decimal;

use super::{optional_id, optional_u32, parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Item, ItemStatus, PriceOverride},
};

const ITEM_COLUMNS: &str = "i.id, i.phase_id, i.sequence, i.name, i.service_id, i.price, i.estimated_minutes, i.status, i.completed_at, i.assigned_doctor_id, i.notes, i.price_updated_by, i.price_updated_at, i.price_update_reason, i.created_at, i.updated_at";
const INSERT_ITEM_SQL: &str = "INSERT INTO items (phase_id, sequence, name, service_id, price, estimated_minutes, status, notes, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)";
const NEXT_SEQUENCE_SQL: &str =
    "SELECT COALESCE(MAX(sequence), 0) + 1 FROM items WHERE phase_id = ?1";
const SAVE_ITEM_SQL: &str = "UPDATE items SET name = ?1, price = ?2, estimated_minutes = ?3, status = ?4, completed_at = ?5, assigned_doctor_id = ?6, notes = ?7, price_updated_by = ?8, price_updated_at = ?9, price_update_reason = ?10, updated_at = ?11 WHERE id = ?12";
const SET_STATUS_SQL: &str = "UPDATE items SET status = ?1, updated_at = ?2 WHERE id = ?3";
const DELETE_ITEM_SQL: &str = "DELETE FROM items WHERE id = ?1";
const PLAN_FOR_ITEM_SQL: &str =
    "SELECT ph.plan_id FROM items i JOIN phases ph ON ph.id = i.phase_id WHERE i.id = ?1";
// Sequences are UNIQUE per phase, so renumbering parks rows on negative
// values first.
const PARK_AFTER_SQL: &str =
    "UPDATE items SET sequence = -(sequence - 1) WHERE phase_id = ?1 AND sequence > ?2";
const UNPARK_SQL: &str =
    "UPDATE items SET sequence = -sequence WHERE phase_id = ?1 AND sequence < 0";
const PARK_ITEM_SQL: &str = "UPDATE items SET sequence = ?1 WHERE id = ?2";
const SET_SEQUENCE_SQL: &str = "UPDATE items SET sequence = ?1, updated_at = ?2 WHERE id = ?3";

/// Column values for an item row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewItemRecord {
    pub phase_id: u64,
    pub sequence: u32,
    pub name: String,
    pub service_id: Option<u64>,
    pub price: Decimal,
    pub estimated_minutes: Option<u32>,
    pub status: ItemStatus,
    pub notes: Option<String>,
}

fn build_item_from_row(row: &rusqlite::Row) -> rusqlite::Result<Item> {
    let price_override = match optional_id(row, 11)? {
        Some(updated_by) => Some(PriceOverride {
            updated_by,
            updated_at: parse_column(row, 12)?,
            reason: row.get(13)?,
        }),
        None => None,
    };

    Ok(Item {
        id: row.get::<_, i64>(0)? as u64,
        phase_id: row.get::<_, i64>(1)? as u64,
        sequence: row.get::<_, i64>(2)? as u32,
        name: row.get(3)?,
        service_id: optional_id(row, 4)?,
        price: parse_column(row, 5)?,
        estimated_minutes: optional_u32(row, 6)?,
        status: parse_column::<ItemStatus>(row, 7)?,
        completed_at: parse_optional_column(row, 8)?,
        assigned_doctor_id: optional_id(row, 9)?,
        notes: row.get(10)?,
        price_override,
        created_at: parse_column(row, 14)?,
        updated_at: parse_column(row, 15)?,
    })
}

fn query_items(conn: &Connection, sql: &str, id: u64) -> Result<Vec<Item>> {
    let mut stmt = conn.prepare(sql).db_context("Failed to prepare query")?;
    let items = stmt
        .query_map(params![id as i64], build_item_from_row)
        .db_context("Failed to query items")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch items")?;
    Ok(items)
}

/// Items of a phase in sequence order.
pub fn select_items_for_phase(conn: &Connection, phase_id: u64) -> Result<Vec<Item>> {
    query_items(
        conn,
        &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.phase_id = ?1 ORDER BY i.sequence"),
        phase_id,
    )
}

/// Items across every phase of a plan, phase by phase.
pub fn select_items_for_plan(conn: &Connection, plan_id: u64) -> Result<Vec<Item>> {
    query_items(
        conn,
        &format!(
            "SELECT {ITEM_COLUMNS} FROM items i JOIN phases ph ON ph.id = i.phase_id \
             WHERE ph.plan_id = ?1 ORDER BY ph.phase_number, i.sequence"
        ),
        plan_id,
    )
}

pub fn select_item(conn: &Connection, item_id: u64) -> Result<Option<Item>> {
    conn.query_row(
        &format!("SELECT {ITEM_COLUMNS} FROM items i WHERE i.id = ?1"),
        params![item_id as i64],
        build_item_from_row,
    )
    .optional()
    .db_context("Failed to query item")
}

pub fn plan_id_for_item(conn: &Connection, item_id: u64) -> Result<Option<u64>> {
    conn.query_row(PLAN_FOR_ITEM_SQL, params![item_id as i64], |row| {
        row.get::<_, i64>(0)
    })
    .optional()
    .map(|id| id.map(|id| id as u64))
    .db_context("Failed to resolve item plan")
}

pub fn next_sequence(conn: &Connection, phase_id: u64) -> Result<u32> {
    let next: i64 = conn
        .query_row(NEXT_SEQUENCE_SQL, params![phase_id as i64], |row| row.get(0))
        .db_context("Failed to get next item sequence")?;
    Ok(next as u32)
}

pub fn insert_item(conn: &Connection, record: &NewItemRecord, now: Timestamp) -> Result<u64> {
    conn.execute(
        INSERT_ITEM_SQL,
        params![
            record.phase_id as i64,
            record.sequence as i64,
            record.name,
            record.service_id.map(|id| id as i64),
            record.price.to_string(),
            record.estimated_minutes.map(i64::from),
            record.status.as_str(),
            record.notes,
            now.to_string(),
        ],
    )
    .db_context("Failed to insert item")?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Writes every mutable column of `item`.
pub fn save_item(conn: &Connection, item: &Item) -> Result<()> {
    let price_override = item.price_override.as_ref();
    conn.execute(
        SAVE_ITEM_SQL,
        params![
            item.name,
            item.price.to_string(),
            item.estimated_minutes.map(i64::from),
            item.status.as_str(),
            item.completed_at.map(|t| t.to_string()),
            item.assigned_doctor_id.map(|id| id as i64),
            item.notes,
            price_override.map(|o| o.updated_by as i64),
            price_override.map(|o| o.updated_at.to_string()),
            price_override.and_then(|o| o.reason.clone()),
            item.updated_at.to_string(),
            item.id as i64
        ],
    )
    .db_context("Failed to update item")?;
    Ok(())
}

/// Status-only write used by cascade stages.
pub fn set_item_status(
    conn: &Connection,
    item_id: u64,
    status: ItemStatus,
    now: Timestamp,
) -> Result<()> {
    conn.execute(
        SET_STATUS_SQL,
        params![status.as_str(), now.to_string(), item_id as i64],
    )
    .db_context("Failed to update item status")?;
    Ok(())
}

/// Removes an item and closes the gap it leaves in its phase's sequence.
pub fn delete_item(conn: &Connection, item: &Item) -> Result<()> {
    conn.execute(DELETE_ITEM_SQL, params![item.id as i64])
        .db_context("Failed to delete item")?;
    conn.execute(
        PARK_AFTER_SQL,
        params![item.phase_id as i64, item.sequence as i64],
    )
    .db_context("Failed to compact item sequences")?;
    conn.execute(UNPARK_SQL, params![item.phase_id as i64])
        .db_context("Failed to compact item sequences")?;
    Ok(())
}

/// Renumbers the given items 1..N in the order supplied.
///
/// The caller guarantees `ordered_ids` is exactly the phase's item set.
pub fn assign_sequences(
    conn: &Connection,
    ordered_ids: &[u64],
    now: Timestamp,
) -> Result<()> {
    for (index, id) in ordered_ids.iter().enumerate() {
        conn.execute(PARK_ITEM_SQL, params![-(index as i64) - 1, *id as i64])
            .db_context("Failed to park item sequence")?;
    }
    let now = now.to_string();
    for (index, id) in ordered_ids.iter().enumerate() {
        conn.execute(SET_SEQUENCE_SQL, params![index as i64 + 1, &now, *id as i64])
            .db_context("Failed to assign item sequence")?;
    }
    Ok(())
}
