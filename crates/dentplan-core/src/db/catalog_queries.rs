//! Catalog services, service prerequisites and treatment templates.

use std::collections::HashSet;

use jiff::Timestamp;
use rusqlite::{params, Connection, OptionalExtension};

use super::{optional_u32, parse_column, parse_optional_column};
use crate::{
    error::{DatabaseResultExt, Result},
    models::{Service, Template, TemplateItem, TemplatePhase},
    params::{RegisterService, RegisterTemplate},
};

const SERVICE_COLUMNS: &str = "id, code, name, price, specialization, estimated_minutes, active";
const INSERT_SERVICE_SQL: &str = "INSERT INTO services (code, name, price, specialization, estimated_minutes) VALUES (?1, ?2, ?3, ?4, ?5)";
const INSERT_PREREQUISITE_SQL: &str =
    "INSERT OR IGNORE INTO service_prerequisites (service_id, prerequisite_id) VALUES (?1, ?2)";
const HAS_PREREQUISITES_SQL: &str =
    "SELECT EXISTS(SELECT 1 FROM service_prerequisites WHERE service_id = ?1)";
const UNLOCKED_BY_SQL: &str =
    "SELECT service_id FROM service_prerequisites WHERE prerequisite_id = ?1";
const TEMPLATE_COLUMNS: &str = "id, code, name, specialization, active";
const INSERT_TEMPLATE_SQL: &str =
    "INSERT INTO templates (code, name, specialization, created_at) VALUES (?1, ?2, ?3, ?4)";
const INSERT_TEMPLATE_PHASE_SQL: &str = "INSERT INTO template_phases (template_id, phase_number, name, estimated_days) VALUES (?1, ?2, ?3, ?4)";
const INSERT_TEMPLATE_ITEM_SQL: &str = "INSERT INTO template_items (template_phase_id, position, service_id, quantity, price) VALUES (?1, ?2, ?3, ?4, ?5)";
const SELECT_TEMPLATE_IDS_SQL: &str = "SELECT id FROM templates ORDER BY code";
const SELECT_TEMPLATE_PHASES_SQL: &str = "SELECT id, phase_number, name, estimated_days FROM template_phases WHERE template_id = ?1 ORDER BY phase_number";
const SELECT_TEMPLATE_ITEMS_SQL: &str = "SELECT service_id, quantity, price FROM template_items WHERE template_phase_id = ?1 ORDER BY position";

fn build_service_from_row(row: &rusqlite::Row) -> rusqlite::Result<Service> {
    Ok(Service {
        id: row.get::<_, i64>(0)? as u64,
        code: row.get(1)?,
        name: row.get(2)?,
        price: parse_column(row, 3)?,
        specialization: row.get(4)?,
        estimated_minutes: optional_u32(row, 5)?,
        active: row.get(6)?,
    })
}

pub fn select_service(conn: &Connection, service_id: u64) -> Result<Option<Service>> {
    conn.query_row(
        &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE id = ?1"),
        params![service_id as i64],
        build_service_from_row,
    )
    .optional()
    .db_context("Failed to query service")
}

pub fn select_service_by_code(conn: &Connection, code: &str) -> Result<Option<Service>> {
    conn.query_row(
        &format!("SELECT {SERVICE_COLUMNS} FROM services WHERE code = ?1 COLLATE NOCASE"),
        params![code],
        build_service_from_row,
    )
    .optional()
    .db_context("Failed to query service")
}

pub fn select_services(conn: &Connection) -> Result<Vec<Service>> {
    let mut stmt = conn
        .prepare(&format!("SELECT {SERVICE_COLUMNS} FROM services ORDER BY code"))
        .db_context("Failed to prepare query")?;
    let services = stmt
        .query_map([], build_service_from_row)
        .db_context("Failed to query services")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch services")?;
    Ok(services)
}

pub fn insert_service(conn: &Connection, params: &RegisterService) -> Result<Service> {
    conn.execute(
        INSERT_SERVICE_SQL,
        params![
            params.code,
            params.name,
            params.price.to_string(),
            params.specialization,
            params.estimated_minutes.map(i64::from)
        ],
    )
    .db_context("Failed to insert service")?;

    Ok(Service {
        id: conn.last_insert_rowid() as u64,
        code: params.code.clone(),
        name: params.name.clone(),
        price: params.price,
        specialization: params.specialization.clone(),
        estimated_minutes: params.estimated_minutes,
        active: true,
    })
}

pub fn insert_prerequisite(conn: &Connection, service_id: u64, prerequisite_id: u64) -> Result<()> {
    conn.execute(
        INSERT_PREREQUISITE_SQL,
        params![service_id as i64, prerequisite_id as i64],
    )
    .db_context("Failed to insert prerequisite")?;
    Ok(())
}

pub fn has_prerequisites(conn: &Connection, service_id: u64) -> Result<bool> {
    conn.query_row(HAS_PREREQUISITES_SQL, params![service_id as i64], |row| {
        row.get(0)
    })
    .db_context("Failed to check prerequisites")
}

/// Services that list `service_id` as one of their prerequisites.
pub fn services_unlocked_by(conn: &Connection, service_id: u64) -> Result<HashSet<u64>> {
    let mut stmt = conn
        .prepare(UNLOCKED_BY_SQL)
        .db_context("Failed to prepare query")?;
    let unlocked = stmt
        .query_map(params![service_id as i64], |row| {
            Ok(row.get::<_, i64>(0)? as u64)
        })
        .db_context("Failed to query unlocked services")?
        .collect::<std::result::Result<HashSet<_>, _>>()
        .db_context("Failed to fetch unlocked services")?;
    Ok(unlocked)
}

/// Loads a template with its phases and items.
pub fn select_template(conn: &Connection, template_id: u64) -> Result<Option<Template>> {
    let template = conn
        .query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM templates WHERE id = ?1"),
            params![template_id as i64],
            |row| {
                Ok(Template {
                    id: row.get::<_, i64>(0)? as u64,
                    code: row.get(1)?,
                    name: row.get(2)?,
                    specialization: row.get(3)?,
                    active: row.get(4)?,
                    phases: Vec::new(),
                })
            },
        )
        .optional()
        .db_context("Failed to query template")?;

    let Some(mut template) = template else {
        return Ok(None);
    };

    let mut phase_stmt = conn
        .prepare(SELECT_TEMPLATE_PHASES_SQL)
        .db_context("Failed to prepare query")?;
    let phases = phase_stmt
        .query_map(params![template_id as i64], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                TemplatePhase {
                    phase_number: row.get::<_, i64>(1)? as u32,
                    name: row.get(2)?,
                    estimated_days: optional_u32(row, 3)?,
                    items: Vec::new(),
                },
            ))
        })
        .db_context("Failed to query template phases")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch template phases")?;

    let mut item_stmt = conn
        .prepare(SELECT_TEMPLATE_ITEMS_SQL)
        .db_context("Failed to prepare query")?;
    for (phase_id, mut phase) in phases {
        phase.items = item_stmt
            .query_map(params![phase_id], |row| {
                Ok(TemplateItem {
                    service_id: row.get::<_, i64>(0)? as u64,
                    quantity: row.get::<_, i64>(1)? as u32,
                    price: parse_optional_column(row, 2)?,
                })
            })
            .db_context("Failed to query template items")?
            .collect::<std::result::Result<Vec<_>, _>>()
            .db_context("Failed to fetch template items")?;
        template.phases.push(phase);
    }

    Ok(Some(template))
}

/// Every template with its phases, ordered by code.
pub fn select_templates(conn: &Connection) -> Result<Vec<Template>> {
    let mut stmt = conn
        .prepare(SELECT_TEMPLATE_IDS_SQL)
        .db_context("Failed to prepare query")?;
    let ids = stmt
        .query_map([], |row| Ok(row.get::<_, i64>(0)? as u64))
        .db_context("Failed to query templates")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch templates")?;

    let mut templates = Vec::with_capacity(ids.len());
    for id in ids {
        if let Some(template) = select_template(conn, id)? {
            templates.push(template);
        }
    }
    Ok(templates)
}

/// Inserts a template tree; phases are numbered in the order given.
pub fn insert_template(conn: &Connection, params: &RegisterTemplate, now: Timestamp) -> Result<u64> {
    conn.execute(
        INSERT_TEMPLATE_SQL,
        params![params.code, params.name, params.specialization, now.to_string()],
    )
    .db_context("Failed to insert template")?;
    let template_id = conn.last_insert_rowid();

    for (phase_index, phase) in params.phases.iter().enumerate() {
        conn.execute(
            INSERT_TEMPLATE_PHASE_SQL,
            params![
                template_id,
                phase_index as i64 + 1,
                phase.name,
                phase.estimated_days.map(i64::from)
            ],
        )
        .db_context("Failed to insert template phase")?;
        let phase_id = conn.last_insert_rowid();

        for (position, item) in phase.items.iter().enumerate() {
            conn.execute(
                INSERT_TEMPLATE_ITEM_SQL,
                params![
                    phase_id,
                    position as i64 + 1,
                    item.service_id as i64,
                    item.quantity as i64,
                    item.price.map(|p| p.to_string())
                ],
            )
            .db_context("Failed to insert template item")?;
        }
    }

    Ok(template_id as u64)
}
