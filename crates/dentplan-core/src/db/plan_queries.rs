//! Plan header queries and whole-aggregate loading.

use jiff::{civil::Date, Timestamp};
use rusqlite::{params, Connection, OptionalExtension};

use super::{optional_id, parse_column, parse_optional_column, phase_queries, item_queries};
use crate::{
    error::{DatabaseResultExt, OptionExt, Result},
    models::{ApprovalStatus, CostSnapshot, Plan, PlanFilter, PlanStatus},
};

const PLAN_COLUMNS: &str = "p.id, p.code, p.name, p.patient_id, pt.name, p.doctor_id, p.created_by, a.name, p.template_id, p.status, p.approval_status, p.total_cost, p.discount_amount, p.final_cost, p.start_date, p.expected_end_date, p.approved_by, p.approved_at, p.approval_note, p.created_at, p.updated_at";
const PLAN_JOINS: &str = "FROM plans p LEFT JOIN patients pt ON pt.id = p.patient_id LEFT JOIN actors a ON a.id = p.created_by";
const INSERT_PLAN_SQL: &str = "INSERT INTO plans (code, name, patient_id, doctor_id, created_by, template_id, status, approval_status, total_cost, discount_amount, final_cost, start_date, expected_end_date, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?14)";
const MAX_CODE_SUFFIX_SQL: &str =
    "SELECT MAX(CAST(substr(code, 13) AS INTEGER)) FROM plans WHERE code LIKE ?1";
const UPDATE_LEDGER_SQL: &str = "UPDATE plans SET total_cost = ?1, discount_amount = ?2, final_cost = ?3, updated_at = ?4 WHERE id = ?5";
const UPDATE_STATUS_SQL: &str = "UPDATE plans SET status = ?1, updated_at = ?2 WHERE id = ?3";
const UPDATE_START_DATE_SQL: &str =
    "UPDATE plans SET start_date = COALESCE(start_date, ?1) WHERE id = ?2";
const UPDATE_APPROVAL_STATUS_SQL: &str =
    "UPDATE plans SET approval_status = ?1, updated_at = ?2 WHERE id = ?3";
const UPDATE_DECISION_SQL: &str = "UPDATE plans SET approval_status = ?1, approved_by = ?2, approved_at = ?3, approval_note = ?4, updated_at = ?5 WHERE id = ?6";
const TOUCH_PLAN_SQL: &str = "UPDATE plans SET updated_at = ?1 WHERE id = ?2";

/// Column values for a plan row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewPlanRecord<'a> {
    pub code: &'a str,
    pub name: &'a str,
    pub patient_id: u64,
    pub doctor_id: u64,
    pub created_by: u64,
    pub template_id: Option<u64>,
    pub costs: CostSnapshot,
    pub start_date: Option<Date>,
    pub expected_end_date: Option<Date>,
    pub now: Timestamp,
}

fn build_plan_from_row(row: &rusqlite::Row) -> rusqlite::Result<Plan> {
    Ok(Plan {
        id: row.get::<_, i64>(0)? as u64,
        code: row.get(1)?,
        name: row.get(2)?,
        patient_id: row.get::<_, i64>(3)? as u64,
        patient_name: row.get(4)?,
        doctor_id: row.get::<_, i64>(5)? as u64,
        created_by: row.get::<_, i64>(6)? as u64,
        created_by_name: row.get(7)?,
        template_id: optional_id(row, 8)?,
        status: parse_column::<PlanStatus>(row, 9)?,
        approval_status: parse_column::<ApprovalStatus>(row, 10)?,
        total_cost: parse_column(row, 11)?,
        discount_amount: parse_column(row, 12)?,
        final_cost: parse_column(row, 13)?,
        start_date: parse_optional_column(row, 14)?,
        expected_end_date: parse_optional_column(row, 15)?,
        approved_by: optional_id(row, 16)?,
        approved_at: parse_optional_column(row, 17)?,
        approval_note: row.get(18)?,
        created_at: parse_column(row, 19)?,
        updated_at: parse_column(row, 20)?,
        phases: Vec::new(),
    })
}

/// Plan header without phases.
pub fn select_plan_by_code(conn: &Connection, code: &str) -> Result<Option<Plan>> {
    conn.query_row(
        &format!("SELECT {PLAN_COLUMNS} {PLAN_JOINS} WHERE p.code = ?1"),
        params![code],
        build_plan_from_row,
    )
    .optional()
    .db_context("Failed to query plan")
}

/// Plan header without phases.
pub fn select_plan_by_id(conn: &Connection, id: u64) -> Result<Option<Plan>> {
    conn.query_row(
        &format!("SELECT {PLAN_COLUMNS} {PLAN_JOINS} WHERE p.id = ?1"),
        params![id as i64],
        build_plan_from_row,
    )
    .optional()
    .db_context("Failed to query plan")
}

/// Loads the whole aggregate: header, phases in order, items in order.
pub fn load_plan(conn: &Connection, code: &str) -> Result<Plan> {
    let mut plan = select_plan_by_code(conn, code)?.or_not_found("Plan", code)?;
    attach_phases(conn, &mut plan)?;
    Ok(plan)
}

pub fn load_plan_by_id(conn: &Connection, id: u64) -> Result<Plan> {
    let mut plan = select_plan_by_id(conn, id)?.or_not_found("Plan", id)?;
    attach_phases(conn, &mut plan)?;
    Ok(plan)
}

pub fn attach_phases(conn: &Connection, plan: &mut Plan) -> Result<()> {
    let mut phases = phase_queries::select_phases(conn, plan.id)?;
    for phase in &mut phases {
        phase.items = item_queries::select_items_for_phase(conn, phase.id)?;
    }
    plan.phases = phases;
    Ok(())
}

/// Plan headers matching the filter, newest first.
pub fn select_plans(conn: &Connection, filter: &PlanFilter) -> Result<Vec<Plan>> {
    let mut query = format!("SELECT {PLAN_COLUMNS} {PLAN_JOINS}");

    let mut conditions = Vec::new();
    let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

    if let Some(ref name) = filter.name_contains {
        conditions.push("p.name LIKE ?");
        params_vec.push(Box::new(format!("%{name}%")));
    }

    if let Some(patient_id) = filter.patient_id {
        conditions.push("p.patient_id = ?");
        params_vec.push(Box::new(patient_id as i64));
    }

    if let Some(created_by) = filter.created_by {
        conditions.push("p.created_by = ?");
        params_vec.push(Box::new(created_by as i64));
    }

    if let Some(status) = filter.status {
        conditions.push("p.status = ?");
        params_vec.push(Box::new(status.as_str()));
    }

    if let Some(approval) = filter.approval_status {
        conditions.push("p.approval_status = ?");
        params_vec.push(Box::new(approval.as_str()));
    }

    if let Some(ref after) = filter.created_after {
        conditions.push("p.created_at >= ?");
        params_vec.push(Box::new(after.to_string()));
    }

    if let Some(ref before) = filter.created_before {
        conditions.push("p.created_at <= ?");
        params_vec.push(Box::new(before.to_string()));
    }

    if filter.open_only {
        conditions.push("p.status NOT IN ('COMPLETED', 'CANCELLED')");
    }

    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    query.push_str(" ORDER BY p.created_at DESC, p.id DESC");

    let mut stmt = conn.prepare(&query).db_context("Failed to prepare query")?;
    let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|b| &**b).collect();

    let plans = stmt
        .query_map(&params_refs[..], build_plan_from_row)
        .db_context("Failed to query plans")?
        .collect::<std::result::Result<Vec<_>, _>>()
        .db_context("Failed to fetch plans")?;
    Ok(plans)
}

/// Allocates the next `TP-YYYYMMDD-NNNN` code for `day`.
///
/// Must run inside the creating transaction so the allocation and the insert
/// are atomic.
pub fn next_plan_code(conn: &Connection, day: Date) -> Result<String> {
    let prefix = format!("TP-{}-", day.strftime("%Y%m%d"));
    let last: Option<i64> = conn
        .query_row(MAX_CODE_SUFFIX_SQL, params![format!("{prefix}%")], |row| {
            row.get(0)
        })
        .db_context("Failed to allocate plan code")?;
    Ok(format!("{prefix}{:04}", last.unwrap_or(0) + 1))
}

pub fn insert_plan(conn: &Connection, record: &NewPlanRecord<'_>) -> Result<u64> {
    conn.execute(
        INSERT_PLAN_SQL,
        params![
            record.code,
            record.name,
            record.patient_id as i64,
            record.doctor_id as i64,
            record.created_by as i64,
            record.template_id.map(|id| id as i64),
            PlanStatus::Pending.as_str(),
            ApprovalStatus::Draft.as_str(),
            record.costs.total_cost.to_string(),
            record.costs.discount_amount.to_string(),
            record.costs.final_cost.to_string(),
            record.start_date.map(|d| d.to_string()),
            record.expected_end_date.map(|d| d.to_string()),
            record.now.to_string(),
        ],
    )
    .db_context("Failed to insert plan")?;
    Ok(conn.last_insert_rowid() as u64)
}

/// Persists all three money fields together.
pub fn save_ledger(
    conn: &Connection,
    plan_id: u64,
    costs: &CostSnapshot,
    now: Timestamp,
) -> Result<()> {
    conn.execute(
        UPDATE_LEDGER_SQL,
        params![
            costs.total_cost.to_string(),
            costs.discount_amount.to_string(),
            costs.final_cost.to_string(),
            now.to_string(),
            plan_id as i64
        ],
    )
    .db_context("Failed to update plan costs")?;
    Ok(())
}

pub fn set_plan_status(
    conn: &Connection,
    plan_id: u64,
    status: PlanStatus,
    now: Timestamp,
) -> Result<()> {
    conn.execute(
        UPDATE_STATUS_SQL,
        params![status.as_str(), now.to_string(), plan_id as i64],
    )
    .db_context("Failed to update plan status")?;
    Ok(())
}

/// Sets the start date only when none is recorded yet.
pub fn set_start_date_if_unset(conn: &Connection, plan_id: u64, date: Date) -> Result<()> {
    conn.execute(UPDATE_START_DATE_SQL, params![date.to_string(), plan_id as i64])
        .db_context("Failed to update plan start date")?;
    Ok(())
}

pub fn set_approval_status(
    conn: &Connection,
    plan_id: u64,
    status: ApprovalStatus,
    now: Timestamp,
) -> Result<()> {
    conn.execute(
        UPDATE_APPROVAL_STATUS_SQL,
        params![status.as_str(), now.to_string(), plan_id as i64],
    )
    .db_context("Failed to update approval status")?;
    Ok(())
}

/// Stores the outcome of an approval decision.
pub fn record_decision(
    conn: &Connection,
    plan_id: u64,
    status: ApprovalStatus,
    approved_by: Option<u64>,
    approved_at: Option<Timestamp>,
    note: Option<&str>,
    now: Timestamp,
) -> Result<()> {
    conn.execute(
        UPDATE_DECISION_SQL,
        params![
            status.as_str(),
            approved_by.map(|id| id as i64),
            approved_at.map(|t| t.to_string()),
            note,
            now.to_string(),
            plan_id as i64
        ],
    )
    .db_context("Failed to record approval decision")?;
    Ok(())
}

pub fn touch_plan(conn: &Connection, plan_id: u64, now: Timestamp) -> Result<()> {
    conn.execute(TOUCH_PLAN_SQL, params![now.to_string(), plan_id as i64])
        .db_context("Failed to update plan timestamp")?;
    Ok(())
}
