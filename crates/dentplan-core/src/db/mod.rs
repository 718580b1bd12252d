//! SQLite storage for plans, catalog data, appointments and audit entries.
//!
//! [`Database`] owns one connection. Query helpers in the submodules are free
//! functions over `&Connection`, so the same helper runs against a plain
//! connection for reads and against a [`Transaction`] inside a unit of work.

use std::{path::Path, str::FromStr, time::Duration};

use rusqlite::{types::Type, Connection, Row, Transaction, TransactionBehavior};

use crate::error::{DatabaseResultExt, Result};

pub mod actor_queries;
pub mod appointment_queries;
pub mod audit_queries;
pub mod catalog_queries;
pub mod item_queries;
pub mod migrations;
pub mod phase_queries;
pub mod plan_queries;

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Database connection and operations handler.
pub struct Database {
    connection: Connection,
}

impl Database {
    /// Creates a new database connection and initializes the schema.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let connection = Connection::open(path).db_context("Failed to open database connection")?;
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .db_context("Failed to set busy timeout")?;

        let db = Self { connection };
        db.initialize_schema()?;
        Ok(db)
    }

    pub(crate) fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Opens a transaction with the given locking behavior.
    pub(crate) fn begin(&mut self, behavior: TransactionBehavior) -> Result<Transaction<'_>> {
        self.connection
            .transaction_with_behavior(behavior)
            .db_context("Failed to begin transaction")
    }
}

/// Parses a TEXT column through `FromStr`.
pub(crate) fn parse_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let raw: String = row.get(idx)?;
    raw.parse::<T>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
}

/// Nullable variant of [`parse_column`].
pub(crate) fn parse_optional_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<T>>
where
    T: FromStr,
    T::Err: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let raw: Option<String> = row.get(idx)?;
    raw.map(|raw| {
        raw.parse::<T>()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, e.into()))
    })
    .transpose()
}

/// Reads a nullable integer ID column.
pub(crate) fn optional_id(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u64>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|id| id as u64))
}

/// Reads a nullable non-negative integer column.
pub(crate) fn optional_u32(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<u32>> {
    Ok(row.get::<_, Option<i64>>(idx)?.map(|value| value as u32))
}
