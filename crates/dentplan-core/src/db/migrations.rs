//! Database schema initialization and migrations.

use crate::error::{DatabaseResultExt, PlannerError, Result};

impl super::Database {
    /// Initializes the database schema using the embedded SQL file.
    pub(super) fn initialize_schema(&self) -> Result<()> {
        self.connection
            .execute("PRAGMA foreign_keys = ON", [])
            .db_context("Failed to enable foreign keys")?;

        // WAL lets collaborator connections read while a unit of work writes
        self.connection
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))
            .db_context("Failed to enable WAL journal")?;

        let schema_sql = include_str!("../../assets/schema.sql");
        self.connection
            .execute_batch(schema_sql)
            .db_context("Failed to initialize database schema")?;

        self.apply_migrations()?;

        Ok(())
    }

    /// Apply database migrations for existing databases
    fn apply_migrations(&self) -> Result<()> {
        let has_expected_end: bool = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM pragma_table_info('plans') WHERE name = 'expected_end_date'",
                [],
                |row| row.get(0),
            )
            .map(|count: i64| count > 0)
            .db_context("Failed to inspect plans table")?;

        if !has_expected_end {
            self.connection
                .execute("ALTER TABLE plans ADD COLUMN expected_end_date TEXT", [])
                .map_err(|e| {
                    PlannerError::database_error(
                        "Failed to add expected_end_date column to plans table",
                        e,
                    )
                })?;
        }

        Ok(())
    }
}
