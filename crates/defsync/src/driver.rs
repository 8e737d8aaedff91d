//! Database drivers: schema introspection and DDL execution.
//!
//! Only SQLite ships in-process; `sqlite_master` stores the original DDL
//! text, which is exactly what the diff engine consumes. Server dialects
//! are introspected by external collaborators and are reported as
//! unsupported here.

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use tracing::debug;

/// Errors from schema drivers.
#[derive(Debug, thiserror::Error)]
pub enum DriverError {
    /// Underlying database failure.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The dialect has no in-process driver.
    #[error("no driver is available for the {0} dialect; only sqlite databases can be opened")]
    UnsupportedDialect(&'static str),
}

/// What the CLI needs from a database: the current schema as DDL text,
/// and a way to run the emitted statements.
pub trait SchemaDriver {
    /// Dumps the current schema as DDL text, one statement per line
    /// group, each terminated with a semicolon.
    async fn export_schema(&mut self) -> Result<String, DriverError>;

    /// Executes the statements in order, stopping at the first failure.
    async fn apply_ddls(&mut self, ddls: &[String]) -> Result<(), DriverError>;
}

/// A driver for SQLite database files.
pub struct SqliteDriver {
    pool: SqlitePool,
}

impl SqliteDriver {
    /// Opens (or creates) the database file at `path`.
    pub async fn connect(path: &str) -> Result<Self, DriverError> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        Ok(Self { pool })
    }
}

impl SchemaDriver for SqliteDriver {
    async fn export_schema(&mut self) -> Result<String, DriverError> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT sql FROM sqlite_master \
             WHERE name NOT LIKE 'sqlite_%' AND sql IS NOT NULL \
             ORDER BY rowid",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(objects = rows.len(), "introspected schema");
        Ok(rows
            .into_iter()
            .map(|(sql,)| format!("{};\n", sql.trim()))
            .collect())
    }

    async fn apply_ddls(&mut self, ddls: &[String]) -> Result<(), DriverError> {
        for ddl in ddls {
            debug!(%ddl, "executing");
            sqlx::query(ddl).execute(&self.pool).await?;
        }
        Ok(())
    }
}
