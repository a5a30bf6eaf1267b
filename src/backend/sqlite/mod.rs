//! `SQLite` Backend Implementation
//!
//! Implements the [`Backend`] trait on `rusqlite`.
//!
//! # Implementation Notes
//! - One connection is held for the lifetime of the interactive session
//!   (single logical thread of control, one pending operation at a time)
//! - Every statement is prepared with `?` placeholders and bound from the
//!   accompanying parameter list; no value ever reaches the SQL text
//! - Column values are rendered to display strings at this boundary:
//!   NULL becomes the empty string, BLOB is Base64-encoded for display
//! - The marketplace schema ships embedded and is applied idempotently

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags, ToSql};
use std::path::Path;
use tracing::debug;

use crate::backend::{Backend, QueryRows};
use crate::error::{BazaarError, Result};
use crate::query::{SqlValue, Statement};

/// Marketplace schema DDL, applied by [`SqliteBackend::ensure_schema`]
const SCHEMA_SQL: &str = include_str!("../schema.sql");

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<rusqlite::types::ToSqlOutput<'_>> {
        match self {
            Self::Int(i) => i.to_sql(),
            Self::Real(r) => r.to_sql(),
            Self::Text(t) => t.to_sql(),
        }
    }
}

/// `SQLite` backend holding the session's database connection
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    /// Open (or create) a database file
    pub fn open(path: &Path) -> Result<Self> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_CREATE;
        let conn = Connection::open_with_flags(path, flags).map_err(|e| {
            BazaarError::backend(format!("failed to open database {}: {e}", path.display()))
        })?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Open a private in-memory database (test fixtures)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| BazaarError::backend(format!("failed to open in-memory database: {e}")))?;
        Self::configure(&conn)?;
        Ok(Self { conn })
    }

    /// Connection-level settings; foreign keys are off by default in SQLite
    fn configure(conn: &Connection) -> Result<()> {
        conn.pragma_update(None, "foreign_keys", true)
            .map_err(|e| BazaarError::backend(format!("failed to enable foreign keys: {e}")))
    }

    /// Apply the embedded marketplace schema (idempotent)
    pub fn ensure_schema(&self) -> Result<()> {
        self.conn
            .execute_batch(SCHEMA_SQL)
            .map_err(|e| BazaarError::backend(format!("failed to apply schema: {e}")))
    }

    /// Run raw DDL/DML, bypassing the statement layer. Test fixtures only;
    /// operation handlers always go through [`Statement`].
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.conn
            .execute_batch(sql)
            .map_err(|e| BazaarError::backend(format!("batch execution failed: {e}")))
    }
}

impl Backend for SqliteBackend {
    fn query(&self, stmt: &Statement) -> Result<QueryRows> {
        debug!(sql = %stmt.sql, params = stmt.params.len(), "query");

        let mut prepared = self
            .conn
            .prepare(&stmt.sql)
            .map_err(|e| BazaarError::backend(format!("failed to prepare query: {e}")))?;

        let columns: Vec<String> =
            prepared.column_names().iter().map(|s| (*s).to_string()).collect();
        let width = columns.len();

        let mut rows = prepared
            .query(rusqlite::params_from_iter(stmt.params.iter()))
            .map_err(|e| BazaarError::backend(format!("failed to execute query: {e}")))?;

        let mut materialized = Vec::new();
        while let Some(row) = rows
            .next()
            .map_err(|e| BazaarError::backend(format!("failed to fetch row: {e}")))?
        {
            let mut record = Vec::with_capacity(width);
            for idx in 0..width {
                let value = row
                    .get_ref(idx)
                    .map_err(|e| BazaarError::backend(format!("failed to read column: {e}")))?;
                record.push(render_value(value)?);
            }
            materialized.push(record);
        }

        Ok(QueryRows { columns, rows: materialized })
    }

    fn execute(&self, stmt: &Statement) -> Result<u64> {
        debug!(sql = %stmt.sql, params = stmt.params.len(), "execute");

        let affected = self
            .conn
            .execute(&stmt.sql, rusqlite::params_from_iter(stmt.params.iter()))
            .map_err(|e| BazaarError::backend(format!("failed to execute statement: {e}")))?;

        Ok(affected as u64)
    }
}

/// Render a column value to its display string
fn render_value(value: ValueRef<'_>) -> Result<String> {
    Ok(match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(r) => r.to_string(),
        ValueRef::Text(t) => std::str::from_utf8(t)
            .map_err(|e| BazaarError::backend(format!("non-UTF-8 text column: {e}")))?
            .to_string(),
        ValueRef::Blob(b) => {
            use base64::Engine;
            base64::engine::general_purpose::STANDARD.encode(b)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn fixture() -> SqliteBackend {
        let backend = SqliteBackend::open_in_memory().expect("open in-memory database");
        backend.ensure_schema().expect("apply schema");
        backend
    }

    #[test]
    fn test_schema_is_idempotent() {
        let backend = fixture();
        backend.ensure_schema().expect("second application succeeds");
    }

    #[test]
    fn test_parameter_binding_round_trip() {
        let backend = fixture();
        backend
            .execute(&Statement::new(
                "INSERT INTO Users (name, password, latitude, longitude, type) \
                 VALUES (?, ?, ?, ?, ?)",
                vec![
                    SqlValue::from("alice"),
                    SqlValue::from("secret"),
                    SqlValue::Real(10.5),
                    SqlValue::Real(20.0),
                    SqlValue::from("customer"),
                ],
            ))
            .expect("insert");

        let result = backend
            .query(&Statement::new(
                "SELECT name, latitude FROM Users WHERE name = ?",
                vec![SqlValue::from("alice")],
            ))
            .expect("select");

        assert_eq!(result.columns, vec!["name".to_string(), "latitude".to_string()]);
        assert_eq!(result.rows, vec![vec!["alice".to_string(), "10.5".to_string()]]);
    }

    #[test]
    fn test_values_never_spliced_into_sql() {
        // a would-be injection payload is just an ordinary text value
        let backend = fixture();
        backend
            .execute(&Statement::new(
                "INSERT INTO Users (name, password, latitude, longitude) VALUES (?, ?, 0, 0)",
                vec![SqlValue::from("x'; DROP TABLE Users; --"), SqlValue::from("pw")],
            ))
            .expect("insert");

        let count = backend
            .query_one(&Statement::new("SELECT COUNT(*) FROM Users", vec![]))
            .expect("count");
        assert_eq!(count.as_deref(), Some("1"));
    }

    #[test]
    fn test_null_renders_as_empty_string() {
        let backend = fixture();
        backend
            .execute_batch(
                "INSERT INTO Users (userID, name, password, latitude, longitude, type)
                 VALUES (1, 'meg', 'pw', 0, 0, 'manager');
                 INSERT INTO Store (storeID, latitude, longitude, managerID, dateEstablished)
                 VALUES (1, 0, 0, 1, NULL);",
            )
            .expect("insert");

        let result = backend
            .query(&Statement::new("SELECT dateEstablished FROM Store", vec![]))
            .expect("select");
        assert_eq!(result.rows[0][0], "");
    }

    #[test]
    fn test_execute_reports_affected_rows() {
        let backend = fixture();
        for id in 1..=3 {
            backend
                .execute(&Statement::new(
                    "INSERT INTO Warehouse (WarehouseID, area, latitude, longitude) \
                     VALUES (?, 100, 0, 0)",
                    vec![SqlValue::Int(id)],
                ))
                .expect("insert");
        }

        let affected = backend
            .execute(&Statement::new(
                "DELETE FROM Warehouse WHERE WarehouseID >= ?",
                vec![SqlValue::Int(2)],
            ))
            .expect("delete");
        assert_eq!(affected, 2);
    }

    #[test]
    fn test_query_one_empty_result() {
        let backend = fixture();
        let value = backend
            .query_one(&Statement::new(
                "SELECT name FROM Users WHERE userID = ?",
                vec![SqlValue::Int(42)],
            ))
            .expect("query");
        assert_eq!(value, None);
    }
}
