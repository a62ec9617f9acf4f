/*!
 * Warehouse connection management.
 *
 * This module handles DuckDB database connection creation and provides
 * thread-safe access to the underlying connection handle. Connections are
 * scoped: each pipeline phase opens what it needs and releases it on drop,
 * so no two components ever hold a handle to the warehouse at once.
 */

use anyhow::{Context, Result};
use duckdb::Connection;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Database connection wrapper with thread-safe access
pub struct DatabaseConnection {
    /// Path to the warehouse database file
    db_path: PathBuf,
    /// Thread-safe connection wrapped in Arc<Mutex>
    connection: Arc<Mutex<Connection>>,
}

impl DatabaseConnection {
    /// Open (or create) the warehouse database at the specified path
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let db_path = db_path.as_ref().to_path_buf();

        // Ensure parent directory exists
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create database directory: {:?}", parent)
                })?;
            }
        }

        info!(">> Connecting to database at {:?}", db_path);

        let conn = Connection::open(&db_path)
            .with_context(|| format!("Failed to open database: {:?}", db_path))?;

        Ok(Self {
            db_path,
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Create an in-memory database (for testing)
    pub fn new_in_memory() -> Result<Self> {
        debug!("Creating in-memory database");

        let conn = Connection::open_in_memory().context("Failed to create in-memory database")?;

        Ok(Self {
            db_path: PathBuf::from(":memory:"),
            connection: Arc::new(Mutex::new(conn)),
        })
    }

    /// Get the database file path
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    /// Execute a database operation with the connection
    ///
    /// This method acquires the mutex lock and executes the provided closure
    /// with access to the connection.
    pub fn execute<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self
            .connection
            .lock()
            .map_err(|e| anyhow::anyhow!("Failed to acquire database lock: {}", e))?;

        f(&conn)
    }

    /// Execute a batch of semicolon-separated statements verbatim
    pub fn execute_batch(&self, sql: &str) -> Result<()> {
        self.execute(|conn| {
            conn.execute_batch(sql)?;
            Ok(())
        })
    }

    /// Count the rows of a (possibly schema-qualified) table
    pub fn row_count(&self, table: &str) -> Result<i64> {
        self.execute(|conn| {
            let count: i64 = conn.query_row(
                &format!("SELECT count(*) FROM {}", table),
                [],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Check whether a table exists in the given schema
    pub fn table_exists(&self, schema: &str, table: &str) -> Result<bool> {
        self.execute(|conn| {
            let count: i64 = conn.query_row(
                "SELECT count(*) FROM information_schema.tables
                 WHERE table_schema = ? AND table_name = ?",
                duckdb::params![schema, table],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }
}
