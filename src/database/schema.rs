/*!
 * Warehouse schema management.
 *
 * Creates the three medallion layer schemas: bronze (raw), silver (cleaned)
 * and gold (aggregated). Initialization is idempotent and safe to re-run;
 * schemas are created only if they do not already exist.
 */

use anyhow::{Context, Result};
use duckdb::Connection;
use log::{debug, info};

/// Medallion layer schemas, in load order
pub const LAYER_SCHEMAS: [&str; 3] = ["bronze", "silver", "gold"];

/// Create the bronze, silver and gold schemas if they do not already exist
pub fn initialize_schema(conn: &Connection) -> Result<()> {
    debug!(">> Creating schemas...");

    for schema in LAYER_SCHEMAS {
        conn.execute(&format!("CREATE SCHEMA IF NOT EXISTS {}", schema), [])
            .with_context(|| format!("Failed to create schema '{}'", schema))?;
    }

    info!(">> Database initialized successfully.");
    info!(">> Schemas: {}", LAYER_SCHEMAS.join(", "));
    Ok(())
}

/// Check whether a schema exists in the warehouse
pub fn schema_exists(conn: &Connection, name: &str) -> Result<bool> {
    let count: i64 = conn
        .query_row(
            "SELECT count(*) FROM information_schema.schemata WHERE schema_name = ?",
            duckdb::params![name],
            |row| row.get(0),
        )
        .context("Failed to query information_schema.schemata")?;

    Ok(count > 0)
}
