/*!
 * Database module for the embedded DuckDB warehouse.
 *
 * This module provides:
 * - A thread-safe connection wrapper around a warehouse database file
 * - Idempotent creation of the medallion layer schemas
 */

pub mod connection;
pub mod schema;

// Re-export main types
pub use connection::DatabaseConnection;
