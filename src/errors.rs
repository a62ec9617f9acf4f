/*!
 * Error types for the mallard application.
 *
 * This module contains custom error types for different parts of the pipeline,
 * using the thiserror crate for ergonomic error definitions.
 */

// Allow dead code - error types are for library consumers
#![allow(dead_code)]

use thiserror::Error;

/// Main pipeline error type covering every failure class the orchestrator
/// can surface. Every variant is propagated unchanged after a log line;
/// nothing is swallowed, downgraded or retried.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Error reaching or opening the warehouse database file
    #[error("Connection error: {0}")]
    Connectivity(String),

    /// Error raised by the database engine while executing a statement
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// Error loading a bronze source file into its table
    #[error("Source file error for table '{table}': {message}")]
    SourceFile {
        /// Target table in the bronze schema
        table: String,
        /// Underlying cause, including the file path
        message: String,
    },

    /// Error executing a silver or gold transform batch
    #[error("Transform batch error in '{script}': {message}")]
    TransformBatch {
        /// Path of the SQL batch file
        script: String,
        /// Underlying cause
        message: String,
    },

    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for PipelineError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for PipelineError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
