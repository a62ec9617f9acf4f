/*!
 * # Mallard
 *
 * A batch ELT loader for a DuckDB warehouse following the medallion
 * (bronze/silver/gold) pattern.
 *
 * ## Features
 *
 * - Idempotent initialization of the bronze, silver and gold schemas
 * - Full-replace CSV ingestion into the bronze layer, with automatic
 *   delimiter and type detection and a `dwh_load_date` ingestion timestamp
 * - Externally authored SQL batches for the silver and gold layers,
 *   executed verbatim against the warehouse
 * - Fail-fast sequential orchestration with per-phase timing
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `database`: Warehouse connection handling and schema management:
 *   - `database::connection`: DuckDB connection wrapper
 *   - `database::schema`: Medallion schema initialization
 * - `bronze_loader`: CSV ingestion into the bronze layer
 * - `transform_runner`: Silver/gold SQL batch execution
 * - `app_controller`: Pipeline orchestration
 * - `file_utils`: File system operations
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod bronze_loader;
pub mod database;
pub mod errors;
pub mod file_utils;
pub mod transform_runner;

// Re-export main types for easier usage
pub use app_config::{Config, SourceTable};
pub use app_controller::{Controller, Phase, RunSummary};
pub use bronze_loader::BronzeLoader;
pub use database::DatabaseConnection;
pub use errors::PipelineError;
pub use transform_runner::TransformRunner;
