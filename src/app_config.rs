use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::default::Default;
use std::path::PathBuf;

/// Application configuration module
/// This module handles the pipeline configuration including loading,
/// validating and saving configuration settings.
/// Represents the pipeline configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    /// Path to the DuckDB warehouse database file
    #[serde(default = "default_database_path")]
    pub database_path: PathBuf,

    /// Bronze source tables, loaded in declaration order
    #[serde(default = "default_bronze_sources")]
    pub bronze_sources: Vec<SourceTable>,

    /// SQL batch applied to build the silver layer
    #[serde(default = "default_silver_script")]
    pub silver_script: PathBuf,

    /// SQL batch applied to build the gold layer
    #[serde(default = "default_gold_script")]
    pub gold_script: PathBuf,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// A (table name, source file) descriptor for one bronze table
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SourceTable {
    // @field: Target table name inside the bronze schema
    pub table: String,

    // @field: Source CSV file path
    pub path: PathBuf,
}

impl SourceTable {
    // @param table: Bronze table name
    // @param path: CSV file the table is replaced from
    pub fn new(table: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            table: table.into(),
            path: path.into(),
        }
    }
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    // @level: Errors only
    Error,
    // @level: Errors and warnings
    Warn,
    // @level: Normal progress output
    #[default]
    Info,
    // @level: Verbose diagnostics
    Debug,
    // @level: Everything
    Trace,
}

fn default_database_path() -> PathBuf {
    PathBuf::from("data/warehouse.duckdb")
}

fn default_silver_script() -> PathBuf {
    PathBuf::from("scripts/silver/load_silver.sql")
}

fn default_gold_script() -> PathBuf {
    PathBuf::from("scripts/gold/load_gold.sql")
}

fn default_bronze_sources() -> Vec<SourceTable> {
    vec![
        SourceTable::new("crm_cust_info", "datasets/source_crm/cust_info.csv"),
        SourceTable::new("crm_prd_info", "datasets/source_crm/prd_info.csv"),
        SourceTable::new("crm_sales_details", "datasets/source_crm/sales_details.csv"),
        SourceTable::new("erp_cust_az12", "datasets/source_erp/CUST_AZ12.csv"),
        SourceTable::new("erp_loc_a101", "datasets/source_erp/LOC_A101.csv"),
        SourceTable::new("erp_px_cat_g1v2", "datasets/source_erp/PX_CAT_G1V2.csv"),
    ]
}

/// Table names end up interpolated into DDL, so they must be plain
/// SQL identifiers.
static IDENTIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("invalid identifier regex"));

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            bronze_sources: default_bronze_sources(),
            silver_script: default_silver_script(),
            gold_script: default_gold_script(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Validate the configuration after loading and CLI overrides
    pub fn validate(&self) -> Result<()> {
        if self.database_path.as_os_str().is_empty() {
            return Err(anyhow!("Database path must not be empty"));
        }

        if self.bronze_sources.is_empty() {
            return Err(anyhow!("At least one bronze source table must be configured"));
        }

        let mut seen = HashSet::new();
        for source in &self.bronze_sources {
            if !IDENTIFIER_RE.is_match(&source.table) {
                return Err(anyhow!(
                    "Invalid bronze table name: '{}' (expected a plain SQL identifier)",
                    source.table
                ));
            }

            if source.path.as_os_str().is_empty() {
                return Err(anyhow!(
                    "Source file path for table '{}' must not be empty",
                    source.table
                ));
            }

            if !seen.insert(source.table.clone()) {
                return Err(anyhow!("Duplicate bronze table name: '{}'", source.table));
            }
        }

        if self.silver_script.as_os_str().is_empty() || self.gold_script.as_os_str().is_empty() {
            return Err(anyhow!("Transform script paths must not be empty"));
        }

        Ok(())
    }
}
