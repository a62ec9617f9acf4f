/*!
 * Bronze layer loader.
 *
 * Loads raw CSV extracts into the bronze schema as-is. Each table is fully
 * replaced on every run (CREATE OR REPLACE TABLE), so a run is a snapshot of
 * the current source files, never an accumulation. A `dwh_load_date` column
 * tracking ingestion time is appended to every table. Column names, types
 * and the field delimiter come from DuckDB's CSV auto-detection; the loader
 * imposes no manual schema.
 */

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use std::time::Instant;

use crate::app_config::SourceTable;
use crate::database::DatabaseConnection;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;

/// Loader that replaces the configured bronze tables from their CSV sources
pub struct BronzeLoader {
    // @field: Ordered source descriptors
    tables: Vec<SourceTable>,
}

impl BronzeLoader {
    // @param tables: Source descriptors, processed in order
    pub fn new(tables: Vec<SourceTable>) -> Self {
        Self { tables }
    }

    /// Load every configured source file into the bronze schema, in order.
    ///
    /// Processing is strictly sequential. The first failure aborts the
    /// remaining tables and is propagated to the caller; tables replaced
    /// before the failure keep their fresh contents.
    pub fn load(&self, db: &DatabaseConnection) -> Result<()> {
        info!("====================");
        info!(">> Loading CSV files into bronze schema...");

        let total_start = Instant::now();

        let progress = ProgressBar::new(self.tables.len() as u64);
        progress.set_style(
            ProgressStyle::with_template("{bar:30.cyan/blue} {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );

        for source in &self.tables {
            let table_start = Instant::now();
            progress.set_message(source.table.clone());
            debug!(">> Loading {}...", source.table);

            if let Err(e) = self.load_table(db, source) {
                progress.abandon();
                return Err(e);
            }

            info!(
                "   >> {} loaded. ({:.2}s)",
                source.table,
                table_start.elapsed().as_secs_f64()
            );
            progress.inc(1);
        }

        progress.finish_and_clear();

        info!(">> Data loaded into bronze schema.");
        info!(
            ">> Total bronze load duration: {:.2}s",
            total_start.elapsed().as_secs_f64()
        );
        info!("====================");
        Ok(())
    }

    /// Fully replace one bronze table from its source file
    fn load_table(&self, db: &DatabaseConnection, source: &SourceTable) -> Result<()> {
        if !FileManager::file_exists(&source.path) {
            return Err(PipelineError::SourceFile {
                table: source.table.clone(),
                message: format!("source file not found: {}", source.path.display()),
            }
            .into());
        }

        let sql = format!(
            "CREATE OR REPLACE TABLE bronze.{} AS \
             SELECT *, CURRENT_TIMESTAMP AS dwh_load_date \
             FROM read_csv('{}', AUTO_DETECT = TRUE)",
            source.table,
            sql_string_literal(&source.path.to_string_lossy())
        );

        db.execute(|conn| {
            conn.execute(&sql, []).map_err(|e| {
                PipelineError::SourceFile {
                    table: source.table.clone(),
                    message: format!("{} ({})", e, source.path.display()),
                }
                .into()
            })
        })?;

        Ok(())
    }
}

/// Escape a value for inclusion in a single-quoted SQL literal
fn sql_string_literal(value: &str) -> String {
    value.replace('\'', "''")
}
