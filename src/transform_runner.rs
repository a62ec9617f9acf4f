/*!
 * Silver/gold transform runner.
 *
 * Executes an externally maintained SQL batch file against an open warehouse
 * connection. The runner is a pure pass-through executor: it does not
 * interpret the statements, wrap them in a transaction, or roll anything
 * back beyond what the engine's per-statement semantics provide. The same
 * shape serves both the silver and gold phases; only the script path and
 * display label differ.
 */

use anyhow::Result;
use log::debug;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::database::DatabaseConnection;
use crate::errors::PipelineError;
use crate::file_utils::FileManager;

/// Executor for one externally authored SQL batch
pub struct TransformRunner {
    // @field: Display label for log lines ("silver", "gold")
    layer: String,
    // @field: Path of the SQL batch file
    script_path: PathBuf,
}

impl TransformRunner {
    // @param layer: Display label for the target layer
    // @param script_path: SQL batch file to execute
    pub fn new(layer: impl Into<String>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            layer: layer.into(),
            script_path: script_path.into(),
        }
    }

    /// Execute the whole batch against the given connection.
    ///
    /// Returns the elapsed wall-clock time on success. Any failure is
    /// surfaced unchanged, wrapped only with the script path for context.
    pub fn run(&self, db: &DatabaseConnection) -> Result<Duration> {
        let start = Instant::now();

        let sql = FileManager::read_to_string(&self.script_path).map_err(|e| {
            anyhow::Error::from(PipelineError::TransformBatch {
                script: self.script_path.display().to_string(),
                message: e.to_string(),
            })
        })?;

        debug!(
            "Executing {} transform batch from {:?} ({} bytes)",
            self.layer,
            self.script_path,
            sql.len()
        );

        db.execute(|conn| {
            conn.execute_batch(&sql).map_err(|e| {
                PipelineError::TransformBatch {
                    script: self.script_path.display().to_string(),
                    message: e.to_string(),
                }
                .into()
            })
        })?;

        let elapsed = start.elapsed();
        debug!(
            "{} transform batch finished in {:.2}s",
            self.layer,
            elapsed.as_secs_f64()
        );
        Ok(elapsed)
    }

    /// Display label of the target layer
    pub fn layer(&self) -> &str {
        &self.layer
    }
}
