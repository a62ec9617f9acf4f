use anyhow::Result;
use log::{error, info};
use std::fmt;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::bronze_loader::BronzeLoader;
use crate::database::{schema, DatabaseConnection};
use crate::transform_runner::TransformRunner;

// @module: Pipeline controller for warehouse loads

/// Pipeline phases, in execution order.
///
/// The pipeline is a linear state machine: every phase transitions to the
/// next on success and to a terminal failure on any error, with no retry
/// and no skip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Init,
    Bronze,
    Silver,
    Gold,
}

impl Phase {
    // @returns: Lowercase phase name
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Bronze => "bronze",
            Self::Silver => "silver",
            Self::Gold => "gold",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Timing summary of one pipeline run. Exists only for the duration of one
/// process invocation; never persisted.
#[derive(Debug, Clone, Default)]
pub struct RunSummary {
    /// Bronze load duration
    pub bronze: Duration,
    /// Silver transform duration
    pub silver: Duration,
    /// Gold transform duration
    pub gold: Duration,
    /// Total pipeline duration
    pub total: Duration,
}

/// Main application controller for pipeline runs
pub struct Controller {
    // @field: Pipeline configuration
    config: Config,
}

impl Controller {
    // @method: Create a new controller with the given configuration
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(Self { config })
    }

    /// Access the active configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run the full pipeline: init -> bronze -> silver -> gold.
    ///
    /// Phases run strictly in order; the first failure terminates the run
    /// and is propagated to the caller after a logged error line naming the
    /// phase. The connection opened for the silver/gold phases is released
    /// on every exit path.
    pub fn run_pipeline(&self) -> Result<RunSummary> {
        info!("====================");
        info!(">> Starting pipeline...");
        info!("====================");

        let start = Instant::now();
        let mut summary = RunSummary::default();

        self.run_phase(Phase::Init, || self.init_database())?;

        info!(">> [1/3] Loading bronze layer...");
        summary.bronze = self.run_phase(Phase::Bronze, || self.load_bronze())?;
        info!(
            ">> [1/3] Bronze layer complete. ({:.2}s)",
            summary.bronze.as_secs_f64()
        );

        // One scoped connection serves both transform phases; leaving this
        // block drops it whether the phases succeed or fail.
        {
            let db = match DatabaseConnection::new(&self.config.database_path) {
                Ok(db) => db,
                Err(e) => {
                    error!(">> ERROR: {:#}", e);
                    return Err(e);
                }
            };

            info!(">> [2/3] Loading silver layer...");
            summary.silver = self.run_phase(Phase::Silver, || {
                TransformRunner::new("silver", &self.config.silver_script)
                    .run(&db)
                    .map(|_| ())
            })?;
            info!(
                ">> [2/3] Silver layer complete. ({:.2}s)",
                summary.silver.as_secs_f64()
            );

            info!(">> [3/3] Loading gold layer...");
            summary.gold = self.run_phase(Phase::Gold, || {
                TransformRunner::new("gold", &self.config.gold_script)
                    .run(&db)
                    .map(|_| ())
            })?;
            info!(
                ">> [3/3] Gold layer complete. ({:.2}s)",
                summary.gold.as_secs_f64()
            );
        }

        summary.total = start.elapsed();
        info!("====================");
        info!(
            ">> Pipeline End.  Total: ({:.2}s)",
            summary.total.as_secs_f64()
        );
        info!("====================");
        Ok(summary)
    }

    /// Initialize the warehouse schemas only
    pub fn run_init(&self) -> Result<()> {
        self.run_phase(Phase::Init, || self.init_database())
            .map(|_| ())
    }

    /// Load the bronze layer only
    pub fn run_bronze(&self) -> Result<()> {
        self.run_phase(Phase::Bronze, || self.load_bronze())
            .map(|_| ())
    }

    /// Apply the silver transform batch only
    pub fn run_silver(&self) -> Result<()> {
        let db = DatabaseConnection::new(&self.config.database_path)?;
        info!(">> Loading silver layer...");
        let elapsed = self.run_phase(Phase::Silver, || {
            TransformRunner::new("silver", &self.config.silver_script)
                .run(&db)
                .map(|_| ())
        })?;
        info!(">> Silver layer complete. ({:.2}s)", elapsed.as_secs_f64());
        Ok(())
    }

    /// Apply the gold transform batch only
    pub fn run_gold(&self) -> Result<()> {
        let db = DatabaseConnection::new(&self.config.database_path)?;
        info!(">> Loading gold layer...");
        let elapsed = self.run_phase(Phase::Gold, || {
            TransformRunner::new("gold", &self.config.gold_script)
                .run(&db)
                .map(|_| ())
        })?;
        info!(">> Gold layer complete. ({:.2}s)", elapsed.as_secs_f64());
        Ok(())
    }

    /// Log-then-propagate wrapper applied at every phase boundary.
    ///
    /// Returns the phase's elapsed wall-clock time on success. On failure
    /// the originating error escapes unmodified apart from added phase
    /// context; nothing is swallowed, downgraded or retried.
    fn run_phase<F>(&self, phase: Phase, f: F) -> Result<Duration>
    where
        F: FnOnce() -> Result<()>,
    {
        let start = Instant::now();
        match f() {
            Ok(()) => Ok(start.elapsed()),
            Err(e) => {
                error!(">> ERROR in {} phase: {:#}", phase, e);
                Err(e.context(format!("{} phase failed", phase)))
            }
        }
    }

    /// Ensure the medallion schemas exist (idempotent)
    fn init_database(&self) -> Result<()> {
        let db = DatabaseConnection::new(&self.config.database_path)?;
        db.execute(schema::initialize_schema)
    }

    /// Replace every configured bronze table from its CSV source
    fn load_bronze(&self) -> Result<()> {
        let db = DatabaseConnection::new(&self.config.database_path)?;
        BronzeLoader::new(self.config.bronze_sources.clone()).load(&db)
    }
}
