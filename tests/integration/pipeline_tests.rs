/*!
 * End-to-end pipeline tests: init -> bronze -> silver -> gold
 */

use anyhow::Result;
use std::time::Duration;

use mallard::app_config::{Config, SourceTable};
use mallard::app_controller::Controller;
use mallard::database::{schema, DatabaseConnection};

use crate::common;

/// The six bronze tables of the example scenario with row counts {5,3,10,2,7,4}
const SCENARIO: [(&str, usize); 6] = [
    ("crm_cust_info", 5),
    ("crm_prd_info", 3),
    ("crm_sales_details", 10),
    ("erp_cust_az12", 2),
    ("erp_loc_a101", 7),
    ("erp_px_cat_g1v2", 4),
];

/// Builds a fully wired config in the temp dir: six CSV sources plus
/// silver/gold batches where gold depends on a silver-created table
fn scenario_config(root: &std::path::Path) -> Result<Config> {
    let mut sources = Vec::new();
    for (table, rows) in SCENARIO {
        let csv = common::create_test_csv(root, &format!("{}.csv", table), rows)?;
        sources.push(SourceTable::new(table, csv));
    }

    let config = common::warehouse_config(root, sources);

    common::create_test_file(
        root,
        "load_silver.sql",
        "CREATE OR REPLACE TABLE silver.customers AS SELECT * FROM bronze.crm_cust_info;",
    )?;
    common::create_test_file(
        root,
        "load_gold.sql",
        "CREATE OR REPLACE TABLE gold.customer_count AS SELECT count(*) AS n FROM silver.customers;",
    )?;

    Ok(config)
}

/// Test the example scenario: six sources produce six bronze tables with the
/// configured row counts, downstream layers build from them, and the summary
/// reports three phase durations plus a total
#[test]
fn test_runPipeline_withSixValidSources_shouldLoadAllLayers() -> Result<()> {
    common::init_test_logging();
    let temp_dir = common::create_temp_dir()?;
    let config = scenario_config(temp_dir.path())?;

    let controller = Controller::with_config(config.clone())?;
    let summary = controller.run_pipeline()?;

    let db = DatabaseConnection::new(&config.database_path)?;
    for (table, rows) in SCENARIO {
        assert_eq!(
            db.row_count(&format!("bronze.{}", table))?,
            rows as i64,
            "row count mismatch for bronze.{}",
            table
        );

        let distinct: i64 = db.execute(|conn| {
            Ok(conn.query_row(
                &format!("SELECT count(DISTINCT dwh_load_date) FROM bronze.{}", table),
                [],
                |row| row.get(0),
            )?)
        })?;
        assert_eq!(distinct, 1, "bronze.{} should carry one load timestamp", table);
    }

    // Silver built from bronze, gold built from silver
    assert_eq!(db.row_count("silver.customers")?, 5);
    let n: i64 = db.execute(|conn| {
        Ok(conn.query_row("SELECT n FROM gold.customer_count", [], |row| row.get(0))?)
    })?;
    assert_eq!(n, 5);

    // Three phase durations plus one total
    assert!(summary.total > Duration::ZERO);
    assert!(summary.total >= summary.bronze);
    assert!(summary.total >= summary.silver);
    assert!(summary.total >= summary.gold);
    Ok(())
}

/// Test that re-running the whole pipeline yields the same row counts
#[test]
fn test_runPipeline_invokedTwice_shouldBeIdempotent() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = scenario_config(temp_dir.path())?;
    let controller = Controller::with_config(config.clone())?;

    controller.run_pipeline()?;
    controller.run_pipeline()?;

    let db = DatabaseConnection::new(&config.database_path)?;
    for (table, rows) in SCENARIO {
        assert_eq!(db.row_count(&format!("bronze.{}", table))?, rows as i64);
    }
    assert_eq!(db.row_count("silver.customers")?, 5);
    Ok(())
}

/// Test that a bronze failure stops the run before the transform phases
#[test]
fn test_runPipeline_withMissingBronzeSource_shouldNeverReachSilver() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = scenario_config(temp_dir.path())?;

    // Break the third source; the first two stay valid
    config.bronze_sources[2].path = temp_dir.path().join("vanished.csv");

    let controller = Controller::with_config(config.clone())?;
    let result = controller.run_pipeline();
    assert!(result.is_err());

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("bronze phase failed"));
    assert!(message.contains("vanished.csv"));

    let db = DatabaseConnection::new(&config.database_path)?;

    // Fail-fast ordering inside bronze
    assert_eq!(db.row_count("bronze.crm_cust_info")?, 5);
    assert_eq!(db.row_count("bronze.crm_prd_info")?, 3);
    assert!(!db.table_exists("bronze", "crm_sales_details")?);
    assert!(!db.table_exists("bronze", "erp_cust_az12")?);

    // Silver was never invoked
    assert!(!db.table_exists("silver", "customers")?);
    assert!(!db.table_exists("gold", "customer_count")?);
    Ok(())
}

/// Test that a silver failure stops the run before gold
#[test]
fn test_runPipeline_withFailingSilverBatch_shouldNeverReachGold() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = scenario_config(temp_dir.path())?;

    common::create_test_file(
        temp_dir.path(),
        "load_silver.sql",
        "CREATE OR REPLACE TABLE silver.customers AS SELECT * FROM bronze.no_such_table;",
    )?;

    let controller = Controller::with_config(config.clone())?;
    let result = controller.run_pipeline();
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("silver phase failed"));

    let db = DatabaseConnection::new(&config.database_path)?;

    // Bronze completed before the failure
    assert_eq!(db.row_count("bronze.crm_cust_info")?, 5);

    // Gold was never invoked
    assert!(!db.table_exists("gold", "customer_count")?);
    Ok(())
}

/// Test that no orchestrator connection survives a run, success or failure.
/// DuckDB holds an exclusive lock per database handle, so a fresh open only
/// succeeds if every handle from the run was released.
#[test]
fn test_runPipeline_afterAnyOutcome_shouldReleaseAllConnections() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let mut config = scenario_config(temp_dir.path())?;

    let controller = Controller::with_config(config.clone())?;
    controller.run_pipeline()?;

    {
        let db = DatabaseConnection::new(&config.database_path)?;
        assert_eq!(db.row_count("bronze.crm_cust_info")?, 5);
    }

    // Now force a gold-phase failure and check release on the error path too
    config.gold_script = temp_dir.path().join("absent_gold.sql");
    let controller = Controller::with_config(config.clone())?;
    assert!(controller.run_pipeline().is_err());

    let db = DatabaseConnection::new(&config.database_path)?;
    assert_eq!(db.row_count("silver.customers")?, 5);
    Ok(())
}

/// Test that the standalone init command creates the schemas for a later
/// standalone bronze run
#[test]
fn test_runInit_thenRunBronze_shouldLoadWithoutFullPipeline() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let config = scenario_config(temp_dir.path())?;
    let controller = Controller::with_config(config.clone())?;

    controller.run_init()?;
    controller.run_bronze()?;

    let db = DatabaseConnection::new(&config.database_path)?;
    db.execute(|conn| {
        assert!(schema::schema_exists(conn, "bronze")?);
        assert!(schema::schema_exists(conn, "silver")?);
        assert!(schema::schema_exists(conn, "gold")?);
        Ok(())
    })?;
    assert_eq!(db.row_count("bronze.erp_loc_a101")?, 7);

    // Transform phases were not part of this run
    assert!(!db.table_exists("silver", "customers")?);
    Ok(())
}
