/*!
 * Tests for the silver/gold transform batch runner
 */

use anyhow::Result;
use mallard::transform_runner::TransformRunner;

use crate::common;

/// Test that a batch runs verbatim against the open connection
#[test]
fn test_run_withValidBatch_shouldExecuteAllStatements() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = common::open_in_memory_warehouse()?;
    db.execute_batch("CREATE TABLE bronze.src (id INTEGER); INSERT INTO bronze.src VALUES (1), (2);")?;

    let script = common::create_test_file(
        temp_dir.path(),
        "load_silver.sql",
        "CREATE OR REPLACE TABLE silver.dst AS SELECT * FROM bronze.src;
         CREATE OR REPLACE TABLE silver.dst_copy AS SELECT * FROM silver.dst;",
    )?;

    let runner = TransformRunner::new("silver", &script);
    runner.run(&db)?;

    assert_eq!(db.row_count("silver.dst")?, 2);
    assert_eq!(db.row_count("silver.dst_copy")?, 2);
    Ok(())
}

/// Test that an empty batch file is a no-op, not an error
#[test]
fn test_run_withEmptyBatch_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = common::open_in_memory_warehouse()?;
    let script = common::create_test_file(temp_dir.path(), "empty.sql", "")?;

    TransformRunner::new("silver", &script).run(&db)?;
    Ok(())
}

/// Test that a missing batch file surfaces an error naming the script
#[test]
fn test_run_withMissingScript_shouldFailNamingScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = common::open_in_memory_warehouse()?;
    let script = temp_dir.path().join("no_such_batch.sql");

    let result = TransformRunner::new("gold", &script).run(&db);
    assert!(result.is_err());

    let message = format!("{:#}", result.unwrap_err());
    assert!(message.contains("no_such_batch.sql"));
    Ok(())
}

/// Test that a failing statement surfaces an error naming the script
#[test]
fn test_run_withBrokenStatement_shouldFailNamingScript() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = common::open_in_memory_warehouse()?;
    let script = common::create_test_file(
        temp_dir.path(),
        "broken.sql",
        "CREATE OR REPLACE TABLE silver.broken AS SELECT * FROM bronze.does_not_exist;",
    )?;

    let result = TransformRunner::new("silver", &script).run(&db);
    assert!(result.is_err());
    assert!(format!("{:#}", result.unwrap_err()).contains("broken.sql"));
    Ok(())
}

/// Test that the same runner shape serves both layers
#[test]
fn test_run_withGoldBatch_shouldAggregateFromSilver() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let db = common::open_in_memory_warehouse()?;
    db.execute_batch(
        "CREATE TABLE silver.measurements (v INTEGER);
         INSERT INTO silver.measurements VALUES (10), (20), (30);",
    )?;

    let script = common::create_test_file(
        temp_dir.path(),
        "load_gold.sql",
        "CREATE OR REPLACE TABLE gold.stats AS SELECT count(*) AS n, sum(v) AS total FROM silver.measurements;",
    )?;

    let runner = TransformRunner::new("gold", &script);
    assert_eq!(runner.layer(), "gold");
    runner.run(&db)?;

    let (n, total): (i64, i64) = db.execute(|conn| {
        Ok(conn.query_row("SELECT n, total FROM gold.stats", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })?)
    })?;
    assert_eq!(n, 3);
    assert_eq!(total, 60);
    Ok(())
}
