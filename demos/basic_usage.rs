//! Basic category logger usage example
//!
//! Demonstrates a category tree, per-subtree levels, error stacks and the
//! in-memory message buffer.
//!
//! Run with: cargo run --example basic_usage

use rust_category_logger::prelude::*;
use rust_category_logger::{info, warn};
use serde_json::json;
use std::time::Duration;

fn main() -> Result<()> {
    println!("=== Rust Category Logger - Basic Usage Example ===\n");

    let runtime = RuntimeSettings::new();
    runtime.set_default_configuration(CategoryConfiguration::new(LogLevel::Info), true)?;

    let service = Category::new("service", &runtime)?;
    let db = service.child("db")?;
    let http = service.child("http")?;
    let logger = runtime.logger(&service)?;

    println!("1. Logging through the root logger and categories:");
    logger.info("service starting")?;
    db.info("connection pool ready")?;
    http.debug("hidden: http is at INFO")?;
    warn!(http, "slow request took {} ms", 850)?;

    println!("\n2. Enabling DEBUG for the db subtree only:");
    runtime.set_configuration_for_category(
        CategoryConfiguration::new(LogLevel::Debug),
        &db,
        true,
        false,
    )?;
    db.debug("query plan cached")?;
    http.debug("still hidden")?;

    println!("\n3. Structured payload and an error with its stack:");
    db.info(LogData::new("migrated").with_data(json!({"tables": 12})))?;
    let cause = std::io::Error::other("connection reset");
    db.error_with("query failed", cause)?;
    info!(logger, "the query failure is delivered before this line")?;
    logger.wait_for_pending(Duration::from_secs(1));

    println!("\n4. Capturing output in a message buffer:");
    runtime.set_default_configuration(
        CategoryConfiguration::new(LogLevel::Info).with_logger_type(LoggerType::MessageBuffer)?,
        true,
    )?;
    http.info("captured")?;
    for line in logger.messages() {
        println!("   buffered: {}", line);
    }

    println!("\n=== Example completed successfully! ===");
    Ok(())
}
