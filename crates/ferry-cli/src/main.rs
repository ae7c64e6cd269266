//! ferry command-line driver
//!
//! Wires a pair of HTTP endpoints through the migration engine:
//! list the source, load every record into the destination, then
//! delete the originals. Exits non-zero if any record fails.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{value_parser, Arg, Command};
use tracing_subscriber::EnvFilter;

use ferry_endpoint::HttpEndpoint;
use ferry_engine::{
    MigrationConfig, MigrationEngine, ResilientEndpoint, StagingDir, DEFAULT_CONCURRENCY,
    DEFAULT_RETRY_BUDGET, DEFAULT_STAGING_CEILING,
};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let matches = Command::new("ferry")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Migrate every record from a source store to a destination store")
        .arg(
            Arg::new("source")
                .long("source")
                .required(true)
                .help("Base URL of the source store"),
        )
        .arg(
            Arg::new("dest")
                .long("dest")
                .required(true)
                .help("Base URL of the destination store"),
        )
        .arg(
            Arg::new("staging-dir")
                .long("staging-dir")
                .default_value(".")
                .value_parser(value_parser!(PathBuf))
                .help("Directory the staging area is created under"),
        )
        .arg(
            Arg::new("concurrency")
                .long("concurrency")
                .default_value(DEFAULT_CONCURRENCY.to_string())
                .value_parser(value_parser!(usize))
                .help("Number of records transferred in parallel"),
        )
        .arg(
            Arg::new("ceiling")
                .long("ceiling")
                .default_value(DEFAULT_STAGING_CEILING.to_string())
                .value_parser(value_parser!(usize))
                .help("Maximum number of records staged on disk at once"),
        )
        .arg(
            Arg::new("attempts")
                .long("attempts")
                .default_value(DEFAULT_RETRY_BUDGET.to_string())
                .value_parser(value_parser!(u32))
                .help("Attempt budget for each store operation"),
        )
        .get_matches();

    let config = MigrationConfig::new(
        matches.get_one::<String>("source").unwrap().clone(),
        matches.get_one::<String>("dest").unwrap().clone(),
    )
    .with_staging_base(matches.get_one::<PathBuf>("staging-dir").unwrap().clone())
    .with_concurrency(*matches.get_one::<usize>("concurrency").unwrap())
    .with_staging_ceiling(*matches.get_one::<usize>("ceiling").unwrap())
    .with_retry_budget(*matches.get_one::<u32>("attempts").unwrap());

    match run(config).await {
        Ok(moved) => {
            println!("migration complete: {moved} record(s) moved");
        }
        Err(err) => {
            eprintln!("migration failed: {err:#}");
            std::process::exit(1);
        }
    }
}

async fn run(config: MigrationConfig) -> anyhow::Result<usize> {
    let source = HttpEndpoint::new(config.source_base.clone())
        .context("building source endpoint client")?;
    let destination = HttpEndpoint::new(config.dest_base.clone())
        .context("building destination endpoint client")?;

    let source = ResilientEndpoint::new(Arc::new(source), config.retry_budget);
    let destination = ResilientEndpoint::new(Arc::new(destination), config.retry_budget);

    let staging = StagingDir::create(&config.staging_base)
        .context("creating the staging directory")?;
    let engine = MigrationEngine::new(config.concurrency, staging, source, destination);

    let names = engine.source().list().await.context("listing the source store")?;
    tracing::info!(records = names.len(), "starting migration");

    engine
        .load(&names, config.staging_ceiling)
        .await
        .context("loading records into the destination")?;
    engine
        .delete(engine.source(), &names)
        .await
        .context("deleting migrated records from the source")?;
    engine.shutdown().context("tearing down the staging directory")?;

    Ok(names.len())
}
