#![forbid(unsafe_code)]

mod commands;
mod config;
mod output;
mod validate;

use clap::Parser;
use commands::{CacheHandle, Request};
use config::Args;
use jobtrack_engine::JobLifecycleEngine;
use jobtrack_storage::SqliteStore;
use output::CliError;
use serde_json::Value;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn";

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.log_level.as_deref());

    match run(args) {
        Ok(payload) => {
            println!("{payload}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", err.to_json());
            ExitCode::from(err.exit_code())
        }
    }
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(args: Args) -> Result<Value, CliError> {
    let owner_id = validate::owner(args.owner.as_deref())?;
    let engine_config = args.engine_config();
    let request = Request::parse(args.command)?;

    let store = SqliteStore::open(&args.data_dir).map_err(CliError::StoreOpen)?;
    let cache = match CacheHandle::open(args.cache, &args.data_dir) {
        Ok(cache) => cache,
        Err(err) => {
            close_store(store);
            return Err(CliError::CacheOpen(err));
        }
    };
    tracing::debug!(data_dir = %args.data_dir.display(), cache = ?args.cache, "clients ready");

    let mut engine = JobLifecycleEngine::new(store, cache, engine_config);
    let result = commands::execute(&mut engine, &owner_id, request);

    let (store, cache) = engine.into_parts();
    close_store(store);
    if let Err(err) = cache.close() {
        tracing::warn!(error = %err, "listing cache close failed");
    }
    result
}

fn close_store(store: SqliteStore) {
    if let Err(err) = store.close() {
        tracing::warn!(error = %err, "job store close failed");
    }
}
