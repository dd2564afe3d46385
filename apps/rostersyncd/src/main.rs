//! Roster reconciliation daemon.

mod config;

use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rostersync_directory::{DirectoryClient, ScopeId};
use rostersync_directory_rest::{RestDirectoryClient, RestDirectoryConfig};
use rostersync_engine::{CycleReport, SyncEngine, SyncMemo};
use rostersync_roster::HttpRosterSource;

use crate::config::DaemonConfig;

#[derive(Parser)]
#[command(name = "rostersyncd", about = "Roster reconciliation daemon", version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the periodic reconciliation loop (default).
    Run,
    /// Run a single reconciliation pass and print the reports as JSON.
    Sync {
        /// Reconcile only this scope.
        #[arg(long)]
        scope: Option<String>,
        /// Compute candidates without mutating the directory.
        #[arg(long)]
        dry_run: bool,
    },
}

type Engine = SyncEngine<RestDirectoryClient, HttpRosterSource>;

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,rostersync_engine=debug")),
        )
        .init();

    let cli = Cli::parse();

    let config = DaemonConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        std::process::exit(2);
    });

    let mut rest_config = RestDirectoryConfig::new(&config.directory_base_url);
    if let Some(ref token) = config.directory_token {
        rest_config = rest_config.with_token(token);
    }
    let directory = Arc::new(RestDirectoryClient::new(rest_config).unwrap_or_else(|e| {
        eprintln!("Directory client error: {e}");
        std::process::exit(2);
    }));

    let roster = Arc::new(HttpRosterSource::new(&config.roster_url).unwrap_or_else(|e| {
        eprintln!("Roster source error: {e}");
        std::process::exit(2);
    }));

    let engine = SyncEngine::new(
        Arc::clone(&directory),
        roster,
        Arc::new(SyncMemo::new()),
        config.engine.clone(),
    );

    match cli.command.unwrap_or(Command::Run) {
        Command::Run => run_loop(&engine, directory.as_ref(), &config).await,
        Command::Sync { scope, dry_run } => {
            let scope = scope.map(ScopeId::new).or_else(|| config.scope.clone());
            run_once(&engine, directory.as_ref(), scope, dry_run).await;
        }
    }
}

/// Periodic reconciliation loop. Scope failures are logged and retried on
/// the next pass; only startup problems terminate the process.
async fn run_loop(engine: &Engine, directory: &RestDirectoryClient, config: &DaemonConfig) {
    tracing::info!(
        interval_ms = config.sync_interval_ms,
        scope_id = config.scope.as_ref().map(ScopeId::as_str),
        "starting reconciliation loop"
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(config.sync_interval_ms));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        let scopes = match target_scopes(directory, config.scope.clone()).await {
            Ok(scopes) => scopes,
            Err(e) => {
                tracing::warn!(error = %e, "could not enumerate scopes, retrying next pass");
                continue;
            }
        };

        for scope in &scopes {
            if let Err(e) = engine.sync_scope(scope, false).await {
                tracing::error!(scope_id = %scope, error = %e, "reconciliation cycle failed");
            }
        }
    }
}

async fn run_once(
    engine: &Engine,
    directory: &RestDirectoryClient,
    scope: Option<ScopeId>,
    dry_run: bool,
) {
    let scopes = target_scopes(directory, scope).await.unwrap_or_else(|e| {
        eprintln!("Scope enumeration error: {e}");
        std::process::exit(1);
    });

    let mut reports: Vec<CycleReport> = Vec::new();
    let mut failed = false;

    for scope in &scopes {
        match engine.sync_scope(scope, dry_run).await {
            Ok(report) => reports.push(report),
            Err(e) => {
                tracing::error!(scope_id = %scope, error = %e, "reconciliation cycle failed");
                failed = true;
            }
        }
    }

    match serde_json::to_string_pretty(&reports) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Report serialization error: {e}");
            failed = true;
        }
    }

    if failed {
        std::process::exit(1);
    }
}

async fn target_scopes(
    directory: &RestDirectoryClient,
    pinned: Option<ScopeId>,
) -> Result<Vec<ScopeId>, rostersync_directory::DirectoryError> {
    match pinned {
        Some(scope) => Ok(vec![scope]),
        None => directory.list_scopes().await,
    }
}
