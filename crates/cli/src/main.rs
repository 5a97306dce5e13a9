use crate::{commands::Commands, error::CliError};
use clap::Parser;
use connectors::{clickhouse::ClickHouseSink, postgres::PgSourceFactory};
use engine_config::{EnvManager, Settings};
use engine_core::{
    history::clickhouse::ClickHouseHistoryStore,
    orchestrator::MigrationOrchestrator,
    registry::MigrationStatusRegistry,
};
use model::migration::{request::MigrationRequest, status::MigrationStatus};
use std::{sync::Arc, time::Duration};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod error;
mod output;

#[derive(Parser)]
#[command(
    name = "rowferry",
    version = "0.1.0",
    about = "Postgres to ClickHouse table migration tool"
)]
struct Cli {
    #[arg(long, global = true, help = "Load additional variables from a .env file")]
    env_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut env = EnvManager::new();
    if let Some(path) = &cli.env_file {
        env.load_from_file(path)?;
    }
    let settings = Settings::from_env(&env)?;
    let orchestrator = assemble(&settings).await?;

    match cli.command {
        Commands::Tables { schema, json } => {
            let tables = orchestrator.list_source_tables(&schema, None).await?;
            if json {
                output::print_json(&tables)?;
            } else {
                output::print_tables(&schema, &tables);
            }
        }
        Commands::Schema { table, schema, json } => {
            let table_schema = orchestrator.analyze_table(&table, &schema, None).await?;
            if json {
                output::print_json(&table_schema)?;
            } else {
                output::print_schema(&table_schema);
            }
        }
        Commands::Plan {
            table,
            schema,
            destination,
            json,
        } => {
            let destination = destination.unwrap_or_else(|| table.clone());
            let plan = orchestrator
                .suggest_mappings(&table, &schema, &destination, None)
                .await?;
            if json {
                output::print_json(&plan)?;
            } else {
                output::print_plan(&plan);
            }
        }
        Commands::Migrate {
            table,
            schema,
            destination,
            batch_size,
            description,
            no_create_table,
        } => {
            let destination = destination.unwrap_or_else(|| table.clone());
            let plan = orchestrator
                .suggest_mappings(&table, &schema, &destination, None)
                .await?;

            let request = MigrationRequest {
                source_connection: None,
                source_schema: schema,
                source_table: table,
                destination_table: destination,
                mappings: plan.mappings,
                create_table: !no_create_table,
                batch_size,
                description,
                created_by: whoami(),
            };

            let id = orchestrator.submit(request).await?;
            info!(id, "Migration submitted");
            follow(&orchestrator, &id).await?;
        }
        Commands::Status { id, json } => {
            let record = orchestrator.history_record(&id).await?;
            if json {
                output::print_json(&record)?;
            } else {
                output::print_record(&record);
            }
        }
        Commands::History {
            limit,
            offset,
            status,
            json,
        } => {
            let status = status
                .map(|raw| {
                    raw.parse::<MigrationStatus>()
                        .map_err(|_| CliError::InvalidStatusFilter(raw))
                })
                .transpose()?;
            let (total, records) = orchestrator.history(limit, offset, status).await?;
            if json {
                output::print_json(&records)?;
            } else {
                output::print_history(total, offset, &records);
            }
        }
    }

    Ok(())
}

/// Builds the pipeline from settings: default Postgres source, ClickHouse
/// sink, ledger in the same ClickHouse instance, fresh in-process registry.
async fn assemble(settings: &Settings) -> Result<MigrationOrchestrator, CliError> {
    let sources = PgSourceFactory::connect(
        &settings.postgres.url(),
        &settings.postgres.endpoint(),
    )
    .await?;

    let sink = ClickHouseSink::new(
        &settings.clickhouse.url(),
        &settings.clickhouse.user,
        &settings.clickhouse.password,
        &settings.clickhouse.database,
    );
    sink.ping().await?;

    let history = ClickHouseHistoryStore::new(sink.client().clone());
    history.init().await?;

    Ok(MigrationOrchestrator::new(
        Arc::new(sources),
        Arc::new(sink),
        Arc::new(history),
        MigrationStatusRegistry::new(),
    ))
}

/// Polls the live registry until the run reaches a terminal state, printing a
/// progress line whenever the batch counter moves.
async fn follow(orchestrator: &MigrationOrchestrator, id: &str) -> Result<(), CliError> {
    let mut last_batch = None;

    loop {
        tokio::time::sleep(Duration::from_millis(500)).await;
        let report = orchestrator.get_status(id).await?;

        if report.progress.current_batch != last_batch {
            last_batch = report.progress.current_batch;
            output::print_progress(&report);
        }

        if report.status.is_terminal() {
            output::print_progress(&report);
            if report.status == MigrationStatus::Failed {
                return Err(CliError::MigrationFailed {
                    id: id.to_string(),
                    reason: report
                        .error_message
                        .unwrap_or_else(|| "unknown error".to_string()),
                });
            }
            return Ok(());
        }
    }
}

fn whoami() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "system".to_string())
}
