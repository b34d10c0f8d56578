//! Clientela
//!
//! Command line for customer records.

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use clientela_kernel::cli::{self, Cli};
use clientela_kernel::query::{CustomerQueryBuilder, Pager};
use clientela_kernel::store::PgCustomerStore;
use clientela_kernel::{AppError, AppResult, Config, CustomerService, db};

#[tokio::main]
async fn main() -> ExitCode {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: Cli) -> AppResult<()> {
    let config = Config::from_env().context("failed to load configuration")?;
    debug!(
        schema = %config.database_schema,
        table = %config.customer_table,
        "Configuration loaded"
    );

    let pool = db::create_pool(&config).await?;

    let store = PgCustomerStore::new(
        pool,
        CustomerQueryBuilder::new(&config.database_schema, &config.customer_table),
        config.statement_timeout,
    )
    .with_export_timeout(config.export_statement_timeout);
    let service = CustomerService::new(
        Arc::new(store),
        Pager::new(config.page_size, config.max_page_size),
    );

    cli::dispatch(&service, cli.command).await
}

/// Print the failure and pick an exit status per error kind.
fn report(err: &AppError) -> ExitCode {
    match err {
        AppError::Validation(errors) => {
            for e in errors {
                eprintln!("invalid: {e}");
            }
            ExitCode::from(2)
        }
        AppError::NotFound => {
            eprintln!("not found");
            ExitCode::from(3)
        }
        AppError::Database(e) => {
            error!(error = %e, "database error");
            eprintln!("database error (retryable): {e}");
            ExitCode::from(4)
        }
        AppError::Internal(e) => {
            error!(error = ?e, "internal error");
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Logs go to stderr so the export can use stdout.
fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
