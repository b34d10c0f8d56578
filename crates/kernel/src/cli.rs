//! Operator command line.
//!
//! Each command builds a fresh [`RequestContext`], calls the service
//! and prints the outcome. Record JSON goes to stdout; logs go to stderr.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tokio::io::AsyncReadExt;

use crate::context::RequestContext;
use crate::error::AppResult;
use crate::export;
use crate::models::{Customer, CustomerDraft};
use crate::query::QueryParams;
use crate::service::CustomerService;
use crate::store::CustomerStream;

/// Clientela - customer records
#[derive(Parser, Debug)]
#[command(name = "clientela")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List one page of customers
    List {
        #[command(flatten)]
        query: QueryArgs,

        /// Page number (1-indexed)
        #[arg(long, allow_hyphen_values = true)]
        page: Option<String>,

        /// Rows per page
        #[arg(long, allow_hyphen_values = true)]
        page_size: Option<String>,
    },

    /// Print one customer as JSON
    Get { id: i64 },

    /// Create a customer from a JSON document
    Create {
        /// JSON file to read (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Replace every field of a customer from a JSON document
    Update {
        id: i64,

        /// JSON file to read (stdin when omitted)
        #[arg(long)]
        file: Option<PathBuf>,
    },

    /// Delete a customer
    Delete { id: i64 },

    /// Export every matching customer as CSV
    Export {
        #[command(flatten)]
        query: QueryArgs,

        /// Output file, or a directory to write clientes.csv into (stdout when omitted)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Check that the database is reachable
    Health,
}

/// Search and sort options shared by `list` and `export`.
#[derive(Args, Debug, Default)]
pub struct QueryArgs {
    /// Free-text search term
    #[arg(long)]
    pub q: Option<String>,

    /// Field to sort by
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction; only "desc" sorts descending
    #[arg(long)]
    pub order: Option<String>,
}

impl QueryArgs {
    fn into_params(self, page: Option<String>, page_size: Option<String>) -> QueryParams {
        QueryParams {
            q: self.q,
            sort: self.sort,
            order: self.order,
            page,
            page_size,
        }
    }
}

/// Run one command against the service.
pub async fn dispatch(service: &CustomerService, command: Command) -> AppResult<()> {
    let ctx = RequestContext::new();

    match command {
        Command::List {
            query,
            page,
            page_size,
        } => cmd_list(service, &ctx, &query.into_params(page, page_size)).await,
        Command::Get { id } => cmd_get(service, &ctx, id).await,
        Command::Create { file } => cmd_create(service, &ctx, file.as_deref()).await,
        Command::Update { id, file } => cmd_update(service, &ctx, id, file.as_deref()).await,
        Command::Delete { id } => cmd_delete(service, &ctx, id).await,
        Command::Export { query, output } => {
            cmd_export(service, &ctx, &query.into_params(None, None), output.as_deref()).await
        }
        Command::Health => cmd_health(service, &ctx).await,
    }
}

/// Print a page as a table followed by the paging summary.
pub async fn cmd_list(
    service: &CustomerService,
    ctx: &RequestContext,
    params: &QueryParams,
) -> AppResult<()> {
    let page = service.list(ctx, params).await?;

    if page.items.is_empty() {
        println!("No customers found.");
    } else {
        println!(
            "{:<8} {:<30} {:<16} {:<24} {:<6}",
            "ID", "NAME", "PHONE", "ORGANIZATION", "STATUS"
        );
        println!("{}", "-".repeat(88));
        for customer in &page.items {
            println!("{}", table_row(customer));
        }
    }

    println!();
    println!(
        "page {} of {} ({} total, {} per page)",
        page.page,
        page.total_pages.max(1),
        page.total,
        page.per_page
    );
    Ok(())
}

pub async fn cmd_get(service: &CustomerService, ctx: &RequestContext, id: i64) -> AppResult<()> {
    let customer = service.get(ctx, id).await?;
    let json = serde_json::to_string_pretty(&customer).context("failed to encode customer")?;
    println!("{json}");
    Ok(())
}

pub async fn cmd_create(
    service: &CustomerService,
    ctx: &RequestContext,
    file: Option<&Path>,
) -> AppResult<()> {
    let draft = read_draft(file).await?;
    let id = service.create(ctx, draft).await?;
    println!("{id}");
    Ok(())
}

pub async fn cmd_update(
    service: &CustomerService,
    ctx: &RequestContext,
    id: i64,
    file: Option<&Path>,
) -> AppResult<()> {
    let draft = read_draft(file).await?;
    service.update(ctx, id, draft).await?;
    println!("Customer {id} updated.");
    Ok(())
}

pub async fn cmd_delete(service: &CustomerService, ctx: &RequestContext, id: i64) -> AppResult<()> {
    service.delete(ctx, id).await?;
    println!("Customer {id} deleted.");
    Ok(())
}

/// Stream the CSV export to a file or stdout.
///
/// The store is reached before anything is created on disk. File output
/// goes to a `.partial` sibling that is renamed into place only once every
/// row is written and removed if the stream fails.
pub async fn cmd_export(
    service: &CustomerService,
    ctx: &RequestContext,
    params: &QueryParams,
    output: Option<&Path>,
) -> AppResult<()> {
    let rows = service.export(ctx, params).await?;

    let (written, destination) = match output {
        Some(path) => {
            let target = export_target(path).await;
            let written = export_to_file(rows, &target).await?;
            (written, target.display().to_string())
        }
        None => {
            let mut stdout = tokio::io::stdout();
            (export::write_csv(rows, &mut stdout).await?, "-".to_string())
        }
    };

    tracing::info!(
        request_id = %ctx.request_id,
        rows = written,
        destination = %destination,
        "customer export complete"
    );
    Ok(())
}

/// `path` itself, or `path/clientes.csv` when it names a directory.
async fn export_target(path: &Path) -> PathBuf {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => path.join(export::FILE_NAME),
        _ => path.to_path_buf(),
    }
}

fn partial_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".partial");
    PathBuf::from(name)
}

async fn export_to_file(rows: CustomerStream, target: &Path) -> AppResult<u64> {
    let partial = partial_path(target);

    let result = export_to_file_inner(rows, &partial, target).await;

    if result.is_err() {
        match tokio::fs::remove_file(&partial).await {
            Ok(()) => {
                tracing::warn!(path = %target.display(), "export failed, partial file removed");
            }
            Err(e) => {
                tracing::debug!(error = %e, path = %partial.display(), "no partial export to remove");
            }
        }
    }

    result
}

async fn export_to_file_inner(
    rows: CustomerStream,
    partial: &Path,
    target: &Path,
) -> AppResult<u64> {
    let written = {
        let file = tokio::fs::File::create(partial)
            .await
            .with_context(|| format!("failed to create {}", partial.display()))?;
        let mut writer = tokio::io::BufWriter::new(file);
        export::write_csv(rows, &mut writer).await?
    };

    tokio::fs::rename(partial, target)
        .await
        .with_context(|| format!("failed to move export into {}", target.display()))?;

    Ok(written)
}

pub async fn cmd_health(service: &CustomerService, ctx: &RequestContext) -> AppResult<()> {
    service.health(ctx).await?;
    println!("ok");
    Ok(())
}

fn table_row(customer: &Customer) -> String {
    let f = &customer.fields;
    format!(
        "{:<8} {:<30} {:<16} {:<24} {:<6}",
        customer.id,
        truncate(&f.name, 30),
        f.phone,
        truncate(&f.organization, 24),
        f.final_status.map_or("", |s| s.code())
    )
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
        out.push('~');
        out
    }
}

async fn read_draft(file: Option<&Path>) -> AppResult<CustomerDraft> {
    let raw = match file {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            tokio::io::stdin()
                .read_to_string(&mut buf)
                .await
                .context("failed to read stdin")?;
            buf
        }
    };

    let draft = serde_json::from_str(&raw).context("customer document is not valid JSON")?;
    Ok(draft)
}
