//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result, bail};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Schema holding the customer table (default: N8N).
    pub database_schema: String,

    /// Customer table name (default: clientes).
    pub customer_table: String,

    /// Page size used when a request gives none or a non-positive one (default: 10).
    pub page_size: u32,

    /// Upper bound applied to requested page sizes (default: 100).
    pub max_page_size: u32,

    /// Statement timeout applied to list and lookup reads (default: 10s).
    pub statement_timeout: Duration,

    /// Statement timeout for the export read; zero disables it (default: 0).
    pub export_statement_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let database_schema = env::var("DATABASE_SCHEMA").unwrap_or_else(|_| "N8N".to_string());
        validate_identifier("DATABASE_SCHEMA", &database_schema)?;

        let customer_table = env::var("CUSTOMER_TABLE").unwrap_or_else(|_| "clientes".to_string());
        validate_identifier("CUSTOMER_TABLE", &customer_table)?;

        let page_size: u32 = env::var("PAGE_SIZE")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("PAGE_SIZE must be a valid u32")?;
        if page_size == 0 {
            bail!("PAGE_SIZE must be at least 1");
        }

        let max_page_size: u32 = env::var("MAX_PAGE_SIZE")
            .unwrap_or_else(|_| "100".to_string())
            .parse()
            .context("MAX_PAGE_SIZE must be a valid u32")?;
        if max_page_size < page_size {
            bail!("MAX_PAGE_SIZE ({max_page_size}) must not be smaller than PAGE_SIZE ({page_size})");
        }

        let statement_timeout_secs: u64 = env::var("STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        let export_statement_timeout_secs: u64 = env::var("EXPORT_STATEMENT_TIMEOUT_SECS")
            .unwrap_or_else(|_| "0".to_string())
            .parse()
            .context("EXPORT_STATEMENT_TIMEOUT_SECS must be a valid u64")?;

        Ok(Self {
            database_url,
            database_max_connections,
            database_schema,
            customer_table,
            page_size,
            max_page_size,
            statement_timeout: Duration::from_secs(statement_timeout_secs),
            export_statement_timeout: Duration::from_secs(export_statement_timeout_secs),
        })
    }
}

/// Schema and table names are interpolated into SQL, so only plain
/// identifiers are accepted.
fn validate_identifier(var: &str, value: &str) -> Result<()> {
    let mut chars = value.chars();
    let valid_start = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_');
    if !valid_start || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        bail!("{var} must be a plain SQL identifier, got '{value}'");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn identifiers_accept_plain_names() {
        assert!(validate_identifier("T", "clientes").is_ok());
        assert!(validate_identifier("T", "N8N").is_ok());
        assert!(validate_identifier("T", "_staging_2").is_ok());
    }

    #[test]
    fn identifiers_reject_anything_quotable() {
        assert!(validate_identifier("T", "").is_err());
        assert!(validate_identifier("T", "1clientes").is_err());
        assert!(validate_identifier("T", "clientes\"; DROP").is_err());
        assert!(validate_identifier("T", "public.clientes").is_err());
        assert!(validate_identifier("T", "cli entes").is_err());
    }
}
