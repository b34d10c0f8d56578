//! Customer record stores.
//!
//! Provides the trait the service talks to and two implementations: the
//! PostgreSQL store used in production and an in-memory store that
//! evaluates the same filter and sort in Rust.

mod memory;
mod postgres;

use std::pin::Pin;

use async_trait::async_trait;
use futures_core::Stream;

use crate::error::AppResult;
use crate::models::{Customer, CustomerFields};
use crate::query::{ExportQuery, ListQuery, Page};

pub use memory::MemoryCustomerStore;
pub use postgres::PgCustomerStore;

/// Stream of customers in export order.
pub type CustomerStream = Pin<Box<dyn Stream<Item = AppResult<Customer>> + Send>>;

/// Persistence backend for customer records.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Count and page read under one filter and one snapshot.
    async fn list(&self, query: &ListQuery) -> AppResult<Page<Customer>>;

    /// Unpaged read in the same order as [`CustomerStore::list`].
    ///
    /// Failing to reach the store is reported here; errors after the
    /// first row arrive through the stream.
    async fn export(&self, query: &ExportQuery) -> AppResult<CustomerStream>;

    async fn find(&self, id: i64) -> AppResult<Option<Customer>>;

    /// Insert a record and return its newly assigned identifier.
    async fn insert(&self, fields: &CustomerFields) -> AppResult<i64>;

    /// Overwrite every field of one record. Returns false if it does not exist.
    async fn update(&self, id: i64, fields: &CustomerFields) -> AppResult<bool>;

    /// Hard-delete one record. Returns false if it does not exist.
    async fn delete(&self, id: i64) -> AppResult<bool>;

    /// Connectivity probe.
    async fn ping(&self) -> AppResult<()>;
}
