//! In-memory customer store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{CustomerStore, CustomerStream};
use crate::error::{AppError, AppResult};
use crate::models::{Customer, CustomerFields};
use crate::query::{ExportQuery, ListQuery, Page, SearchFilter, SortSpec};

/// Customer store held in process memory.
///
/// Applies [`SearchFilter::matches`] and [`SortSpec::compare`], which
/// mirror the SQL the PostgreSQL store generates. Used by tests and for
/// dry runs without a database.
#[derive(Default)]
pub struct MemoryCustomerStore {
    inner: RwLock<Inner>,
    unavailable: AtomicBool,
}

#[derive(Default)]
struct Inner {
    rows: BTreeMap<i64, CustomerFields>,
    /// Last identifier handed out; identifiers are never reused.
    last_id: i64,
}

impl MemoryCustomerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the given records, keeping their identifiers.
    pub fn with_customers(customers: impl IntoIterator<Item = Customer>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.write();
            for customer in customers {
                inner.last_id = inner.last_id.max(customer.id);
                inner.rows.insert(customer.id, customer.fields);
            }
        }
        store
    }

    /// Make every operation fail as if the store were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.inner.read().rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_available(&self) -> AppResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::Database(sqlx::Error::PoolTimedOut));
        }
        Ok(())
    }

    /// Matching records in result order.
    fn select(&self, filter: &SearchFilter, sort: &SortSpec) -> Vec<Customer> {
        let inner = self.inner.read();
        let mut matched: Vec<Customer> = inner
            .rows
            .iter()
            .map(|(id, fields)| Customer {
                id: *id,
                fields: fields.clone(),
            })
            .filter(|customer| filter.matches(customer))
            .collect();
        matched.sort_by(|a, b| sort.compare(a, b));
        matched
    }
}

#[async_trait]
impl CustomerStore for MemoryCustomerStore {
    async fn list(&self, query: &ListQuery) -> AppResult<Page<Customer>> {
        self.check_available()?;

        let matched = self.select(&query.filter, &query.sort);
        let total = matched.len() as u64;
        let offset = usize::try_from(query.window.offset()).unwrap_or(usize::MAX);
        let limit = usize::try_from(query.window.limit()).unwrap_or(usize::MAX);

        let items = matched.into_iter().skip(offset).take(limit).collect();
        Ok(Page::new(items, total, query.window))
    }

    async fn export(&self, query: &ExportQuery) -> AppResult<CustomerStream> {
        self.check_available()?;

        let rows = self.select(&query.filter, &query.sort);
        Ok(Box::pin(tokio_stream::iter(rows.into_iter().map(Ok::<_, AppError>))))
    }

    async fn find(&self, id: i64) -> AppResult<Option<Customer>> {
        self.check_available()?;

        let inner = self.inner.read();
        Ok(inner.rows.get(&id).map(|fields| Customer {
            id,
            fields: fields.clone(),
        }))
    }

    async fn insert(&self, fields: &CustomerFields) -> AppResult<i64> {
        self.check_available()?;

        let mut inner = self.inner.write();
        inner.last_id += 1;
        let id = inner.last_id;
        inner.rows.insert(id, fields.clone());
        Ok(id)
    }

    async fn update(&self, id: i64, fields: &CustomerFields) -> AppResult<bool> {
        self.check_available()?;

        let mut inner = self.inner.write();
        match inner.rows.get_mut(&id) {
            Some(existing) => {
                *existing = fields.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        self.check_available()?;

        Ok(self.inner.write().rows.remove(&id).is_some())
    }

    async fn ping(&self) -> AppResult<()> {
        self.check_available()
    }
}
