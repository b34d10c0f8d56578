//! Customer service.
//!
//! Entry points for list, lookup, create, update, delete and export.
//! Raw request parameters are normalized here and handed to the store;
//! nothing is cached between calls.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::context::RequestContext;
use crate::error::{AppError, AppResult};
use crate::export::{self, CsvStream};
use crate::models::{Customer, CustomerDraft};
use crate::query::{ExportQuery, ListQuery, Page, Pager, QueryParams};
use crate::store::{CustomerStore, CustomerStream};

/// Service for customer records.
#[derive(Clone)]
pub struct CustomerService {
    store: Arc<dyn CustomerStore>,
    pager: Pager,
}

impl CustomerService {
    pub fn new(store: Arc<dyn CustomerStore>, pager: Pager) -> Self {
        Self { store, pager }
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }

    /// List one page of customers for raw request parameters.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> AppResult<Page<Customer>> {
        let query = params.list_query(&self.pager);
        self.list_resolved(ctx, &query).await
    }

    /// List one page for an already resolved query.
    pub async fn list_resolved(
        &self,
        ctx: &RequestContext,
        query: &ListQuery,
    ) -> AppResult<Page<Customer>> {
        debug!(
            request_id = %ctx.request_id,
            q = query.filter.term().unwrap_or_default(),
            sort = query.sort.field.name(),
            order = query.sort.direction.as_str(),
            page = query.window.page,
            per_page = query.window.per_page,
            "listing customers"
        );

        let page = self.store.list(query).await.inspect_err(|e| {
            warn!(request_id = %ctx.request_id, error = %e, "customer list failed");
        })?;

        debug!(
            request_id = %ctx.request_id,
            total = page.total,
            returned = page.items.len(),
            "customer list complete"
        );
        Ok(page)
    }

    /// Look up one customer.
    pub async fn get(&self, ctx: &RequestContext, id: i64) -> AppResult<Customer> {
        let customer = self.store.find(id).await?;
        customer.ok_or_else(|| {
            debug!(request_id = %ctx.request_id, customer_id = id, "customer not found");
            AppError::NotFound
        })
    }

    /// Validate and insert a customer, returning its identifier.
    pub async fn create(&self, ctx: &RequestContext, draft: CustomerDraft) -> AppResult<i64> {
        let fields = draft.validate().map_err(AppError::Validation)?;
        let id = self.store.insert(&fields).await?;

        info!(request_id = %ctx.request_id, customer_id = id, "customer created");
        Ok(id)
    }

    /// Validate and overwrite every field of an existing customer.
    ///
    /// Validation runs first, so an invalid draft for a missing id
    /// reports the validation failure.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        draft: CustomerDraft,
    ) -> AppResult<()> {
        let fields = draft.validate().map_err(AppError::Validation)?;

        if !self.store.update(id, &fields).await? {
            debug!(request_id = %ctx.request_id, customer_id = id, "update of missing customer");
            return Err(AppError::NotFound);
        }

        info!(request_id = %ctx.request_id, customer_id = id, "customer updated");
        Ok(())
    }

    /// Hard-delete a customer.
    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> AppResult<()> {
        if !self.store.delete(id).await? {
            debug!(request_id = %ctx.request_id, customer_id = id, "delete of missing customer");
            return Err(AppError::NotFound);
        }

        info!(request_id = %ctx.request_id, customer_id = id, "customer deleted");
        Ok(())
    }

    /// Every matching customer, unpaged, in list order.
    pub async fn export(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> AppResult<CustomerStream> {
        let query = params.export_query();
        self.export_resolved(ctx, &query).await
    }

    pub async fn export_resolved(
        &self,
        ctx: &RequestContext,
        query: &ExportQuery,
    ) -> AppResult<CustomerStream> {
        info!(
            request_id = %ctx.request_id,
            q = query.filter.term().unwrap_or_default(),
            sort = query.sort.field.name(),
            order = query.sort.direction.as_str(),
            "starting customer export"
        );

        self.store.export(query).await.inspect_err(|e| {
            warn!(request_id = %ctx.request_id, error = %e, "customer export failed");
        })
    }

    /// Export encoded as CSV lines, header first.
    pub async fn export_csv(
        &self,
        ctx: &RequestContext,
        params: &QueryParams,
    ) -> AppResult<CsvStream> {
        let rows = self.export(ctx, params).await?;
        Ok(export::csv_lines(rows))
    }

    /// Check that the store is reachable.
    pub async fn health(&self, ctx: &RequestContext) -> AppResult<()> {
        self.store.ping().await.inspect_err(|e| {
            warn!(request_id = %ctx.request_id, error = %e, "store health check failed");
        })
    }
}
