//! PostgreSQL customer store.

use std::time::Duration;

use async_trait::async_trait;
use sqlx::postgres::PgArguments;
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tokio_stream::StreamExt;

use super::{CustomerStore, CustomerStream};
use crate::db;
use crate::error::{AppError, AppResult};
use crate::models::{Customer, CustomerFields, CustomerRow, FinalStatus};
use crate::query::{CustomerQueryBuilder, ExportQuery, ListQuery, Page};

/// Customer store backed by a PostgreSQL table.
#[derive(Clone)]
pub struct PgCustomerStore {
    pool: PgPool,
    builder: CustomerQueryBuilder,
    statement_timeout: Duration,
    export_timeout: Duration,
}

impl PgCustomerStore {
    /// Store with `statement_timeout` on list reads and no timeout on export.
    pub fn new(pool: PgPool, builder: CustomerQueryBuilder, statement_timeout: Duration) -> Self {
        Self {
            pool,
            builder,
            statement_timeout,
            export_timeout: Duration::ZERO,
        }
    }

    /// Statement timeout for export reads. `Duration::ZERO` disables it.
    ///
    /// Time the server spends blocked on a slow reader counts against it.
    pub fn with_export_timeout(mut self, timeout: Duration) -> Self {
        self.export_timeout = timeout;
        self
    }

    /// Open a read-only snapshot transaction with the given statement
    /// timeout (`0ms` means none).
    ///
    /// `SET LOCAL` resets on commit or rollback, so the pooled connection
    /// goes back unchanged on every path.
    async fn begin_read(&self, timeout: Duration) -> AppResult<Transaction<'static, Postgres>> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "SET LOCAL statement_timeout = '{}ms'",
            timeout.as_millis()
        ))
        .execute(&mut *tx)
        .await?;

        Ok(tx)
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn list(&self, query: &ListQuery) -> AppResult<Page<Customer>> {
        let count_sql = self.builder.build_count(&query.filter);
        let page_sql = self.builder.build_page(query);

        let mut tx = self.begin_read(self.statement_timeout).await?;

        let total: i64 = sqlx::query_scalar(&count_sql).fetch_one(&mut *tx).await?;
        let rows = sqlx::query_as::<_, CustomerRow>(&page_sql)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;

        let items = rows
            .into_iter()
            .map(Customer::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;

        let total = u64::try_from(total).unwrap_or(0);
        Ok(Page::new(items, total, query.window))
    }

    async fn export(&self, query: &ExportQuery) -> AppResult<CustomerStream> {
        let sql = self.builder.build_export(query);
        let mut tx = self.begin_read(self.export_timeout).await?;

        let stream = async_stream::stream! {
            {
                let mut rows = sqlx::query_as::<_, CustomerRow>(&sql).fetch(&mut *tx);
                while let Some(row) = rows.next().await {
                    match row {
                        Ok(row) => {
                            yield Customer::try_from(row).map_err(AppError::Internal);
                        }
                        Err(e) => {
                            yield Err(AppError::Database(e));
                            return;
                        }
                    }
                }
            }

            if let Err(e) = tx.commit().await {
                yield Err(AppError::Database(e));
            }
        };

        Ok(Box::pin(stream))
    }

    async fn find(&self, id: i64) -> AppResult<Option<Customer>> {
        let row = sqlx::query_as::<_, CustomerRow>(&self.builder.find_sql())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Customer::try_from).transpose()?)
    }

    async fn insert(&self, fields: &CustomerFields) -> AppResult<i64> {
        let sql = self.builder.insert_sql();
        let row = bind_fields(sqlx::query(&sql), fields)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.try_get("id")?)
    }

    async fn update(&self, id: i64, fields: &CustomerFields) -> AppResult<bool> {
        let sql = self.builder.update_sql();
        let result = bind_fields(sqlx::query(&sql), fields)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let result = sqlx::query(&self.builder.delete_sql())
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn ping(&self) -> AppResult<()> {
        db::check_health(&self.pool).await?;
        Ok(())
    }
}

/// Bind every non-identifier column in insert/update parameter order.
fn bind_fields<'q>(
    query: Query<'q, Postgres, PgArguments>,
    fields: &'q CustomerFields,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(fields.name.as_str())
        .bind(fields.phone.as_str())
        .bind(fields.organization.as_str())
        .bind(fields.contract.as_str())
        .bind(fields.dispatch_count)
        .bind(fields.last_dispatch)
        .bind(fields.tax_id.as_deref())
        .bind(fields.responsible_id.as_deref())
        .bind(fields.attendance_1)
        .bind(fields.attendance_2)
        .bind(fields.attendance_3)
        .bind(fields.attendance_4)
        .bind(fields.final_status.map(FinalStatus::code))
        .bind(fields.email.as_deref())
        .bind(fields.contact_email.as_deref())
}
