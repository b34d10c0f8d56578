#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Common test utilities for integration tests.
//!
//! Most tests run the real service over [`MemoryCustomerStore`], which
//! applies the same filter and sort resolution as the PostgreSQL store.
//! [`PgTestTable`] gives the PostgreSQL tests a customer table in a
//! throwaway schema when `DATABASE_URL` is set.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDate;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tokio_stream::StreamExt;

use clientela_kernel::CustomerService;
use clientela_kernel::models::{Customer, CustomerDraft};
use clientela_kernel::query::{CustomerQueryBuilder, Pager, QueryParams};
use clientela_kernel::store::{CustomerStream, MemoryCustomerStore, PgCustomerStore};

/// A draft with every required field set.
pub fn draft(name: &str) -> CustomerDraft {
    CustomerDraft {
        name: Some(name.to_string()),
        phone: Some("11999990000".to_string()),
        organization: Some("Acme".to_string()),
        contract: Some("CT-1".to_string()),
        ..Default::default()
    }
}

/// A draft with every field set.
pub fn full_draft() -> CustomerDraft {
    CustomerDraft {
        name: Some("Ana Souza".to_string()),
        phone: Some("5511988887777".to_string()),
        organization: Some("Souza Transportes".to_string()),
        contract: Some("CT-2024-001".to_string()),
        dispatch_count: Some(12),
        last_dispatch: NaiveDate::from_ymd_opt(2024, 11, 3),
        tax_id: Some("12.345.678/0001-90".to_string()),
        responsible_id: Some("123.456.789-00".to_string()),
        attendance_1: NaiveDate::from_ymd_opt(2024, 1, 15),
        attendance_2: None,
        attendance_3: NaiveDate::from_ymd_opt(2024, 6, 1),
        attendance_4: NaiveDate::from_ymd_opt(2024, 3, 20),
        final_status: Some("I".to_string()),
        email: Some("ana@souza.com".to_string()),
        contact_email: Some("financeiro@souzatransportes.com.br".to_string()),
    }
}

pub fn customer(id: i64, draft: CustomerDraft) -> Customer {
    Customer {
        id,
        fields: draft.validate().expect("fixture draft must be valid"),
    }
}

/// Store seeded with `(id, name)` pairs.
pub fn store_with_names(rows: &[(i64, &str)]) -> Arc<MemoryCustomerStore> {
    Arc::new(MemoryCustomerStore::with_customers(
        rows.iter().map(|(id, name)| customer(*id, draft(name))),
    ))
}

/// Store seeded with a mix of names, organizations and missing tax ids,
/// including duplicate sort keys.
pub fn varied_store(count: i64) -> Arc<MemoryCustomerStore> {
    let names = ["Ana", "Banana", "Carla", "Diana", "Eduardo", "ana maria"];
    let orgs = ["Acme", "Globex", "Initech"];
    Arc::new(MemoryCustomerStore::with_customers((1..=count).map(|id| {
        let idx = usize::try_from(id).unwrap();
        customer(
            id,
            CustomerDraft {
                organization: Some(orgs[idx % orgs.len()].to_string()),
                tax_id: (id % 3 != 0).then(|| format!("{:014}", (id * 7919) % 1000)),
                dispatch_count: Some(id % 4),
                ..draft(names[idx % names.len()])
            },
        )
    })))
}

pub fn service(store: Arc<MemoryCustomerStore>) -> CustomerService {
    CustomerService::new(store, Pager::default())
}

pub fn params(
    q: Option<&str>,
    sort: Option<&str>,
    order: Option<&str>,
    page: Option<&str>,
    page_size: Option<&str>,
) -> QueryParams {
    QueryParams {
        q: q.map(str::to_string),
        sort: sort.map(str::to_string),
        order: order.map(str::to_string),
        page: page.map(str::to_string),
        page_size: page_size.map(str::to_string),
    }
}

pub fn ids(customers: &[Customer]) -> Vec<i64> {
    customers.iter().map(|c| c.id).collect()
}

/// Drain an export stream, failing the test on any error.
pub async fn collect(mut stream: CustomerStream) -> Vec<Customer> {
    let mut out = Vec::new();
    while let Some(row) = stream.next().await {
        out.push(row.unwrap());
    }
    out
}

// -------------------------------------------------------------------------
// PostgreSQL
// -------------------------------------------------------------------------

/// Customer table in its own schema, dropped by [`PgTestTable::teardown`].
pub struct PgTestTable {
    pub pool: PgPool,
    pub builder: CustomerQueryBuilder,
    schema: String,
}

impl PgTestTable {
    /// Create the table, or `None` when no database is configured.
    pub async fn create() -> Option<Self> {
        dotenvy::dotenv().ok();
        let Ok(url) = std::env::var("DATABASE_URL") else {
            eprintln!("DATABASE_URL not set, skipping PostgreSQL test");
            return None;
        };

        let pool = PgPoolOptions::new()
            .max_connections(4)
            .connect(&url)
            .await
            .expect("Failed to connect to test database");

        let schema = format!("clientela_test_{}", uuid::Uuid::now_v7().simple());
        let builder = CustomerQueryBuilder::new(&schema, "clientes");

        sqlx::query(&format!("CREATE SCHEMA \"{schema}\""))
            .execute(&pool)
            .await
            .expect("Failed to create test schema");
        sqlx::query(&format!(
            r#"
            CREATE TABLE {} (
                id BIGSERIAL PRIMARY KEY,
                nome VARCHAR(50) NOT NULL,
                celzap VARCHAR(20) NOT NULL,
                empresa VARCHAR(100) NOT NULL,
                contrato VARCHAR(50) NOT NULL,
                disparos INTEGER,
                ultdisparo DATE,
                cnpj VARCHAR(20),
                cpfresp VARCHAR(20),
                dtatend1 DATE,
                dtatend2 DATE,
                dtatend3 DATE,
                dtatend4 DATE,
                finalstatus CHAR(1),
                email VARCHAR(100),
                emailcontato VARCHAR(100)
            )
            "#,
            builder.qualified_table()
        ))
        .execute(&pool)
        .await
        .expect("Failed to create test table");

        Some(Self {
            pool,
            builder,
            schema,
        })
    }

    /// Store over this table with the given list timeout.
    pub fn store(&self, statement_timeout: Duration) -> PgCustomerStore {
        PgCustomerStore::new(self.pool.clone(), self.builder.clone(), statement_timeout)
    }

    pub fn service(&self) -> CustomerService {
        CustomerService::new(
            Arc::new(self.store(Duration::from_secs(10))),
            Pager::default(),
        )
    }

    pub async fn teardown(self) {
        sqlx::query(&format!("DROP SCHEMA \"{}\" CASCADE", self.schema))
            .execute(&self.pool)
            .await
            .expect("Failed to drop test schema");
        self.pool.close().await;
    }
}
