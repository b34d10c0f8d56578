//! Customer query builder using SeaQuery.
//!
//! Generates the list, count, and export SELECTs from a resolved
//! [`ListQuery`]/[`ExportQuery`]. Column and table names come from the
//! field registry and validated configuration; the search term is the
//! only request-derived value and is rendered as an escaped literal.

use sea_query::{Alias, Asterisk, Expr, Order, PostgresQueryBuilder, Query, SelectStatement};

use super::fields::CustomerField;
use super::filter::SearchFilter;
use super::params::{ExportQuery, ListQuery};
use super::sort::{SortDirection, SortSpec};

/// Query builder bound to one customer table.
#[derive(Debug, Clone)]
pub struct CustomerQueryBuilder {
    schema: String,
    table: String,
}

impl CustomerQueryBuilder {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }

    /// Quoted `"schema"."table"` for hand-written statements.
    pub fn qualified_table(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema, self.table)
    }

    /// Build the page SELECT: filter, sort with tie-break, LIMIT/OFFSET.
    pub fn build_page(&self, query: &ListQuery) -> String {
        let mut select = self.base_select(&query.filter);
        add_sort(&mut select, &query.sort);
        select.limit(query.window.limit());
        select.offset(query.window.offset());
        select.to_string(PostgresQueryBuilder)
    }

    /// Build a COUNT query for total results under the same filter.
    pub fn build_count(&self, filter: &SearchFilter) -> String {
        let mut select = Query::select();
        select.expr(Expr::col(Asterisk).count());
        select.from((Alias::new(&self.schema), Alias::new(&self.table)));
        if let Some(cond) = filter.condition() {
            select.cond_where(cond);
        }
        select.to_string(PostgresQueryBuilder)
    }

    /// Build the unpaged export SELECT.
    pub fn build_export(&self, query: &ExportQuery) -> String {
        let mut select = self.base_select(&query.filter);
        add_sort(&mut select, &query.sort);
        select.to_string(PostgresQueryBuilder)
    }

    /// `SELECT ... WHERE id = $1`.
    pub fn find_sql(&self) -> String {
        format!(
            "SELECT {} FROM {} WHERE id = $1",
            column_list(CustomerField::ALL.iter().copied()),
            self.qualified_table()
        )
    }

    /// `INSERT` of every non-identifier column, `$1..$15` in
    /// [`CustomerField::ALL`] order, returning the assigned id.
    pub fn insert_sql(&self) -> String {
        let columns = data_fields();
        let placeholders = (1..=columns.len())
            .map(|n| format!("${n}"))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "INSERT INTO {} ({}) VALUES ({placeholders}) RETURNING id",
            self.qualified_table(),
            column_list(columns.iter().copied()),
        )
    }

    /// Whole-row `UPDATE` with the same parameter order as
    /// [`Self::insert_sql`]; the identifier is the last parameter.
    pub fn update_sql(&self) -> String {
        let columns = data_fields();
        let assignments = columns
            .iter()
            .enumerate()
            .map(|(i, field)| format!("\"{}\" = ${}", field.column(), i + 1))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "UPDATE {} SET {assignments} WHERE id = ${}",
            self.qualified_table(),
            columns.len() + 1
        )
    }

    pub fn delete_sql(&self) -> String {
        format!("DELETE FROM {} WHERE id = $1", self.qualified_table())
    }

    fn base_select(&self, filter: &SearchFilter) -> SelectStatement {
        let mut select = Query::select();
        select.columns(CustomerField::ALL.map(|f| Alias::new(f.column())));
        select.from((Alias::new(&self.schema), Alias::new(&self.table)));
        if let Some(cond) = filter.condition() {
            select.cond_where(cond);
        }
        select
    }
}

/// Add ORDER BY for the resolved sort, then `id ASC` unless the primary
/// key already is the identifier.
fn add_sort(select: &mut SelectStatement, sort: &SortSpec) {
    let order = match sort.direction {
        SortDirection::Asc => Order::Asc,
        SortDirection::Desc => Order::Desc,
    };
    select.order_by(Alias::new(sort.field.column()), order);

    if sort.has_tiebreak() {
        select.order_by(Alias::new(CustomerField::Id.column()), Order::Asc);
    }
}

/// Every field except the store-assigned identifier.
fn data_fields() -> Vec<CustomerField> {
    CustomerField::ALL
        .into_iter()
        .filter(|f| *f != CustomerField::Id)
        .collect()
}

fn column_list(fields: impl Iterator<Item = CustomerField>) -> String {
    fields
        .map(|f| format!("\"{}\"", f.column()))
        .collect::<Vec<_>>()
        .join(", ")
}
