//! Free-text search filter.

use sea_query::extension::postgres::PgExpr;
use sea_query::{Alias, Cond, Expr, Func, LikeExpr, SimpleExpr};

use super::fields::{CustomerField, FieldKind};
use crate::models::Customer;

/// Predicate built from the raw search term.
///
/// An empty (or all-whitespace) term matches every record. Otherwise a
/// record matches when the term occurs, case-insensitively, as a literal
/// substring of any populated searchable field. Unset fields never match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchFilter {
    term: Option<String>,
}

impl SearchFilter {
    /// Build a filter from the raw term as it arrived with the request.
    pub fn new(raw: &str) -> Self {
        let term = raw.trim();
        if term.is_empty() {
            Self::match_all()
        } else {
            Self {
                term: Some(term.to_string()),
            }
        }
    }

    pub fn match_all() -> Self {
        Self { term: None }
    }

    /// The trimmed search term, `None` for match-all.
    pub fn term(&self) -> Option<&str> {
        self.term.as_deref()
    }

    pub fn is_match_all(&self) -> bool {
        self.term.is_none()
    }

    /// SQL condition for this filter, `None` when it matches everything.
    ///
    /// Each searchable column is compared as `col ILIKE '%term%'` with the
    /// LIKE wildcards in the term escaped. Case folding of both sides
    /// happens in the database. A NULL column makes its comparison NULL,
    /// which never satisfies the disjunction.
    pub fn condition(&self) -> Option<Cond> {
        let term = self.term.as_deref()?;
        let pattern = LikeExpr::new(contains_pattern(term)).escape('\\');

        let mut cond = Cond::any();
        for field in CustomerField::SEARCHABLE {
            cond = cond.add(Expr::expr(searchable_text_expr(field)).ilike(pattern.clone()));
        }
        Some(cond)
    }

    /// Evaluate the filter against a record in memory.
    pub fn matches(&self, customer: &Customer) -> bool {
        let Some(term) = self.term.as_deref() else {
            return true;
        };
        let needle = term.to_lowercase();
        CustomerField::SEARCHABLE.into_iter().any(|field| {
            field
                .text(customer)
                .is_some_and(|text| text.to_lowercase().contains(&needle))
        })
    }
}

/// The column as text, casting non-text columns first.
fn searchable_text_expr(field: CustomerField) -> SimpleExpr {
    let col = Expr::col(Alias::new(field.column()));
    match field.kind() {
        FieldKind::Text | FieldKind::Code => col.into(),
        FieldKind::Integer | FieldKind::Date => Func::cast_as(col, Alias::new("TEXT")).into(),
    }
}

/// Pattern matching `term` anywhere in the value, taken literally.
fn contains_pattern(term: &str) -> String {
    format!("%{}%", escape_like_wildcards(term))
}

/// Escape SQL LIKE wildcard characters (`%`, `_`, `\`) in a value.
fn escape_like_wildcards(value: &str) -> String {
    value
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}
