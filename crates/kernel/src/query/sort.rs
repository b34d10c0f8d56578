//! Sort resolution.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::fields::CustomerField;
use crate::models::Customer;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a raw direction.
    ///
    /// `"desc"` (any case, surrounding whitespace ignored) is the only
    /// value that selects descending order. Everything else, including an
    /// absent value, is ascending.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some(s) if s.trim().eq_ignore_ascii_case("desc") => SortDirection::Desc,
            _ => SortDirection::Asc,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

/// Resolved ordering for a query.
///
/// Results are ordered by `field` in `direction`, then by ascending
/// identifier, so rows with equal sort keys always come back in the same
/// order and pages never overlap or skip rows on a stable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortSpec {
    pub field: CustomerField,
    pub direction: SortDirection,
}

impl Default for SortSpec {
    fn default() -> Self {
        Self {
            field: CustomerField::Id,
            direction: SortDirection::Asc,
        }
    }
}

impl SortSpec {
    pub fn new(field: CustomerField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Resolve raw request values. Unknown or absent field names fall
    /// back to the identifier.
    pub fn resolve(raw_field: Option<&str>, raw_direction: Option<&str>) -> Self {
        let field = match raw_field {
            None => CustomerField::Id,
            Some(name) => CustomerField::from_name(name).unwrap_or_else(|| {
                tracing::debug!(sort = name, "unknown sort field, falling back to id");
                CustomerField::Id
            }),
        };

        Self {
            field,
            direction: SortDirection::parse(raw_direction),
        }
    }

    /// Whether an explicit identifier tie-break follows the primary key.
    pub fn has_tiebreak(&self) -> bool {
        self.field != CustomerField::Id
    }

    /// Compare two records in result order.
    pub fn compare(&self, a: &Customer, b: &Customer) -> Ordering {
        let primary = self.field.compare(a, b);
        let primary = match self.direction {
            SortDirection::Asc => primary,
            SortDirection::Desc => primary.reverse(),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}
