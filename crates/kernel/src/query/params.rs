//! Raw request parameters and the queries resolved from them.

use serde::Deserialize;

use super::filter::SearchFilter;
use super::pager::{PageWindow, Pager};
use super::sort::SortSpec;

/// Direction applied when a request carries no `order` parameter.
pub const DEFAULT_ORDER: &str = "desc";

/// Untrusted list/export parameters, exactly as received.
///
/// Every value is optional text; nothing here is validated; resolution
/// into a [`ListQuery`] or [`ExportQuery`] normalizes instead of failing.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct QueryParams {
    /// Free-text search term.
    pub q: Option<String>,

    /// Sort field name.
    pub sort: Option<String>,

    /// Sort direction, `"desc"` for descending.
    pub order: Option<String>,

    /// Page number, 1-indexed.
    pub page: Option<String>,

    /// Rows per page.
    pub page_size: Option<String>,
}

impl QueryParams {
    pub fn search_filter(&self) -> SearchFilter {
        SearchFilter::new(self.q.as_deref().unwrap_or_default())
    }

    /// Sort spec, applying [`DEFAULT_ORDER`] when no direction was sent.
    pub fn sort_spec(&self) -> SortSpec {
        SortSpec::resolve(
            self.sort.as_deref(),
            Some(self.order.as_deref().unwrap_or(DEFAULT_ORDER)),
        )
    }

    pub fn page_window(&self, pager: &Pager) -> PageWindow {
        pager.window(parse_int(self.page.as_deref()), parse_int(self.page_size.as_deref()))
    }

    pub fn list_query(&self, pager: &Pager) -> ListQuery {
        ListQuery {
            filter: self.search_filter(),
            sort: self.sort_spec(),
            window: self.page_window(pager),
        }
    }

    /// Export query: same filter and sort as [`QueryParams::list_query`],
    /// without the window.
    pub fn export_query(&self) -> ExportQuery {
        ExportQuery {
            filter: self.search_filter(),
            sort: self.sort_spec(),
        }
    }
}

/// Integers that don't parse are treated as absent.
fn parse_int(raw: Option<&str>) -> Option<i64> {
    raw.and_then(|s| s.trim().parse().ok())
}

/// Filtered, sorted, paged read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub filter: SearchFilter,
    pub sort: SortSpec,
    pub window: PageWindow,
}

/// Filtered, sorted, unpaged read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportQuery {
    pub filter: SearchFilter,
    pub sort: SortSpec,
}

impl From<&ListQuery> for ExportQuery {
    fn from(query: &ListQuery) -> Self {
        Self {
            filter: query.filter.clone(),
            sort: query.sort,
        }
    }
}
