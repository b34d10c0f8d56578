//! Customer list query engine.
//!
//! This module provides:
//! - CustomerField: the sortable/searchable field registry
//! - SearchFilter / SortSpec / Pager: request parameter resolution
//! - QueryParams: raw parameters to ListQuery / ExportQuery
//! - CustomerQueryBuilder: SeaQuery-based SQL generation

mod builder;
mod fields;
mod filter;
mod pager;
mod params;
mod sort;

pub use builder::CustomerQueryBuilder;
pub use fields::{CustomerField, FieldKind, FieldValue};
pub use filter::SearchFilter;
pub use pager::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, Page, PageWindow, Pager};
pub use params::{DEFAULT_ORDER, ExportQuery, ListQuery, QueryParams};
pub use sort::{SortDirection, SortSpec};
