//! Clientela Kernel Library
//!
//! Customer record management: validation, search, sorting, pagination
//! and CSV export over a PostgreSQL table. The `clientela` binary is a
//! thin command line over [`service::CustomerService`].

pub mod cli;
pub mod config;
pub mod context;
pub mod db;
pub mod error;
pub mod export;
pub mod models;
pub mod query;
pub mod service;
pub mod store;

pub use config::Config;
pub use context::RequestContext;
pub use error::{AppError, AppResult, ValidationError};
pub use service::CustomerService;
