//! Libris API library
//!
//! A GraphQL API over a relational book store. The distinguishing piece is
//! the request-scoped batch loader ([`loader`]) fed by a dynamic SQL
//! projection and filter builder ([`sql`]): hierarchical selection sets
//! resolve with a small, deterministic number of SQL statements instead of
//! the naive N+1 pattern.

pub mod config;
pub mod error;
pub mod graphql;
pub mod loader;
pub mod models;
pub mod repositories;
pub mod sql;

pub use error::{ApiError, ApiResult};
