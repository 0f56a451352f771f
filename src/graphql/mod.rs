//! GraphQL schema and resolvers
//!
//! - [`query`] / [`mutation`]: the root resolver objects
//! - [`types`]: object types, list envelopes, filter inputs
//! - [`loaders`]: resolver adapters that submit batched loads
//! - [`schema`]: schema construction and per-request loader attachment
//! - [`pagination`]: shared clamping helpers

pub mod loaders;
pub mod mutation;
pub mod pagination;
pub mod query;
pub mod schema;
pub mod types;

pub use schema::{build_schema, request_with_loader, LibrisSchema};
