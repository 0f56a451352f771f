//! GraphQL schema builder

use async_graphql::{EmptySubscription, Request, Schema};
use sqlx::PgPool;

use crate::config::BatchConfig;
use crate::loader::BatchLoader;
use crate::repositories::{AuthorRepository, BookRepository, ReviewRepository};

use super::mutation::Mutation;
use super::query::Query;

/// The Libris GraphQL schema type
pub type LibrisSchema = Schema<Query, Mutation, EmptySubscription>;

/// Build the schema with the pool and repositories in context.
///
/// The batch loader is deliberately absent here: it is request-scoped and
/// must be attached to each request's data, never to the schema.
pub fn build_schema(pool: PgPool) -> LibrisSchema {
    Schema::build(Query::default(), Mutation::default(), EmptySubscription)
        .data(pool.clone())
        .data(AuthorRepository::new(pool.clone()))
        .data(BookRepository::new(pool.clone()))
        .data(ReviewRepository::new(pool))
        .finish()
}

/// Wrap a GraphQL request with a fresh request-scoped batch loader.
pub fn request_with_loader(request: impl Into<Request>, batch: BatchConfig) -> Request {
    request.into().data(BatchLoader::new(batch))
}
