//! GraphQL mutations, organized by entity
//!
//! Mutations bypass the batch loader for their writes and prechecks; the
//! entity they return re-enters the normal read path, so nested selections
//! on the response still batch.

mod author;
mod book;
mod review;

pub use author::AuthorMutation;
pub use book::BookMutation;
pub use review::ReviewMutation;

use async_graphql::MergedObject;

use crate::error::ApiError;

/// Root mutation type combining all mutation domains
#[derive(MergedObject, Default)]
pub struct Mutation(BookMutation, AuthorMutation, ReviewMutation);

/// Convert an API error to a GraphQL error, logging server-side failures.
pub(crate) fn to_graphql_error(err: ApiError) -> async_graphql::Error {
    if matches!(&err, ApiError::Database { .. } | ApiError::Internal(_)) {
        tracing::error!(error = %err, "mutation failed");
    }
    async_graphql::Error::new(err.to_string())
}
