//! Author queries

use async_graphql::{Context, Object, Result};

use crate::graphql::loaders::load_authors;
use crate::graphql::pagination::{clamp_limit, clamp_offset, MAX_LIMIT};
use crate::graphql::types::{AuthorFilter, AuthorList};

/// Author list query
#[derive(Default)]
pub struct AuthorQuery;

#[Object]
impl AuthorQuery {
    /// List authors with an optional filter and pagination
    async fn authors(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        #[graphql(default = 10)] limit: i32,
        filter: Option<AuthorFilter>,
    ) -> Result<AuthorList> {
        let (authors, count) = load_authors(
            ctx,
            offset.map(clamp_offset),
            Some(clamp_limit(limit, MAX_LIMIT)),
            filter,
        )
        .await?;
        Ok(AuthorList { count, authors })
    }
}
