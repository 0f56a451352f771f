//! Book queries

use async_graphql::{Context, Object, Result};

use crate::graphql::loaders::load_books;
use crate::graphql::pagination::{clamp_limit, clamp_offset, MAX_LIMIT};
use crate::graphql::types::{BookFilter, BookList};

/// Book list query
#[derive(Default)]
pub struct BookQuery;

#[Object]
impl BookQuery {
    /// List books with an optional filter and pagination
    async fn books(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        #[graphql(default = 10)] limit: i32,
        filter: Option<BookFilter>,
    ) -> Result<BookList> {
        let (records, count) = load_books(
            ctx,
            offset.map(clamp_offset),
            Some(clamp_limit(limit, MAX_LIMIT)),
            filter,
        )
        .await?;
        Ok(BookList { count, records })
    }
}
