//! Book series queries

use async_graphql::{Context, Object, Result};

use crate::graphql::loaders::load_book_series;
use crate::graphql::pagination::{clamp_limit, clamp_offset, MAX_LIMIT};
use crate::graphql::types::{BookSeriesFilter, BookSeriesList};

/// Book series list query
#[derive(Default)]
pub struct BookSeriesQuery;

#[Object]
impl BookSeriesQuery {
    /// List book series with an optional filter and pagination
    async fn book_series(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        #[graphql(default = 10)] limit: i32,
        filter: Option<BookSeriesFilter>,
    ) -> Result<BookSeriesList> {
        let (series, count) = load_book_series(
            ctx,
            offset.map(clamp_offset),
            Some(clamp_limit(limit, MAX_LIMIT)),
            filter,
        )
        .await?;
        Ok(BookSeriesList { count, series })
    }
}
