//! GraphQL queries, organized by entity

mod author;
mod book;
mod book_series;

pub use author::AuthorQuery;
pub use book::BookQuery;
pub use book_series::BookSeriesQuery;

use async_graphql::MergedObject;

/// Root query type combining all query domains
#[derive(MergedObject, Default)]
pub struct Query(BookQuery, AuthorQuery, BookSeriesQuery);
