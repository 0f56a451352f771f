//! Book GraphQL type
//!
//! Relationship resolvers go through the request's batch loader, so sibling
//! books resolved concurrently collapse their author and review fetches
//! into one query each.

use async_graphql::{Context, Object, Result};

use crate::graphql::loaders::{load_book_authors, load_book_reviews};
use crate::graphql::pagination::{clamp_limit, clamp_offset, MAX_LIMIT};
use crate::models::BookRecord;

use super::author::Author;
use super::book_series::BookSeries;
use super::filters::ReviewFilter;
use super::review::Review;

/// Book exposed via GraphQL
pub struct Book {
    record: BookRecord,
}

impl From<BookRecord> for Book {
    fn from(record: BookRecord) -> Self {
        Self { record }
    }
}

#[Object]
impl Book {
    /// Unique book identifier
    async fn id(&self) -> i64 {
        self.record.book.id
    }

    /// Book title
    async fn title(&self) -> &str {
        &self.record.book.title
    }

    /// Series this book belongs to, when the selection embedded it
    async fn series(&self) -> Option<BookSeries> {
        self.record.series.clone().map(BookSeries::from)
    }

    /// Authors of this book, fetched through the batch loader
    async fn authors(&self, ctx: &Context<'_>) -> Result<Vec<Author>> {
        let authors = load_book_authors(ctx, self.record.book.id).await?;
        Ok(authors.into_iter().map(Author::from).collect())
    }

    /// Reviews of this book, fetched through the batch loader.
    ///
    /// Pagination arguments disable batching across siblings; the load then
    /// runs as its own query.
    async fn reviews(
        &self,
        ctx: &Context<'_>,
        offset: Option<i32>,
        limit: Option<i32>,
        filter: Option<ReviewFilter>,
    ) -> Result<Vec<Review>> {
        let reviews = load_book_reviews(
            ctx,
            self.record.book.id,
            offset.map(clamp_offset),
            limit.map(|l| clamp_limit(l, MAX_LIMIT)),
            filter,
        )
        .await?;
        Ok(reviews.into_iter().map(Review::from).collect())
    }
}

/// Book list envelope with its total count
pub struct BookList {
    pub count: i64,
    pub records: Vec<BookRecord>,
}

#[Object]
impl BookList {
    /// Total number of books matching the filter, ignoring pagination
    async fn count(&self) -> i64 {
        self.count
    }

    /// The requested page of books
    async fn list(&self) -> Vec<Book> {
        self.records.iter().cloned().map(Book::from).collect()
    }
}
