//! Review GraphQL type

use async_graphql::{Context, Object, Result};

use crate::graphql::loaders::load_book_by_id;
use crate::models::Review as DbReview;

use super::book::Book;

/// Review exposed via GraphQL
pub struct Review {
    inner: DbReview,
}

impl From<DbReview> for Review {
    fn from(review: DbReview) -> Self {
        Self { inner: review }
    }
}

#[Object]
impl Review {
    /// Unique review identifier
    async fn id(&self) -> i64 {
        self.inner.id
    }

    /// Star rating
    async fn star(&self) -> i32 {
        i32::from(self.inner.star)
    }

    /// Review body
    async fn text(&self) -> &str {
        &self.inner.text
    }

    /// The reviewed book, fetched through the batch loader
    async fn book(&self, ctx: &Context<'_>) -> Result<Option<Book>> {
        let record = load_book_by_id(ctx, self.inner.book_id).await?;
        Ok(record.map(Book::from))
    }
}
