//! Review mutations

use async_graphql::{Context, InputObject, Object, Result};

use crate::error::ApiError;
use crate::graphql::types::Review;
use crate::repositories::{BookRepository, ReviewRepository};

use super::to_graphql_error;

/// Input for creating a new review
#[derive(Debug, Clone, InputObject)]
pub struct NewReview {
    #[graphql(name = "book_id")]
    pub book_id: i64,
    pub star: i32,
    pub text: String,
}

/// Review mutations
#[derive(Default)]
pub struct ReviewMutation;

#[Object]
impl ReviewMutation {
    /// Create a review for an existing book
    async fn create_review(&self, ctx: &Context<'_>, input: NewReview) -> Result<Review> {
        let books = ctx.data::<BookRepository>()?;
        let reviews = ctx.data::<ReviewRepository>()?;

        books
            .find_by_id(input.book_id)
            .await
            .map_err(to_graphql_error)?
            .ok_or_else(|| to_graphql_error(ApiError::not_found("book", input.book_id)))?;

        let star = i16::try_from(input.star).map_err(|_| {
            to_graphql_error(ApiError::Validation(format!(
                "star rating {} out of range",
                input.star
            )))
        })?;

        let review = reviews
            .create(input.book_id, star, &input.text)
            .await
            .map_err(to_graphql_error)?;
        Ok(Review::from(review))
    }
}
