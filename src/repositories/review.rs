//! Review repository

use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::models::Review;

/// Repository for review database operations
#[derive(Clone)]
pub struct ReviewRepository {
    pool: PgPool,
}

impl ReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new review for an existing book.
    pub async fn create(&self, book_id: i64, star: i16, text: &str) -> ApiResult<Review> {
        sqlx::query_as::<_, Review>(
            "INSERT INTO reviews (book_id, star, text) VALUES ($1, $2, $3) \
             RETURNING id, book_id, star, text",
        )
        .bind(book_id)
        .bind(star)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(ApiError::database("review insert"))
    }
}
