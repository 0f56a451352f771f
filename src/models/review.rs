//! Review model

use serde::Serialize;
use sqlx::postgres::PgRow;

use super::get_or_default;

/// Review record from the reviews table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Review {
    /// Unique review identifier
    pub id: i64,

    /// Book this review belongs to
    pub book_id: i64,

    /// Star rating
    pub star: i16,

    /// Review body
    pub text: String,
}

impl Review {
    /// Decode a review from a projected row, tolerating pruned columns.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_or_default(row, "id")?,
            book_id: get_or_default(row, "book_id")?,
            star: get_or_default(row, "star")?,
            text: get_or_default(row, "text")?,
        })
    }
}
