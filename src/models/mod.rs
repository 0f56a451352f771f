//! Database models for Libris
//!
//! Row types for the five tables, decoded from dynamically-projected
//! queries. Because the column list of every read is pruned to the GraphQL
//! selection, decoding goes through [`get_or_default`] instead of a fixed
//! `FromRow` column list: a column absent from the projection yields the
//! field's default rather than a decode error.

pub mod author;
pub mod book;
pub mod book_series;
pub mod review;

pub use author::{Author, BookAuthorRow};
pub use book::{Book, BookRecord};
pub use book_series::BookSeries;
pub use review::Review;

use sqlx::postgres::PgRow;
use sqlx::Row;

/// Decode a column, falling back to the default when the projection did not
/// include it.
pub(crate) fn get_or_default<'r, T>(row: &'r PgRow, column: &str) -> Result<T, sqlx::Error>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres> + Default,
{
    match row.try_get::<T, _>(column) {
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(T::default()),
        other => other,
    }
}
