//! Book model

use serde::Serialize;
use sqlx::postgres::PgRow;

use super::{get_or_default, BookSeries};

/// Book record from the books table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Book {
    /// Unique book identifier
    pub id: i64,

    /// Book title, unique across the table
    pub title: String,

    /// Optional link to the series this book belongs to
    pub series_id: Option<i64>,
}

impl Book {
    /// Decode a book from a projected row, tolerating pruned columns.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_or_default(row, "id")?,
            title: get_or_default(row, "title")?,
            series_id: get_or_default(row, "series_id")?,
        })
    }
}

/// A book row joined with its (optionally projected) series.
///
/// Produced by the book list executor when the selection embeds the series;
/// the series half stays `None` when the selection did not ask for it or the
/// book has no series link.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BookRecord {
    pub book: Book,
    pub series: Option<BookSeries>,
}

impl BookRecord {
    /// Decode a book plus its embedded series columns from one joined row.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            book: Book::from_projected_row(row)?,
            series: BookSeries::from_embedded_row(row)?,
        })
    }
}
