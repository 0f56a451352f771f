//! Book series model

use serde::Serialize;
use sqlx::postgres::PgRow;
use sqlx::Row;

use super::get_or_default;

/// Book series record from the book_series table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct BookSeries {
    /// Unique series identifier
    pub id: i64,

    /// Series title, unique across the table
    pub title: String,
}

impl BookSeries {
    /// Decode a series from a projected row, tolerating pruned columns.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_or_default(row, "id")?,
            title: get_or_default(row, "title")?,
        })
    }

    /// Decode the embedded-series half of a joined book row.
    ///
    /// Embedded columns are aliased `series__id` / `series__title` by the
    /// projection planner. Returns `None` when the projection carried no
    /// series columns or the left join produced NULLs.
    pub fn from_embedded_row(row: &PgRow) -> Result<Option<Self>, sqlx::Error> {
        let id = match row.try_get::<Option<i64>, _>("series__id") {
            Err(sqlx::Error::ColumnNotFound(_)) => return Ok(None),
            other => other?,
        };
        let Some(id) = id else { return Ok(None) };
        Ok(Some(Self {
            id,
            title: get_or_default(row, "series__title")?,
        }))
    }
}
