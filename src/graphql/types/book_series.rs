//! Book series GraphQL type

use async_graphql::Object;

use crate::models::BookSeries as DbBookSeries;

/// Book series exposed via GraphQL
pub struct BookSeries {
    inner: DbBookSeries,
}

impl From<DbBookSeries> for BookSeries {
    fn from(series: DbBookSeries) -> Self {
        Self { inner: series }
    }
}

#[Object]
impl BookSeries {
    /// Unique series identifier
    async fn id(&self) -> i64 {
        self.inner.id
    }

    /// Series title
    async fn title(&self) -> &str {
        &self.inner.title
    }
}

/// Book series list envelope with its total count
pub struct BookSeriesList {
    pub count: i64,
    pub series: Vec<DbBookSeries>,
}

#[Object]
impl BookSeriesList {
    /// Total number of series matching the filter, ignoring pagination
    async fn count(&self) -> i64 {
        self.count
    }

    /// The requested page of series
    async fn list(&self) -> Vec<BookSeries> {
        self.series.iter().cloned().map(BookSeries::from).collect()
    }
}
