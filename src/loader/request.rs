//! Load requests and the group-executor seam
//!
//! A [`LoadRequest`] is one resolver's descriptor of the data it needs. The
//! three concerns the loader cares about are explicit, separate fields:
//! the identity key (request-scoped de-duplication), the group signature
//! (merge eligibility), and the member payload (the originating parent, for
//! demultiplexing). The work itself lives behind [`GroupExecutor`], with one
//! implementor per entity or relation kind; results travel through the
//! tagged [`GroupResult`] / [`LoadSlice`] pair instead of opaque payloads.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ApiError, ApiResult};
use crate::models::{Author, BookAuthorRow, BookRecord, BookSeries, Review};

/// The member payload carried by one load request: the parent entity's id,
/// used by `distribute` to pick this member's slice of the group result.
/// Whole-list loads have no parent.
#[derive(Debug, Clone, Default)]
pub struct LoadMember {
    pub parent_id: Option<i64>,
}

impl LoadMember {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn of_parent(parent_id: i64) -> Self {
        Self {
            parent_id: Some(parent_id),
        }
    }
}

/// One resolver's descriptor of the data it needs, submitted to the loader.
pub struct LoadRequest {
    /// Fully-substituted SQL; the equality key for de-duplication
    pub identity_key: String,
    /// Parameter-less SQL template; `None` forbids merging
    pub group_signature: Option<String>,
    /// Parent payload for demultiplexing
    pub member: LoadMember,
    /// Executes the merged group and slices results per member
    pub executor: Arc<dyn GroupExecutor>,
}

/// Executes one equivalence class of merged load requests.
///
/// `execute` runs exactly once per group with the ordered member list and
/// may coalesce their payloads (typically unioning parent ids into one
/// `ANY($1)` list). `distribute` runs once per member and must be pure; it
/// selects the member's rows from the aggregate.
#[async_trait]
pub trait GroupExecutor: Send + Sync {
    async fn execute(&self, members: &[LoadMember]) -> ApiResult<GroupResult>;

    fn distribute(&self, member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice>;
}

/// Aggregate output of one `execute` call, alive until every member has
/// been distributed.
#[derive(Debug, Clone)]
pub enum GroupResult {
    Books { list: Vec<BookRecord>, count: i64 },
    Series { list: Vec<BookSeries>, count: i64 },
    Authors { list: Vec<Author>, count: i64 },
    BookAuthors(Vec<BookAuthorRow>),
    Reviews(Vec<Review>),
    BooksById(Vec<BookRecord>),
}

/// One member's slice of a group result.
#[derive(Debug, Clone)]
pub enum LoadSlice {
    Books { list: Vec<BookRecord>, count: i64 },
    Series { list: Vec<BookSeries>, count: i64 },
    AuthorList { list: Vec<Author>, count: i64 },
    Authors(Vec<Author>),
    Reviews(Vec<Review>),
    Book(Option<BookRecord>),
}

impl LoadSlice {
    fn variant_name(&self) -> &'static str {
        match self {
            Self::Books { .. } => "books",
            Self::Series { .. } => "series",
            Self::AuthorList { .. } => "author list",
            Self::Authors(_) => "authors",
            Self::Reviews(_) => "reviews",
            Self::Book(_) => "book",
        }
    }

    pub fn into_books(self) -> ApiResult<(Vec<BookRecord>, i64)> {
        match self {
            Self::Books { list, count } => Ok((list, count)),
            other => Err(unexpected("books", &other)),
        }
    }

    pub fn into_series(self) -> ApiResult<(Vec<BookSeries>, i64)> {
        match self {
            Self::Series { list, count } => Ok((list, count)),
            other => Err(unexpected("series", &other)),
        }
    }

    pub fn into_author_list(self) -> ApiResult<(Vec<Author>, i64)> {
        match self {
            Self::AuthorList { list, count } => Ok((list, count)),
            other => Err(unexpected("author list", &other)),
        }
    }

    pub fn into_authors(self) -> ApiResult<Vec<Author>> {
        match self {
            Self::Authors(authors) => Ok(authors),
            other => Err(unexpected("authors", &other)),
        }
    }

    pub fn into_reviews(self) -> ApiResult<Vec<Review>> {
        match self {
            Self::Reviews(reviews) => Ok(reviews),
            other => Err(unexpected("reviews", &other)),
        }
    }

    pub fn into_book(self) -> ApiResult<Option<BookRecord>> {
        match self {
            Self::Book(book) => Ok(book),
            other => Err(unexpected("book", &other)),
        }
    }
}

fn unexpected(wanted: &str, got: &LoadSlice) -> ApiError {
    ApiError::Internal(format!(
        "load resolved to an unexpected slice: wanted {}, got {}",
        wanted,
        got.variant_name()
    ))
}
