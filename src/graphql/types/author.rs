//! Author GraphQL type

use async_graphql::Object;

use crate::models::Author as DbAuthor;

/// Author exposed via GraphQL
pub struct Author {
    inner: DbAuthor,
}

impl From<DbAuthor> for Author {
    fn from(author: DbAuthor) -> Self {
        Self { inner: author }
    }
}

#[Object]
impl Author {
    /// Unique author identifier
    async fn id(&self) -> i64 {
        self.inner.id
    }

    /// Author name
    async fn name(&self) -> &str {
        &self.inner.name
    }
}

/// Author list envelope with its total count
pub struct AuthorList {
    pub count: i64,
    pub authors: Vec<DbAuthor>,
}

#[Object]
impl AuthorList {
    /// Total number of authors matching the filter, ignoring pagination
    async fn count(&self) -> i64 {
        self.count
    }

    /// The requested page of authors
    async fn list(&self) -> Vec<Author> {
        self.authors.iter().cloned().map(Author::from).collect()
    }
}
