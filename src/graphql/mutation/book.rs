//! Book mutations
//!
//! Create and update follow the same shape: precheck the referenced
//! authors, write inside a short transaction, then re-read the book through
//! the batch loader so the response resolves like any other read.

use async_graphql::{Context, InputObject, Object, Result};

use crate::error::ApiError;
use crate::graphql::loaders::load_book_by_id;
use crate::graphql::types::Book;
use crate::models::{Author, BookRecord};
use crate::repositories::{AuthorRepository, BookRepository};

use super::to_graphql_error;

/// Input for creating a new book
#[derive(Debug, Clone, InputObject)]
pub struct NewBook {
    pub title: String,
    /// Names of existing authors to link
    #[graphql(name = "authors_name")]
    pub authors_name: Vec<String>,
}

/// Input for updating an existing book
#[derive(Debug, Clone, InputObject)]
pub struct UpdateBook {
    pub id: i64,
    pub title: Option<String>,
    /// When present, the book's author set is reassigned to exactly these
    #[graphql(name = "authors_name")]
    pub authors_name: Option<Vec<String>>,
}

/// Resolve author names against the table, insisting every name exists.
async fn lookup_authors(repo: &AuthorRepository, names: &[String]) -> Result<Vec<Author>, ApiError> {
    let authors = repo.find_by_names(names).await?;
    let missing: Vec<String> = names
        .iter()
        .filter(|name| !authors.iter().any(|author| &author.name == *name))
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ApiError::unknown_authors(&missing));
    }
    Ok(authors)
}

/// Book mutations
#[derive(Default)]
pub struct BookMutation;

#[Object]
impl BookMutation {
    /// Create a new book linked to existing authors
    async fn create_book(&self, ctx: &Context<'_>, input: NewBook) -> Result<Book> {
        let authors = ctx.data::<AuthorRepository>()?;
        let books = ctx.data::<BookRepository>()?;

        let linked = lookup_authors(authors, &input.authors_name)
            .await
            .map_err(to_graphql_error)?;
        let author_ids: Vec<i64> = linked.iter().map(|author| author.id).collect();

        let book = books
            .create(&input.title, &author_ids)
            .await
            .map_err(to_graphql_error)?;

        let record = load_book_by_id(ctx, book.id)
            .await?
            .ok_or_else(|| to_graphql_error(ApiError::not_found("book", book.id)))?;
        Ok(Book::from(record))
    }

    /// Update a book's title and/or reassign its authors
    async fn update_book(&self, ctx: &Context<'_>, input: UpdateBook) -> Result<Book> {
        let authors = ctx.data::<AuthorRepository>()?;
        let books = ctx.data::<BookRepository>()?;

        books
            .find_by_id(input.id)
            .await
            .map_err(to_graphql_error)?
            .ok_or_else(|| to_graphql_error(ApiError::not_found("book", input.id)))?;

        let author_ids = match &input.authors_name {
            Some(names) => {
                let linked = lookup_authors(authors, names)
                    .await
                    .map_err(to_graphql_error)?;
                Some(linked.iter().map(|author| author.id).collect::<Vec<i64>>())
            }
            None => None,
        };

        books
            .update(input.id, input.title.as_deref(), author_ids.as_deref())
            .await
            .map_err(to_graphql_error)?;

        let record = load_book_by_id(ctx, input.id)
            .await?
            .ok_or_else(|| to_graphql_error(ApiError::not_found("book", input.id)))?;
        Ok(Book::from(record))
    }

    /// Delete a book together with its author links and reviews
    async fn delete_book(&self, ctx: &Context<'_>, id: i64) -> Result<Book> {
        let books = ctx.data::<BookRepository>()?;

        let book = books
            .find_by_id(id)
            .await
            .map_err(to_graphql_error)?
            .ok_or_else(|| to_graphql_error(ApiError::not_found("book", id)))?;

        books.delete(id).await.map_err(to_graphql_error)?;

        Ok(Book::from(BookRecord { book, series: None }))
    }
}
