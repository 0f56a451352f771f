//! Author mutations

use async_graphql::{Context, InputObject, Object, Result};

use crate::graphql::types::Author;
use crate::repositories::AuthorRepository;

use super::to_graphql_error;

/// Input for creating a new author
#[derive(Debug, Clone, InputObject)]
pub struct NewAuthor {
    pub name: String,
}

/// Author mutations
#[derive(Default)]
pub struct AuthorMutation;

#[Object]
impl AuthorMutation {
    /// Create a new author; the name must be unique
    async fn create_author(&self, ctx: &Context<'_>, input: NewAuthor) -> Result<Author> {
        let repo = ctx.data::<AuthorRepository>()?;
        let author = repo.create(&input.name).await.map_err(to_graphql_error)?;
        Ok(Author::from(author))
    }
}
