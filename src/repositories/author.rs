//! Author repository

use sqlx::PgPool;

use super::map_write_error;
use crate::error::{ApiError, ApiResult};
use crate::models::Author;

/// Repository for author database operations
#[derive(Clone)]
pub struct AuthorRepository {
    pool: PgPool,
}

impl AuthorRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Look up authors by name. Rows come back in table order; callers
    /// compare against their input to detect missing names.
    pub async fn find_by_names(&self, names: &[String]) -> ApiResult<Vec<Author>> {
        sqlx::query_as::<_, Author>("SELECT id, name FROM \"authors\" WHERE name = ANY($1)")
            .bind(names)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("author lookup"))
    }

    /// Insert a new author; the name is unique.
    pub async fn create(&self, name: &str) -> ApiResult<Author> {
        sqlx::query_as::<_, Author>(
            "INSERT INTO authors (name) VALUES ($1) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| map_write_error(err, "author insert", name))
    }
}
