//! Book repository
//!
//! Create and update run inside short-lived transactions: the book write
//! and its junction writes either land together or roll back together.
//! Uniqueness violations surface as duplicate-key errors carrying the
//! attempted title.

use sqlx::PgPool;

use super::map_write_error;
use crate::error::{ApiError, ApiResult};
use crate::models::Book;

const BOOK_COLUMNS: &str = "id, title, series_id";

/// Repository for book database operations
#[derive(Clone)]
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a book by its unique id.
    pub async fn find_by_id(&self, book_id: i64) -> ApiResult<Option<Book>> {
        let sql = format!("SELECT {} FROM \"books\" WHERE id = $1", BOOK_COLUMNS);
        sqlx::query_as::<_, Book>(&sql)
            .bind(book_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(ApiError::database("book read"))
    }

    /// Insert a new book and its author links in one transaction.
    pub async fn create(&self, title: &str, author_ids: &[i64]) -> ApiResult<Book> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(ApiError::database("begin"))?;

        let sql = format!(
            "INSERT INTO books (title) VALUES ($1) RETURNING {}",
            BOOK_COLUMNS
        );
        let inserted = sqlx::query_as::<_, Book>(&sql)
            .bind(title)
            .fetch_one(&mut *tx)
            .await;
        let book = match inserted {
            Ok(book) => book,
            Err(err) => {
                tx.rollback().await.ok();
                return Err(map_write_error(err, "book insert", title));
            }
        };

        let linked = sqlx::query(
            "INSERT INTO book_authors (book_id, author_id) \
             SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING",
        )
        .bind(book.id)
        .bind(author_ids)
        .execute(&mut *tx)
        .await;
        if let Err(err) = linked {
            tx.rollback().await.ok();
            return Err(ApiError::database("book author link")(err));
        }

        tx.commit().await.map_err(ApiError::database("commit"))?;
        Ok(book)
    }

    /// Update a book's title and/or reassign its author set in one
    /// transaction. Author reassignment removes links outside the new set
    /// before inserting the missing ones.
    pub async fn update(
        &self,
        book_id: i64,
        title: Option<&str>,
        author_ids: Option<&[i64]>,
    ) -> ApiResult<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(ApiError::database("begin"))?;

        if let Some(author_ids) = author_ids {
            let pruned = sqlx::query(
                "DELETE FROM book_authors WHERE book_id = $1 AND author_id <> ALL($2)",
            )
            .bind(book_id)
            .bind(author_ids)
            .execute(&mut *tx)
            .await;
            if let Err(err) = pruned {
                tx.rollback().await.ok();
                return Err(ApiError::database("book author unlink")(err));
            }
        }

        if let Some(title) = title {
            let updated = sqlx::query("UPDATE books SET title = $1 WHERE id = $2")
                .bind(title)
                .bind(book_id)
                .execute(&mut *tx)
                .await;
            if let Err(err) = updated {
                tx.rollback().await.ok();
                return Err(map_write_error(err, "book update", title));
            }
        }

        if let Some(author_ids) = author_ids {
            let linked = sqlx::query(
                "INSERT INTO book_authors (book_id, author_id) \
                 SELECT $1, unnest($2::bigint[]) ON CONFLICT DO NOTHING",
            )
            .bind(book_id)
            .bind(author_ids)
            .execute(&mut *tx)
            .await;
            if let Err(err) = linked {
                tx.rollback().await.ok();
                return Err(ApiError::database("book author link")(err));
            }
        }

        tx.commit().await.map_err(ApiError::database("commit"))
    }

    /// Delete a book; junction rows and reviews cascade.
    pub async fn delete(&self, book_id: i64) -> ApiResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = $1")
            .bind(book_id)
            .execute(&self.pool)
            .await
            .map_err(ApiError::database("book delete"))?;
        if result.rows_affected() != 1 {
            return Err(ApiError::not_found("book", book_id));
        }
        Ok(())
    }
}
