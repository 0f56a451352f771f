//! Error handling for the Libris API
//!
//! This module provides the unified error type for the service, along with
//! structural classification of PostgreSQL uniqueness violations so that
//! mutations can surface `duplicate key <table>.<column> "<value>"` messages
//! instead of raw driver errors.

use thiserror::Error;

/// SQLSTATE class for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Legacy driver message prefix used when no structured code is available.
const DUPLICATE_KEY_MESSAGE: &str = "duplicate key value violates unique constraint";

/// Main API error type
#[derive(Error, Debug)]
pub enum ApiError {
    /// Referenced entity does not exist
    #[error("{entity} with id '{id}' does not exist")]
    NotFound { entity: &'static str, id: String },

    /// Uniqueness constraint violation on write
    #[error("duplicate key {table}.{column} \"{value}\"")]
    DuplicateKey {
        table: &'static str,
        column: &'static str,
        value: String,
    },

    /// Input arguments do not satisfy declared invariants
    #[error("{0}")]
    Validation(String),

    /// Any other database error, wrapped with the statement kind
    #[error("database error during {statement}: {source}")]
    Database {
        statement: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// Request context cancelled before dispatch
    #[error("request cancelled")]
    Cancelled,

    /// Loader invariant violation; should never reach users
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// Create a not-found error for a specific entity
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Wrap a driver error with the kind of statement that produced it.
    ///
    /// Intended for `map_err(ApiError::database("book list"))`.
    pub fn database(statement: &'static str) -> impl FnOnce(sqlx::Error) -> Self {
        move |source| Self::Database { statement, source }
    }

    /// Validation error for author names that do not exist.
    ///
    /// Multiple names are joined the way the messages read in practice:
    /// `author with name 'A', 'B' does not exist`.
    pub fn unknown_authors(missing: &[String]) -> Self {
        Self::Validation(format!(
            "author with name '{}' does not exist",
            missing.join("', '")
        ))
    }
}

/// Classify a driver error as a uniqueness violation.
///
/// Returns the `(table, column)` the violated constraint protects, or `None`
/// when the error is not a recognised unique violation. Classification is
/// structural (SQLSTATE 23505 plus the constraint name); the quoted
/// constraint name in the message text is a fallback for drivers that do not
/// report it separately.
pub fn unique_violation(err: &sqlx::Error) -> Option<(&'static str, &'static str)> {
    let db = match err {
        sqlx::Error::Database(db) => db,
        _ => return None,
    };
    if db.code().as_deref() == Some(UNIQUE_VIOLATION) {
        if let Some(constraint) = db.constraint() {
            return constraint_target(constraint);
        }
        return parse_constraint(db.message()).and_then(|c| constraint_target(&c));
    }
    if db.message().contains(DUPLICATE_KEY_MESSAGE) {
        tracing::warn!(
            message = db.message(),
            "classifying duplicate key from message text, driver reported no SQLSTATE"
        );
        return parse_constraint(db.message()).and_then(|c| constraint_target(&c));
    }
    None
}

/// Map a constraint name to the table and column it protects.
fn constraint_target(name: &str) -> Option<(&'static str, &'static str)> {
    match name {
        "books_title_key" | "idx_books_title" => Some(("books", "title")),
        "authors_name_key" | "idx_authors_name" => Some(("authors", "name")),
        "book_series_title_key" | "idx_book_series_title" => Some(("book_series", "title")),
        _ => None,
    }
}

/// Extract the quoted constraint name from a driver message.
fn parse_constraint(message: &str) -> Option<String> {
    let rest = message.split(DUPLICATE_KEY_MESSAGE).nth(1)?;
    let start = rest.find('"')? + 1;
    let end = rest[start..].find('"')? + start;
    Some(rest[start..end].to_string())
}

/// Result type alias for API operations
pub type ApiResult<T> = Result<T, ApiError>;
