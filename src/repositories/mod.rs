//! Database repository layer
//!
//! Mutations bypass the batch loader; they run prechecks and short-lived
//! transactions through these repositories, mapping driver uniqueness
//! violations to structured duplicate-key errors carrying the attempted
//! value.

pub mod author;
pub mod book;
pub mod review;

pub use author::AuthorRepository;
pub use book::BookRepository;
pub use review::ReviewRepository;

use crate::error::{unique_violation, ApiError};

/// Map a write error: uniqueness violations become structured
/// duplicate-key errors with the value that collided; everything else is
/// wrapped with the statement kind.
pub(crate) fn map_write_error(err: sqlx::Error, statement: &'static str, value: &str) -> ApiError {
    match unique_violation(&err) {
        Some((table, column)) => ApiError::DuplicateKey {
            table,
            column,
            value: value.to_string(),
        },
        None => ApiError::Database {
            statement,
            source: err,
        },
    }
}
