//! Author model

use serde::Serialize;
use sqlx::postgres::PgRow;

use super::get_or_default;

/// Author record from the authors table
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct Author {
    /// Unique author identifier
    pub id: i64,

    /// Author name, unique across the table
    pub name: String,
}

impl Author {
    /// Decode an author from a projected row, tolerating pruned columns.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: get_or_default(row, "id")?,
            name: get_or_default(row, "name")?,
        })
    }
}

/// One row of the batched junction fetch: the owning book id alongside the
/// author columns, so the loader can hand each book its own author slice.
#[derive(Debug, Clone, Serialize)]
pub struct BookAuthorRow {
    pub book_id: i64,
    pub author: Author,
}

impl BookAuthorRow {
    /// Decode a junction row; author columns tolerate pruning.
    pub fn from_projected_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            book_id: get_or_default(row, "book_id")?,
            author: Author::from_projected_row(row)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn author_serialization() {
        let author = Author {
            id: 1,
            name: "J.K. Rowling".to_string(),
        };
        let json = serde_json::to_string(&author).expect("serialization should succeed");
        assert!(json.contains("J.K. Rowling"));
    }
}
