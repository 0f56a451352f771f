//! Filter input types
//!
//! The declarative filter arguments recognised on the query boundary,
//! together with their compilation into SQL predicate fragments. Wire names
//! keep the original snake_case contract (`author_name`, `authors_name`).

use async_graphql::{Enum, InputObject};

use crate::sql::filter::{FilterFragment, IntRangeFilter, TextFilter, TextOp};

/// Join required when filtering books by review stars. One-to-many, so it
/// can multiply book rows and forces DISTINCT.
const BOOK_REVIEWS_JOIN: &str = "JOIN reviews ON books.id = reviews.book_id";

/// Subquery over the junction used by the author-name filter.
const BOOK_AUTHORS_SUBQUERY: &str =
    "SELECT book_id FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id";

/// Text comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
#[graphql(name = "FilterTextOp")]
pub enum FilterTextOp {
    Like,
    NotLike,
    Eq,
    NotEq,
}

impl From<FilterTextOp> for TextOp {
    fn from(op: FilterTextOp) -> Self {
        match op {
            FilterTextOp::Like => TextOp::Like,
            FilterTextOp::NotLike => TextOp::NotLike,
            FilterTextOp::Eq => TextOp::Eq,
            FilterTextOp::NotEq => TextOp::NotEq,
        }
    }
}

/// Text filter argument
#[derive(Debug, Clone, InputObject)]
#[graphql(name = "FilterText")]
pub struct FilterTextInput {
    pub op: FilterTextOp,
    pub value: String,
}

impl FilterTextInput {
    fn to_filter(&self) -> TextFilter {
        TextFilter {
            op: self.op.into(),
            value: self.value.clone(),
        }
    }
}

/// Integer range filter argument; both bounds optional
#[derive(Debug, Clone, Copy, InputObject)]
#[graphql(name = "FilterIntRange")]
pub struct FilterIntRangeInput {
    pub min: Option<i32>,
    pub max: Option<i32>,
}

impl FilterIntRangeInput {
    fn to_filter(self) -> IntRangeFilter {
        IntRangeFilter {
            min: self.min.map(i64::from),
            max: self.max.map(i64::from),
        }
    }
}

/// Filter arguments for the books query
#[derive(Debug, Clone, Default, InputObject)]
pub struct BookFilter {
    pub id: Option<i64>,
    pub title: Option<FilterTextInput>,
    #[graphql(name = "author_name")]
    pub author_name: Option<FilterTextInput>,
    pub star: Option<FilterIntRangeInput>,
}

impl BookFilter {
    /// Compile into predicate clauses, in declared filter order.
    pub fn compile(&self) -> FilterFragment {
        let mut fragment = FilterFragment::new();
        if let Some(id) = self.id {
            fragment.id_eq("books.id", id);
        }
        if let Some(title) = &self.title {
            fragment.text("books.title", &title.to_filter());
        }
        if let Some(author_name) = &self.author_name {
            fragment.text_subquery(
                "books.id",
                BOOK_AUTHORS_SUBQUERY,
                "authors.name",
                &author_name.to_filter(),
            );
        }
        if let Some(star) = &self.star {
            if star.min.is_some() || star.max.is_some() {
                fragment.require_join(BOOK_REVIEWS_JOIN, true);
                fragment.int_range("\"reviews\".\"star\"", &star.to_filter());
            }
        }
        fragment
    }
}

/// Filter arguments for the authors query
#[derive(Debug, Clone, Default, InputObject)]
pub struct AuthorFilter {
    pub id: Option<i64>,
    pub name: Option<FilterTextInput>,
}

impl AuthorFilter {
    pub fn compile(&self) -> FilterFragment {
        let mut fragment = FilterFragment::new();
        if let Some(id) = self.id {
            fragment.id_eq("authors.id", id);
        }
        if let Some(name) = &self.name {
            fragment.text("authors.name", &name.to_filter());
        }
        fragment
    }
}

/// Filter arguments for the book series query
#[derive(Debug, Clone, Default, InputObject)]
pub struct BookSeriesFilter {
    pub id: Option<i64>,
    pub title: Option<FilterTextInput>,
}

impl BookSeriesFilter {
    pub fn compile(&self) -> FilterFragment {
        let mut fragment = FilterFragment::new();
        if let Some(id) = self.id {
            fragment.id_eq("book_series.id", id);
        }
        if let Some(title) = &self.title {
            fragment.text("book_series.title", &title.to_filter());
        }
        fragment
    }
}

/// Filter arguments for nested review lists
#[derive(Debug, Clone, Copy, Default, InputObject)]
pub struct ReviewFilter {
    pub star: Option<FilterIntRangeInput>,
}

impl ReviewFilter {
    pub fn compile(&self) -> FilterFragment {
        let mut fragment = FilterFragment::new();
        if let Some(star) = &self.star {
            fragment.int_range("\"reviews\".\"star\"", &star.to_filter());
        }
        fragment
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn book_filter_clause_order_is_declaration_order() {
        let filter = BookFilter {
            id: Some(1),
            title: Some(FilterTextInput {
                op: FilterTextOp::Like,
                value: "%x%".to_string(),
            }),
            author_name: Some(FilterTextInput {
                op: FilterTextOp::Eq,
                value: "a".to_string(),
            }),
            star: Some(FilterIntRangeInput {
                min: Some(3),
                max: None,
            }),
        };
        let fragment = filter.compile();
        assert_eq!(fragment.clauses.len(), 4);
        assert!(fragment.clauses[0].sql.starts_with("books.id ="));
        assert!(fragment.clauses[1].sql.starts_with("books.title LIKE"));
        assert!(fragment.clauses[2].sql.starts_with("books.id IN"));
        assert!(fragment.clauses[3].sql.starts_with("\"reviews\".\"star\" >="));
        assert!(fragment.needs_distinct);
        assert_eq!(fragment.joins, vec![BOOK_REVIEWS_JOIN]);
    }

    #[test]
    fn empty_star_range_adds_neither_join_nor_clause() {
        let filter = BookFilter {
            star: Some(FilterIntRangeInput {
                min: None,
                max: None,
            }),
            ..Default::default()
        };
        let fragment = filter.compile();
        assert!(fragment.is_empty());
        assert!(fragment.joins.is_empty());
    }

    #[test]
    fn review_filter_compiles_star_range() {
        let filter = ReviewFilter {
            star: Some(FilterIntRangeInput {
                min: Some(3),
                max: Some(5),
            }),
        };
        let fragment = filter.compile();
        assert_eq!(fragment.clauses.len(), 2);
    }
}
