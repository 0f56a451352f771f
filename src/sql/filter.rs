//! Filter and pagination compilation
//!
//! Translates the declarative filter values recognised by the API into SQL
//! predicate clauses with positional parameters. Clauses keep their
//! declaration order so the resulting group signature is stable under
//! equivalent inputs. Values never appear in the SQL text; every one goes
//! through the parameter vector.

use super::statement::SqlValue;

/// Comparison operator for text filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Like,
    NotLike,
    Eq,
    NotEq,
}

impl TextOp {
    /// SQL comparison for a direct predicate.
    pub fn comparison(self) -> &'static str {
        match self {
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Eq => "=",
            Self::NotEq => "<>",
        }
    }

    /// Negative operators flip membership checks to `NOT IN`.
    pub fn is_negative(self) -> bool {
        matches!(self, Self::NotLike | Self::NotEq)
    }

    /// The positive counterpart used inside membership subqueries.
    pub fn positive(self) -> Self {
        match self {
            Self::NotLike => Self::Like,
            Self::NotEq => Self::Eq,
            other => other,
        }
    }
}

/// Text filter argument: one operator plus the comparison value.
#[derive(Debug, Clone)]
pub struct TextFilter {
    pub op: TextOp,
    pub value: String,
}

/// Integer range filter argument; both bounds optional.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntRangeFilter {
    pub min: Option<i64>,
    pub max: Option<i64>,
}

/// One AND-joined predicate: SQL fragment with `?` markers plus its params.
#[derive(Debug, Clone)]
pub struct FilterClause {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// An ordered list of predicate clauses plus the joins they require.
#[derive(Debug, Clone, Default)]
pub struct FilterFragment {
    pub clauses: Vec<FilterClause>,
    pub joins: Vec<&'static str>,
    pub needs_distinct: bool,
}

impl FilterFragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// `<col> <op> ?` text predicate.
    pub fn text(&mut self, column: &str, filter: &TextFilter) {
        self.clauses.push(FilterClause {
            sql: format!("{} {} ?", column, filter.op.comparison()),
            params: vec![SqlValue::Text(filter.value.clone())],
        });
    }

    /// Correlated membership check through a subquery.
    ///
    /// Positive operators emit `<outer> IN (<select> WHERE <col> <op> ?)`;
    /// negative operators emit `NOT IN` with the positive operator applied
    /// inside the subquery.
    pub fn text_subquery(
        &mut self,
        outer_column: &str,
        inner_select: &str,
        inner_column: &str,
        filter: &TextFilter,
    ) {
        let membership = if filter.op.is_negative() {
            "NOT IN"
        } else {
            "IN"
        };
        self.clauses.push(FilterClause {
            sql: format!(
                "{} {} ({} WHERE {} {} ?)",
                outer_column,
                membership,
                inner_select,
                inner_column,
                filter.op.positive().comparison()
            ),
            params: vec![SqlValue::Text(filter.value.clone())],
        });
    }

    /// `<col> >= ?` and/or `<col> <= ?` range predicate.
    pub fn int_range(&mut self, column: &str, filter: &IntRangeFilter) {
        if let Some(min) = filter.min {
            self.clauses.push(FilterClause {
                sql: format!("{} >= ?", column),
                params: vec![SqlValue::Int(min)],
            });
        }
        if let Some(max) = filter.max {
            self.clauses.push(FilterClause {
                sql: format!("{} <= ?", column),
                params: vec![SqlValue::Int(max)],
            });
        }
    }

    /// Exact-match id predicate.
    pub fn id_eq(&mut self, column: &str, id: i64) {
        self.clauses.push(FilterClause {
            sql: format!("{} = ?", column),
            params: vec![SqlValue::Int(id)],
        });
    }

    /// Id-set membership via the driver's array form.
    pub fn id_in(&mut self, column: &str, ids: &[i64]) {
        self.clauses.push(FilterClause {
            sql: format!("{} = ANY(?)", column),
            params: vec![SqlValue::IntArray(ids.to_vec())],
        });
    }

    /// Record a join this filter depends on. One-to-many joins can multiply
    /// root rows, so they force DISTINCT on the selection.
    pub fn require_join(&mut self, join: &'static str, multiplying: bool) {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
        if multiplying {
            self.needs_distinct = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_clause(fragment: &FilterFragment) -> &FilterClause {
        assert_eq!(fragment.clauses.len(), 1);
        &fragment.clauses[0]
    }

    #[test]
    fn text_ops_compile_to_expected_comparisons() {
        let cases = [
            (TextOp::Like, "\"books\".\"title\" LIKE ?"),
            (TextOp::NotLike, "\"books\".\"title\" NOT LIKE ?"),
            (TextOp::Eq, "\"books\".\"title\" = ?"),
            (TextOp::NotEq, "\"books\".\"title\" <> ?"),
        ];
        for (op, expected) in cases {
            let mut fragment = FilterFragment::new();
            fragment.text(
                "\"books\".\"title\"",
                &TextFilter {
                    op,
                    value: "%Harry%".to_string(),
                },
            );
            assert_eq!(single_clause(&fragment).sql, expected);
        }
    }

    #[test]
    fn subquery_positive_op_emits_in() {
        let mut fragment = FilterFragment::new();
        fragment.text_subquery(
            "books.id",
            "SELECT book_id FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id",
            "authors.name",
            &TextFilter {
                op: TextOp::Eq,
                value: "Lord Voldermort".to_string(),
            },
        );
        assert_eq!(
            single_clause(&fragment).sql,
            "books.id IN (SELECT book_id FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id WHERE authors.name = ?)"
        );
    }

    #[test]
    fn subquery_negative_op_emits_not_in_with_positive_inner() {
        let mut fragment = FilterFragment::new();
        fragment.text_subquery(
            "books.id",
            "SELECT book_id FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id",
            "authors.name",
            &TextFilter {
                op: TextOp::NotLike,
                value: "%Voldermort%".to_string(),
            },
        );
        let clause = single_clause(&fragment);
        assert!(clause.sql.contains("NOT IN"));
        assert!(clause.sql.ends_with("WHERE authors.name LIKE ?)"));
    }

    #[test]
    fn int_range_min_uses_gte_and_max_uses_lte() {
        let mut fragment = FilterFragment::new();
        fragment.int_range(
            "\"reviews\".\"star\"",
            &IntRangeFilter {
                min: Some(3),
                max: Some(5),
            },
        );
        assert_eq!(fragment.clauses.len(), 2);
        assert_eq!(fragment.clauses[0].sql, "\"reviews\".\"star\" >= ?");
        assert_eq!(fragment.clauses[0].params, vec![SqlValue::Int(3)]);
        assert_eq!(fragment.clauses[1].sql, "\"reviews\".\"star\" <= ?");
        assert_eq!(fragment.clauses[1].params, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn int_range_single_bound() {
        let mut fragment = FilterFragment::new();
        fragment.int_range("star", &IntRangeFilter { min: Some(3), max: None });
        assert_eq!(single_clause(&fragment).sql, "star >= ?");

        let mut fragment = FilterFragment::new();
        fragment.int_range("star", &IntRangeFilter { min: None, max: Some(4) });
        assert_eq!(single_clause(&fragment).sql, "star <= ?");
    }

    #[test]
    fn id_in_uses_array_form() {
        let mut fragment = FilterFragment::new();
        fragment.id_in("\"book_authors\".\"book_id\"", &[1, 2, 3]);
        let clause = single_clause(&fragment);
        assert_eq!(clause.sql, "\"book_authors\".\"book_id\" = ANY(?)");
        assert_eq!(clause.params, vec![SqlValue::IntArray(vec![1, 2, 3])]);
    }

    #[test]
    fn multiplying_join_sets_distinct() {
        let mut fragment = FilterFragment::new();
        fragment.require_join("JOIN reviews ON books.id = reviews.book_id", true);
        fragment.require_join("JOIN reviews ON books.id = reviews.book_id", true);
        assert_eq!(fragment.joins.len(), 1);
        assert!(fragment.needs_distinct);
    }

    #[test]
    fn clause_order_follows_declaration_order() {
        let mut fragment = FilterFragment::new();
        fragment.id_eq("books.id", 7);
        fragment.text(
            "books.title",
            &TextFilter {
                op: TextOp::Like,
                value: "%x%".to_string(),
            },
        );
        assert!(fragment.clauses[0].sql.starts_with("books.id"));
        assert!(fragment.clauses[1].sql.starts_with("books.title"));
    }
}
