//! Projection planning from GraphQL selection trees
//!
//! The planner collapses the selection subtree of one resolver invocation
//! into the minimal column list for its base table, plus directives telling
//! the resolver adapter which child selections need joins and which need
//! their own batched loads.

/// One node of the selection tree handed to a resolver.
///
/// Built once per invocation from the executor's field lookahead and
/// consumed read-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub name: String,
    pub children: Vec<Selection>,
}

impl Selection {
    /// Leaf field with no sub-selection.
    pub fn field(name: &str) -> Self {
        Self {
            name: name.to_string(),
            children: Vec::new(),
        }
    }

    /// Field with a sub-selection.
    pub fn with_children(name: &str, children: Vec<Selection>) -> Self {
        Self {
            name: name.to_string(),
            children,
        }
    }
}

/// How a graph field maps onto physical storage.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Scalar backed by a column on the entity's base table
    Column(&'static str),
    /// Many-to-one relation materialised by joining the related table and
    /// projecting its columns alongside the root's
    Embedded {
        table: &'static str,
        /// Alias prefix for projected columns (`<prefix>__<col>`)
        prefix: &'static str,
        id_column: &'static str,
        /// Graph field name → physical column on the embedded table
        columns: &'static [(&'static str, &'static str)],
        join: &'static str,
    },
    /// Child rows keyed by a parent-id column; fetched by a secondary load
    OneToMany(&'static str),
    /// Relation through a junction table; fetched by a secondary load
    ManyToMany(&'static str),
    /// Parent entity reachable from a foreign key; fetched by a secondary load
    BackReference(&'static str),
}

/// Maps one entity's graph fields to physical storage.
#[derive(Debug, Clone, Copy)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub id_column: &'static str,
    pub fields: &'static [(&'static str, FieldKind)],
}

impl EntityDescriptor {
    fn kind(&self, name: &str) -> Option<FieldKind> {
        self.fields
            .iter()
            .find(|(field, _)| *field == name)
            .map(|(_, kind)| *kind)
    }
}

/// The planner's output for one resolver invocation.
#[derive(Debug, Clone, Default)]
pub struct ProjectionPlan {
    /// Ordered, qualified (and for embedded tables, aliased) column list
    pub columns: Vec<String>,
    /// Required join clauses in first-required order, deduplicated
    pub joins: Vec<&'static str>,
    /// Relation names whose data must come from their own batched load
    pub secondary: Vec<&'static str>,
    /// Selection asked for a `count` sibling next to `list`
    pub needs_count: bool,
    /// A row-multiplying join requires DISTINCT on the root
    pub needs_distinct: bool,
}

impl ProjectionPlan {
    fn push_column(&mut self, column: String) {
        if !self.columns.contains(&column) {
            self.columns.push(column);
        }
    }

    fn push_join(&mut self, join: &'static str) {
        if !self.joins.contains(&join) {
            self.joins.push(join);
        }
    }
}

/// Qualify a column with its table: `"books"."id"`.
pub fn qualify(table: &str, column: &str) -> String {
    format!("\"{}\".\"{}\"", table, column)
}

/// Plan a plain entity selection (the fields of one object).
///
/// The root id column is always projected, selected or not, so batched
/// results can be demultiplexed back to their parents. Unknown fields are
/// ignored; the executor has already validated the query.
pub fn plan_entity(selection: &[Selection], entity: &EntityDescriptor) -> ProjectionPlan {
    let mut plan = ProjectionPlan::default();
    plan.push_column(qualify(entity.table, entity.id_column));
    for child in selection {
        match entity.kind(&child.name) {
            Some(FieldKind::Column(column)) => {
                plan.push_column(qualify(entity.table, column));
            }
            Some(FieldKind::Embedded {
                table,
                prefix,
                id_column,
                columns,
                join,
            }) => {
                plan.push_join(join);
                plan.push_column(embedded_column(table, prefix, id_column));
                for grandchild in &child.children {
                    if let Some((_, column)) =
                        columns.iter().find(|(field, _)| *field == grandchild.name)
                    {
                        plan.push_column(embedded_column(table, prefix, column));
                    }
                }
            }
            Some(
                FieldKind::OneToMany(relation)
                | FieldKind::ManyToMany(relation)
                | FieldKind::BackReference(relation),
            ) => {
                if !plan.secondary.contains(&relation) {
                    plan.secondary.push(relation);
                }
            }
            None => {}
        }
    }
    plan
}

/// Plan a list envelope selection (`count` and `list` siblings).
pub fn plan_list(selection: &[Selection], entity: &EntityDescriptor) -> ProjectionPlan {
    let mut plan = match selection.iter().find(|s| s.name == "list") {
        Some(list) => plan_entity(&list.children, entity),
        None => {
            let mut empty = ProjectionPlan::default();
            empty.push_column(qualify(entity.table, entity.id_column));
            empty
        }
    };
    plan.needs_count = selection.iter().any(|s| s.name == "count");
    plan
}

fn embedded_column(table: &str, prefix: &str, column: &str) -> String {
    format!("{} AS \"{}__{}\"", qualify(table, column), prefix, column)
}

// Entity descriptors for the five tables.

pub const BOOK: EntityDescriptor = EntityDescriptor {
    table: "books",
    id_column: "id",
    fields: &[
        ("id", FieldKind::Column("id")),
        ("title", FieldKind::Column("title")),
        (
            "series",
            FieldKind::Embedded {
                table: "book_series",
                prefix: "series",
                id_column: "id",
                columns: &[("id", "id"), ("title", "title")],
                join: "LEFT JOIN book_series ON books.series_id = book_series.id",
            },
        ),
        ("authors", FieldKind::ManyToMany("authors")),
        ("reviews", FieldKind::OneToMany("reviews")),
    ],
};

pub const AUTHOR: EntityDescriptor = EntityDescriptor {
    table: "authors",
    id_column: "id",
    fields: &[
        ("id", FieldKind::Column("id")),
        ("name", FieldKind::Column("name")),
    ],
};

pub const REVIEW: EntityDescriptor = EntityDescriptor {
    table: "reviews",
    id_column: "id",
    fields: &[
        ("id", FieldKind::Column("id")),
        ("star", FieldKind::Column("star")),
        ("text", FieldKind::Column("text")),
        ("book", FieldKind::BackReference("book")),
    ],
};

pub const BOOK_SERIES: EntityDescriptor = EntityDescriptor {
    table: "book_series",
    id_column: "id",
    fields: &[
        ("id", FieldKind::Column("id")),
        ("title", FieldKind::Column("title")),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_fields_project_qualified_columns() {
        let selection = vec![Selection::field("id"), Selection::field("title")];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(plan.columns, vec![r#""books"."id""#, r#""books"."title""#]);
        assert!(plan.joins.is_empty());
        assert!(plan.secondary.is_empty());
    }

    #[test]
    fn root_id_projected_even_when_not_selected() {
        let selection = vec![Selection::field("title")];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(plan.columns[0], r#""books"."id""#);
    }

    #[test]
    fn relations_become_secondary_fetches() {
        let selection = vec![
            Selection::field("id"),
            Selection::with_children("authors", vec![Selection::field("name")]),
            Selection::with_children("reviews", vec![Selection::field("star")]),
        ];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(plan.columns, vec![r#""books"."id""#]);
        assert_eq!(plan.secondary, vec!["authors", "reviews"]);
    }

    #[test]
    fn embedded_series_projects_aliased_columns_and_join() {
        let selection = vec![
            Selection::field("title"),
            Selection::with_children("series", vec![Selection::field("title")]),
        ];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(
            plan.columns,
            vec![
                r#""books"."id""#,
                r#""books"."title""#,
                r#""book_series"."id" AS "series__id""#,
                r#""book_series"."title" AS "series__title""#,
            ]
        );
        assert_eq!(
            plan.joins,
            vec!["LEFT JOIN book_series ON books.series_id = book_series.id"]
        );
    }

    #[test]
    fn unknown_fields_are_ignored() {
        let selection = vec![Selection::field("id"), Selection::field("__typename")];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(plan.columns, vec![r#""books"."id""#]);
    }

    #[test]
    fn list_envelope_sets_needs_count() {
        let selection = vec![
            Selection::field("count"),
            Selection::with_children("list", vec![Selection::field("title")]),
        ];
        let plan = plan_list(&selection, &BOOK);
        assert!(plan.needs_count);
        assert_eq!(plan.columns, vec![r#""books"."id""#, r#""books"."title""#]);
    }

    #[test]
    fn count_only_envelope_still_projects_root_id() {
        let selection = vec![Selection::field("count")];
        let plan = plan_list(&selection, &BOOK);
        assert!(plan.needs_count);
        assert_eq!(plan.columns, vec![r#""books"."id""#]);
    }

    #[test]
    fn duplicate_selections_do_not_duplicate_columns() {
        let selection = vec![
            Selection::field("id"),
            Selection::field("id"),
            Selection::field("title"),
        ];
        let plan = plan_entity(&selection, &BOOK);
        assert_eq!(plan.columns.len(), 2);
    }
}
