//! End-to-end statement shapes for the headline scenarios
//!
//! Asserted on the statement builder's output strings; no database needed.
//! These pin the exact SQL the loader issues for the common query shapes,
//! plus the stability contract of the group signature.

use libris_api::graphql::types::filters::{
    BookFilter, FilterIntRangeInput, FilterTextInput, FilterTextOp, ReviewFilter,
};
use libris_api::sql::projection::{self, plan_entity, plan_list};
use libris_api::sql::{FilterFragment, SelectBuilder, Selection, SqlValue};

fn book_list_selection() -> Vec<Selection> {
    vec![
        Selection::field("count"),
        Selection::with_children(
            "list",
            vec![
                Selection::field("id"),
                Selection::field("title"),
                Selection::with_children(
                    "authors",
                    vec![Selection::field("id"), Selection::field("name")],
                ),
            ],
        ),
    ]
}

/// S1: `{ books { count list { id title authors { id name } } } }` issues a
/// bare count, a projected list with the default limit, and one batched
/// junction fetch over all parent ids.
#[test]
fn s1_book_list_with_embedded_authors() {
    let plan = plan_list(&book_list_selection(), &projection::BOOK);
    assert!(plan.needs_count);
    assert_eq!(plan.secondary, vec!["authors"]);

    let count = SelectBuilder::from_plan("books", &plan)
        .count_of(projection::qualify("books", "id"))
        .build();
    assert_eq!(count.sql, "SELECT count(*) FROM \"books\"");

    let list = SelectBuilder::from_plan("books", &plan)
        .limit(Some(10))
        .build();
    assert_eq!(
        list.sql,
        "SELECT \"books\".\"id\",\"books\".\"title\" FROM \"books\" LIMIT $1"
    );
    assert_eq!(list.params, vec![SqlValue::Int(10)]);
    assert!(list.group_signature.is_none());

    // the batched junction fetch mounted for the authors child
    let author_fields = vec![Selection::field("id"), Selection::field("name")];
    let author_plan = plan_entity(&author_fields, &projection::AUTHOR);
    let mut membership = FilterFragment::new();
    membership.id_in("book_authors.book_id", &[1, 2, 3, 4]);
    let junction = SelectBuilder::from_plan("authors", &author_plan)
        .leading_column(projection::qualify("book_authors", "book_id"))
        .join("JOIN book_authors ON authors.id = book_authors.author_id")
        .filters(&membership)
        .build();
    assert_eq!(
        junction.sql,
        "SELECT \"book_authors\".\"book_id\",\"authors\".\"id\",\"authors\".\"name\" \
         FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id \
         WHERE book_authors.book_id = ANY($1)"
    );
    assert!(junction.group_signature.is_some());
    assert!(junction.identity_key.ends_with("ANY({1,2,3,4})"));
}

/// S2: title LIKE plus author-name EQ compiles to one LIKE predicate and
/// one junction-subquery membership predicate, shared by the count and the
/// paginated list.
#[test]
fn s2_title_like_and_author_name_subquery() {
    let filter = BookFilter {
        id: None,
        title: Some(FilterTextInput {
            op: FilterTextOp::Like,
            value: "%Harry Potter%".to_string(),
        }),
        author_name: Some(FilterTextInput {
            op: FilterTextOp::Eq,
            value: "Lord Voldermort".to_string(),
        }),
        star: None,
    };
    let fragment = filter.compile();

    let selection = vec![
        Selection::field("count"),
        Selection::with_children(
            "list",
            vec![Selection::field("id"), Selection::field("title")],
        ),
    ];
    let plan = plan_list(&selection, &projection::BOOK);

    let count = SelectBuilder::from_plan("books", &plan)
        .count_of(projection::qualify("books", "id"))
        .filters(&fragment)
        .build();
    assert_eq!(
        count.sql,
        "SELECT count(*) FROM \"books\" \
         WHERE books.title LIKE $1 \
         AND books.id IN (SELECT book_id FROM \"authors\" JOIN book_authors ON authors.id = book_authors.author_id WHERE authors.name = $2)"
    );

    let list = SelectBuilder::from_plan("books", &plan)
        .filters(&fragment)
        .limit(Some(10))
        .build();
    assert!(list.sql.starts_with("SELECT \"books\".\"id\",\"books\".\"title\" FROM \"books\" WHERE books.title LIKE $1"));
    assert!(list.sql.ends_with("LIMIT $3"));
    assert_eq!(
        list.params,
        vec![
            SqlValue::Text("%Harry Potter%".to_string()),
            SqlValue::Text("Lord Voldermort".to_string()),
            SqlValue::Int(10),
        ]
    );
}

/// S3: sibling review loads with the same filter but different limits get
/// nil signatures, so the loader cannot merge them; without pagination the
/// signatures match and they coalesce.
#[test]
fn s3_pagination_disables_review_merging() {
    let review_fields = vec![Selection::field("id"), Selection::field("star")];
    let plan = plan_entity(&review_fields, &projection::REVIEW);
    let filter = ReviewFilter {
        star: Some(FilterIntRangeInput {
            min: Some(3),
            max: None,
        }),
    };

    let statement = |book_id: i64, limit: Option<i64>| {
        let mut membership = FilterFragment::new();
        membership.id_in("\"reviews\".\"book_id\"", &[book_id]);
        SelectBuilder::from_plan("reviews", &plan)
            .leading_column(projection::qualify("reviews", "book_id"))
            .filters(&membership)
            .filters(&filter.compile())
            .limit(limit)
            .build()
    };

    let paginated_a = statement(1, Some(1));
    let paginated_b = statement(2, Some(2));
    assert!(paginated_a.group_signature.is_none());
    assert!(paginated_b.group_signature.is_none());

    let plain_a = statement(1, None);
    let plain_b = statement(2, None);
    assert_eq!(plain_a.group_signature, plain_b.group_signature);
    assert!(plain_a.group_signature.is_some());
    assert_ne!(plain_a.identity_key, plain_b.identity_key);
    assert!(plain_a.sql.contains("\"reviews\".\"star\" >= $2"));
}

/// The signature contract: stable under equal structure, unstable under
/// any structural difference.
#[test]
fn signature_stability_contract() {
    let plan = plan_entity(
        &[Selection::field("id"), Selection::field("title")],
        &projection::BOOK,
    );

    let with_id = |id: i64| {
        let mut membership = FilterFragment::new();
        membership.id_in("books.id", &[id]);
        SelectBuilder::from_plan("books", &plan).filters(&membership).build()
    };
    assert_eq!(with_id(3).group_signature, with_id(4).group_signature);

    let narrower_plan = plan_entity(&[Selection::field("id")], &projection::BOOK);
    let mut membership = FilterFragment::new();
    membership.id_in("books.id", &[3]);
    let narrower = SelectBuilder::from_plan("books", &narrower_plan)
        .filters(&membership)
        .build();
    assert_ne!(with_id(3).group_signature, narrower.group_signature);
}
