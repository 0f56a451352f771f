//! Batched author fetches for books
//!
//! The classic N+1 collapse: every `Book.authors` resolver in the request
//! submits one single-parent load; members with equal signatures merge and
//! the group runs one junction query with all parent ids array-bound. The
//! junction's `book_id` is always projected first so each book can be
//! handed its own author rows.

use std::sync::Arc;

use async_graphql::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::loader::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};
use crate::models::{Author, BookAuthorRow};
use crate::sql::projection::{self, plan_entity};
use crate::sql::{FilterFragment, ProjectionPlan, SelectBuilder, SelectStatement};

use super::{selection_tree, submit};

const JUNCTION_JOIN: &str = "JOIN book_authors ON authors.id = book_authors.author_id";

struct BookAuthorsExecutor {
    pool: PgPool,
    plan: ProjectionPlan,
}

impl BookAuthorsExecutor {
    fn statement(&self, book_ids: &[i64]) -> SelectStatement {
        let mut membership = FilterFragment::new();
        membership.id_in("book_authors.book_id", book_ids);
        SelectBuilder::from_plan("authors", &self.plan)
            .leading_column(projection::qualify("book_authors", "book_id"))
            .join(JUNCTION_JOIN)
            .filters(&membership)
            .build()
    }
}

#[async_trait]
impl GroupExecutor for BookAuthorsExecutor {
    async fn execute(&self, members: &[LoadMember]) -> ApiResult<GroupResult> {
        let book_ids: Vec<i64> = members.iter().filter_map(|m| m.parent_id).collect();
        let rows = self
            .statement(&book_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("book authors"))?;
        let rows = rows
            .iter()
            .map(BookAuthorRow::from_projected_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::database("book authors"))?;
        Ok(GroupResult::BookAuthors(rows))
    }

    fn distribute(&self, member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        let GroupResult::BookAuthors(rows) = group else {
            return Err(ApiError::Internal(
                "book authors group resolved to a foreign variant".to_string(),
            ));
        };
        Ok(LoadSlice::Authors(
            rows.iter()
                .filter(|row| Some(row.book_id) == member.parent_id)
                .map(|row| row.author.clone())
                .collect(),
        ))
    }
}

/// Load the authors of one book, batched with every sibling book.
pub async fn load_book_authors(
    ctx: &Context<'_>,
    book_id: i64,
) -> async_graphql::Result<Vec<Author>> {
    let pool = ctx.data::<PgPool>()?.clone();
    let plan = plan_entity(&selection_tree(ctx), &projection::AUTHOR);

    let executor = Arc::new(BookAuthorsExecutor { pool, plan });
    let statement = executor.statement(&[book_id]);

    let slice = submit(
        ctx,
        LoadRequest {
            identity_key: statement.identity_key,
            group_signature: statement.group_signature,
            member: LoadMember::of_parent(book_id),
            executor,
        },
    )
    .await?;
    slice
        .into_authors()
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
