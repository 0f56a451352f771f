//! Batched book-by-id fetches
//!
//! Serves the `Review.book` back-reference and the post-mutation re-read:
//! every caller asks for one book id, the group fetches them all with one
//! array-bound query, and each member receives its own record (or none).

use std::sync::Arc;

use async_graphql::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::loader::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};
use crate::models::BookRecord;
use crate::sql::projection::{plan_entity, BOOK};
use crate::sql::{FilterFragment, ProjectionPlan, SelectBuilder, SelectStatement};

use super::{selection_tree, submit};

struct BooksByIdExecutor {
    pool: PgPool,
    plan: ProjectionPlan,
}

impl BooksByIdExecutor {
    fn statement(&self, book_ids: &[i64]) -> SelectStatement {
        let mut membership = FilterFragment::new();
        membership.id_in("books.id", book_ids);
        SelectBuilder::from_plan("books", &self.plan)
            .filters(&membership)
            .build()
    }
}

#[async_trait]
impl GroupExecutor for BooksByIdExecutor {
    async fn execute(&self, members: &[LoadMember]) -> ApiResult<GroupResult> {
        let book_ids: Vec<i64> = members.iter().filter_map(|m| m.parent_id).collect();
        let rows = self
            .statement(&book_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("book by id"))?;
        let records = rows
            .iter()
            .map(BookRecord::from_projected_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::database("book by id"))?;
        Ok(GroupResult::BooksById(records))
    }

    fn distribute(&self, member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        let GroupResult::BooksById(records) = group else {
            return Err(ApiError::Internal(
                "book by id group resolved to a foreign variant".to_string(),
            ));
        };
        Ok(LoadSlice::Book(
            records
                .iter()
                .find(|record| Some(record.book.id) == member.parent_id)
                .cloned(),
        ))
    }
}

/// Load one book by id, batched with every sibling asking for a book with
/// the same projection.
pub async fn load_book_by_id(
    ctx: &Context<'_>,
    book_id: i64,
) -> async_graphql::Result<Option<BookRecord>> {
    let pool = ctx.data::<PgPool>()?.clone();
    let plan = plan_entity(&selection_tree(ctx), &BOOK);

    let executor = Arc::new(BooksByIdExecutor { pool, plan });
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
        .into_book()
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
