//! Batched book list loads
//!
//! Runs the `books { count list { … } }` envelope: an optional count query
//! over the filtered set, short-circuiting the list query when the count is
//! zero, then the projected (and possibly paginated) list query. Root list
//! loads always carry the query's pagination, so they never merge across
//! signatures; identical subtrees still collapse onto one execution through
//! the identity key.

use std::sync::Arc;

use async_graphql::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::graphql::types::filters::BookFilter;
use crate::loader::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};
use crate::models::BookRecord;
use crate::sql::projection::{self, plan_list};
use crate::sql::{ProjectionPlan, SelectBuilder, SelectStatement};

use super::{selection_tree, submit};

struct BookListExecutor {
    pool: PgPool,
    plan: ProjectionPlan,
    filter: Option<BookFilter>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl BookListExecutor {
    fn list_statement(&self) -> SelectStatement {
        let mut builder = SelectBuilder::from_plan("books", &self.plan);
        if let Some(filter) = &self.filter {
            builder = builder.filters(&filter.compile());
            // an exact-id filter affects uniqueness; such loads never merge
            if filter.id.is_some() {
                builder = builder.unmergeable();
            }
        }
        builder.limit(self.limit).offset(self.offset).build()
    }

    fn count_statement(&self) -> SelectStatement {
        let mut builder = SelectBuilder::from_plan("books", &self.plan)
            .count_of(projection::qualify("books", "id"));
        if let Some(filter) = &self.filter {
            builder = builder.filters(&filter.compile());
        }
        builder.build()
    }
}

#[async_trait]
impl GroupExecutor for BookListExecutor {
    async fn execute(&self, _members: &[LoadMember]) -> ApiResult<GroupResult> {
        let mut count = 0;
        if self.plan.needs_count {
            count = self
                .count_statement()
                .fetch_count(&self.pool)
                .await
                .map_err(ApiError::database("book count"))?;
            if count == 0 {
                return Ok(GroupResult::Books {
                    list: Vec::new(),
                    count,
                });
            }
        }
        let rows = self
            .list_statement()
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("book list"))?;
        let list = rows
            .iter()
            .map(BookRecord::from_projected_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::database("book list"))?;
        Ok(GroupResult::Books { list, count })
    }

    fn distribute(&self, _member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        match group {
            GroupResult::Books { list, count } => Ok(LoadSlice::Books {
                list: list.clone(),
                count: *count,
            }),
            _ => Err(ApiError::Internal(
                "book list group resolved to a foreign variant".to_string(),
            )),
        }
    }
}

/// Load the book list envelope for the current selection.
pub async fn load_books(
    ctx: &Context<'_>,
    offset: Option<i64>,
    limit: Option<i64>,
    filter: Option<BookFilter>,
) -> async_graphql::Result<(Vec<BookRecord>, i64)> {
    let pool = ctx.data::<PgPool>()?.clone();
    let plan = plan_list(&selection_tree(ctx), &projection::BOOK);
    let needs_count = plan.needs_count;

    let executor = Arc::new(BookListExecutor {
        pool,
        plan,
        filter,
        offset,
        limit,
    });
    let statement = executor.list_statement();
    let mut identity_key = statement.identity_key;
    if needs_count {
        // a counted and an uncounted envelope must not collapse onto one
        // pending entry
        identity_key.push_str("#count");
    }

    let slice = submit(
        ctx,
        LoadRequest {
            identity_key,
            group_signature: statement.group_signature,
            member: LoadMember::root(),
            executor,
        },
    )
    .await?;
    slice
        .into_books()
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
