//! Batched author list loads

use std::sync::Arc;

use async_graphql::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::graphql::types::filters::AuthorFilter;
use crate::loader::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};
use crate::models::Author;
use crate::sql::projection::{self, plan_list};
use crate::sql::{ProjectionPlan, SelectBuilder, SelectStatement};

use super::{selection_tree, submit};

struct AuthorListExecutor {
    pool: PgPool,
    plan: ProjectionPlan,
    filter: Option<AuthorFilter>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl AuthorListExecutor {
    fn list_statement(&self) -> SelectStatement {
        let mut builder = SelectBuilder::from_plan("authors", &self.plan);
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
        let mut builder = SelectBuilder::from_plan("authors", &self.plan)
            .count_of(projection::qualify("authors", "id"));
        if let Some(filter) = &self.filter {
            builder = builder.filters(&filter.compile());
        }
        builder.build()
    }
}

#[async_trait]
impl GroupExecutor for AuthorListExecutor {
    async fn execute(&self, _members: &[LoadMember]) -> ApiResult<GroupResult> {
        let mut count = 0;
        if self.plan.needs_count {
            count = self
                .count_statement()
                .fetch_count(&self.pool)
                .await
                .map_err(ApiError::database("author count"))?;
            if count == 0 {
                return Ok(GroupResult::Authors {
                    list: Vec::new(),
                    count,
                });
            }
        }
        let rows = self
            .list_statement()
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("author list"))?;
        let list = rows
            .iter()
            .map(Author::from_projected_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::database("author list"))?;
        Ok(GroupResult::Authors { list, count })
    }

    fn distribute(&self, _member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        match group {
            GroupResult::Authors { list, count } => Ok(LoadSlice::AuthorList {
                list: list.clone(),
                count: *count,
            }),
            _ => Err(ApiError::Internal(
                "author list group resolved to a foreign variant".to_string(),
            )),
        }
    }
}

/// Load the author list envelope for the current selection.
pub async fn load_authors(
    ctx: &Context<'_>,
    offset: Option<i64>,
    limit: Option<i64>,
    filter: Option<AuthorFilter>,
) -> async_graphql::Result<(Vec<Author>, i64)> {
    let pool = ctx.data::<PgPool>()?.clone();
    let plan = plan_list(&selection_tree(ctx), &projection::AUTHOR);
    let needs_count = plan.needs_count;

    let executor = Arc::new(AuthorListExecutor {
        pool,
        plan,
        filter,
        offset,
        limit,
    });
    let statement = executor.list_statement();
    let mut identity_key = statement.identity_key;
    if needs_count {
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
        .into_author_list()
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
