//! Batched review fetches for books
//!
//! Sibling `Book.reviews` resolvers with the same star filter and no
//! pagination merge into one query over all parent ids. Pagination makes
//! the statement's group signature nil, so paginated siblings run as
//! singleton groups and never share a result set.

use std::sync::Arc;

use async_graphql::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::error::{ApiError, ApiResult};
use crate::graphql::types::filters::ReviewFilter;
use crate::loader::{GroupExecutor, GroupResult, LoadMember, LoadRequest, LoadSlice};
use crate::models::Review;
use crate::sql::projection::{self, plan_entity};
use crate::sql::{FilterFragment, ProjectionPlan, SelectBuilder, SelectStatement};

use super::{selection_tree, submit};

struct BookReviewsExecutor {
    pool: PgPool,
    plan: ProjectionPlan,
    filter: Option<ReviewFilter>,
    offset: Option<i64>,
    limit: Option<i64>,
}

impl BookReviewsExecutor {
    fn statement(&self, book_ids: &[i64]) -> SelectStatement {
        let mut membership = FilterFragment::new();
        membership.id_in("\"reviews\".\"book_id\"", book_ids);
        let mut builder = SelectBuilder::from_plan("reviews", &self.plan)
            .leading_column(projection::qualify("reviews", "book_id"))
            .filters(&membership);
        if let Some(filter) = &self.filter {
            builder = builder.filters(&filter.compile());
        }
        builder.limit(self.limit).offset(self.offset).build()
    }
}

#[async_trait]
impl GroupExecutor for BookReviewsExecutor {
    async fn execute(&self, members: &[LoadMember]) -> ApiResult<GroupResult> {
        let book_ids: Vec<i64> = members.iter().filter_map(|m| m.parent_id).collect();
        let rows = self
            .statement(&book_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(ApiError::database("book reviews"))?;
        let reviews = rows
            .iter()
            .map(Review::from_projected_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ApiError::database("book reviews"))?;
        Ok(GroupResult::Reviews(reviews))
    }

    fn distribute(&self, member: &LoadMember, group: &GroupResult) -> ApiResult<LoadSlice> {
        let GroupResult::Reviews(reviews) = group else {
            return Err(ApiError::Internal(
                "book reviews group resolved to a foreign variant".to_string(),
            ));
        };
        Ok(LoadSlice::Reviews(
            reviews
                .iter()
                .filter(|review| Some(review.book_id) == member.parent_id)
                .cloned()
                .collect(),
        ))
    }
}

/// Load the reviews of one book, batched with every sibling book that
/// shares the same filter shape and carries no pagination.
pub async fn load_book_reviews(
    ctx: &Context<'_>,
    book_id: i64,
    offset: Option<i64>,
    limit: Option<i64>,
    filter: Option<ReviewFilter>,
) -> async_graphql::Result<Vec<Review>> {
    let pool = ctx.data::<PgPool>()?.clone();
    let plan = plan_entity(&selection_tree(ctx), &projection::REVIEW);

    let executor = Arc::new(BookReviewsExecutor {
        pool,
        plan,
        filter,
        offset,
        limit,
    });
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
        .into_reviews()
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
