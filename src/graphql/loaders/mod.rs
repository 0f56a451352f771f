//! Resolver adapters for the batch loader
//!
//! Each adapter follows the same canonical shape: plan the projection from
//! the current selection subtree, compile the declared filters, shape a
//! single-parent statement to obtain the loader keys, submit a
//! [`LoadRequest`] whose executor expands the merged parent ids into one
//! array-bound list, and await the member's slice of the group result.

mod author_list;
mod book_authors;
mod book_by_id;
mod book_list;
mod book_reviews;
mod series_list;

pub use author_list::load_authors;
pub use book_authors::load_book_authors;
pub use book_by_id::load_book_by_id;
pub use book_list::load_books;
pub use book_reviews::load_book_reviews;
pub use series_list::load_book_series;

use async_graphql::{Context, SelectionField};

use crate::loader::{BatchLoader, LoadRequest, LoadSlice};
use crate::sql::Selection;

/// Capture the current field's selection subtree as a plain tree the
/// planner can walk.
pub fn selection_tree(ctx: &Context<'_>) -> Vec<Selection> {
    fn convert(field: SelectionField<'_>) -> Selection {
        Selection {
            name: field.name().to_string(),
            children: field.selection_set().map(convert).collect(),
        }
    }
    ctx.field().selection_set().map(convert).collect()
}

/// Submit a load through the request's loader and await its slice.
pub(crate) async fn submit(
    ctx: &Context<'_>,
    request: LoadRequest,
) -> async_graphql::Result<LoadSlice> {
    let loader = ctx.data::<BatchLoader>()?;
    loader
        .load(request)
        .await
        .map_err(|err| async_graphql::Error::new(err.to_string()))
}
