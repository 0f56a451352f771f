//! Dynamic SQL construction for the batching engine
//!
//! Three pure, synchronous stages feed the batch loader:
//!
//! - [`projection`] walks the selection tree for one resolver invocation and
//!   produces the ordered column list plus join and secondary-fetch
//!   directives.
//! - [`filter`] compiles the declarative filter arguments into AND-joined
//!   predicate clauses with positional parameters.
//! - [`statement`] assembles the final statement and derives the two key
//!   forms the loader groups by: the parameter-less group signature and the
//!   fully-substituted identity key.

pub mod filter;
pub mod projection;
pub mod statement;

pub use filter::{FilterFragment, IntRangeFilter, TextFilter, TextOp};
pub use projection::{plan_entity, plan_list, EntityDescriptor, ProjectionPlan, Selection};
pub use statement::{SelectBuilder, SelectStatement, SqlValue};
