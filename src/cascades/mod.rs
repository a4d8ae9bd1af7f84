//! Cascades style cost based optimizer.
//!
//! The [`Memo`] stores the search space as groups of logically equivalent expressions whose
//! children are groups, not plans. Structurally identical expressions found through different
//! rewrite paths collapse onto one entry, so the memo grows with the number of distinct shapes
//! rather than with the number of derivations.
//!
//! [`CascadesOptimizer`] drives the search: it explores groups with transformation rules,
//! implements them with implementation rules, costs every physical alternative per required
//! physical property set and finally extracts the cheapest physical plan.

use derive_more::Display;

mod binding;
pub use binding::*;
mod group;
pub use group::*;
mod group_expr;
pub use group_expr::*;
mod memo;
pub use memo::*;
mod optimizer;
pub use optimizer::*;

/// Id of a group, only meaningful within the memo that allocated it.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display(fmt = "G{}", index)]
pub struct GroupId {
    memo: u32,
    index: u32,
}

/// Id of a group expression, only meaningful within the memo that allocated it.
#[derive(Copy, Clone, Debug, Display, Hash, Eq, PartialEq, Ord, PartialOrd)]
#[display(fmt = "E{}", index)]
pub struct GroupExprId {
    memo: u32,
    index: u32,
}
