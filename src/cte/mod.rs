//! Common table expression passes.
//!
//! A bound plan carries each `WITH` clause as a [`LogicalCte`](crate::operator::LogicalCte)
//! node. [`register_ctes`] marks every such node as registered; [`inline_ctes`] then replaces
//! every reference to a CTE by its definition and removes the nodes, so nothing after it ever
//! sees a `LogicalCte`.

mod inline;
pub use inline::*;
mod register;
pub use register::*;

use std::sync::Arc;

use crate::error::OptResult;
use crate::plan::PlanNodeRef;

/// Rebuilds `plan` with `inputs` unless they are the current inputs.
pub(crate) fn with_new_inputs(plan: &PlanNodeRef, inputs: Vec<PlanNodeRef>) -> OptResult<PlanNodeRef> {
    let unchanged = inputs.len() == plan.inputs().len()
        && inputs
            .iter()
            .zip(plan.inputs())
            .all(|(new, old)| Arc::ptr_eq(new, old));
    if unchanged {
        Ok(plan.clone())
    } else {
        Ok(Arc::new(plan.with_children(inputs)?))
    }
}
