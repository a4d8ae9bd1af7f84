use std::sync::Arc;

use itertools::Itertools;

use crate::cascades::{GroupExprId, Memo};
use crate::error::OptResult;
use crate::plan::{PlanNodeBuilder, PlanNodeRef};
use crate::rules::Pattern;

/// All plan trees rooted at `expr_id` that match `pattern`.
///
/// Children the pattern leaves open become [`GroupPlan`](crate::operator::GroupPlan)
/// placeholders. Children the pattern constrains expand to every matching logical expression of
/// the child group, so one expression may produce several bindings.
pub fn bindings(
    memo: &Memo,
    expr_id: GroupExprId,
    pattern: &Pattern,
) -> OptResult<Vec<PlanNodeRef>> {
    let expr = memo.get_group_expr(expr_id)?;
    if !pattern.matches_operator(expr.operator()) {
        return Ok(vec![]);
    }
    let child_patterns = pattern.children();
    if !child_patterns.is_empty() && child_patterns.len() != expr.children().len() {
        return Ok(vec![]);
    }

    let mut child_options = Vec::with_capacity(expr.children().len());
    for (idx, child) in expr.children().iter().enumerate() {
        let options = match child_patterns.get(idx) {
            None | Some(Pattern::Any) => vec![memo.group_plan(*child)?],
            Some(child_pattern) => {
                let mut options = vec![];
                for child_expr in memo.get_group(*child)?.logical_exprs() {
                    options.extend(bindings(memo, *child_expr, child_pattern)?);
                }
                options
            }
        };
        if options.is_empty() {
            return Ok(vec![]);
        }
        child_options.push(options);
    }

    let logical_prop = memo.get_group(expr.group_id())?.logical_property().clone();
    let build = |inputs: Vec<PlanNodeRef>| -> OptResult<PlanNodeRef> {
        Ok(Arc::new(
            PlanNodeBuilder::new(expr.operator())
                .add_inputs(inputs)
                .with_group_expr(Some(expr_id))
                .with_logical_prop(Some(logical_prop.clone()))
                .build()?,
        ))
    };

    if child_options.is_empty() {
        return Ok(vec![build(vec![])?]);
    }
    child_options
        .into_iter()
        .multi_cartesian_product()
        .map(build)
        .collect()
}
