use crate::error::{OptError, OptResult};
use crate::expr::{col, Expr};
use crate::operator::LogicalOperator::LogicalProjection;
use crate::operator::LogicalOperatorKind;
use crate::operator::{Operator, Projection};
use crate::plan::{PlanNodeBuilder, PlanNodeRef};
use crate::rules::{Pattern, Rule, RuleId, RuleResult, RuleType};

/// Replaces a sub-query alias by a projection renaming every input column under the alias.
#[derive(Clone, Debug)]
pub struct EliminateSubQueryAliasRule {
    pattern: Pattern,
}

impl EliminateSubQueryAliasRule {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::leaf(LogicalOperatorKind::LogicalSubQueryAlias),
        }
    }
}

impl Default for EliminateSubQueryAliasRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for EliminateSubQueryAliasRule {
    fn id(&self) -> RuleId {
        RuleId::EliminateSubQueryAlias
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Rewrite
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, input: PlanNodeRef, result: &mut RuleResult) -> OptResult<()> {
        let alias = input
            .operator()
            .as_logical()
            .and_then(|op| op.as_logical_sub_query_alias())
            .ok_or_else(|| OptError::invariant(format!("{} is not an alias", input.operator())))?;
        let child = &input.inputs()[0];

        let exprs = child
            .logical_property()
            .output()
            .iter()
            .map(|slot| Expr::Alias {
                expr: Box::new(col(slot.clone())),
                name: slot.name().to_string(),
                qualifier: Some(alias.alias().to_string()),
            })
            .collect();

        let projection = PlanNodeBuilder::new(&Operator::Logical(LogicalProjection(
            Projection::new(exprs),
        )))
        .add_inputs([child.clone()])
        .build()?;
        result.add(projection);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::JoinType;
    use crate::plan::LogicalPlanBuilder;

    #[test]
    fn test_alias_becomes_projection() {
        let plan = LogicalPlanBuilder::scan("t", ["x", "y"])
            .join(JoinType::Left, None, LogicalPlanBuilder::scan("u", ["z"]))
            .alias("v")
            .build();
        let mut result = RuleResult::new();
        EliminateSubQueryAliasRule::new()
            .apply(plan.clone(), &mut result)
            .unwrap();
        let projection = result.into_iter().next().unwrap();

        assert_eq!("LogicalProjection", projection.operator().name());
        // Same columns, qualifiers and nullability as the alias it replaces.
        assert_eq!(plan.logical_property(), projection.logical_property());
        assert!(projection.logical_property().output()[2].nullable());
    }
}
