use crate::error::{OptError, OptResult};
use crate::operator::LogicalOperator::LogicalLimit;
use crate::operator::LogicalOperatorKind;
use crate::operator::{Limit, Operator};
use crate::plan::{PlanNode, PlanNodeBuilder, PlanNodeRef};
use crate::rules::{Pattern, Rule, RuleId, RuleResult, RuleType};

/// Collapses two stacked limits into one.
#[derive(Clone, Debug)]
pub struct MergeLimitsRule {
    pattern: Pattern,
}

impl MergeLimitsRule {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::unary(
                LogicalOperatorKind::LogicalLimit,
                Pattern::unary(LogicalOperatorKind::LogicalLimit, Pattern::Any),
            ),
        }
    }
}

impl Default for MergeLimitsRule {
    fn default() -> Self {
        Self::new()
    }
}

fn limit_of(plan: &PlanNode) -> OptResult<&Limit> {
    plan.operator()
        .as_logical()
        .and_then(|op| op.as_logical_limit())
        .ok_or_else(|| OptError::invariant(format!("{} is not a limit", plan.operator())))
}

impl Rule for MergeLimitsRule {
    fn id(&self) -> RuleId {
        RuleId::MergeLimits
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Transformation
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, input: PlanNodeRef, result: &mut RuleResult) -> OptResult<()> {
        let outer = limit_of(&input)?;
        let child = &input.inputs()[0];
        let inner = limit_of(child)?;

        // The outer limit skips its offset within the rows the inner one lets through.
        let limit = outer
            .limit()
            .min(inner.limit().saturating_sub(outer.offset()));
        let offset = inner.offset() + outer.offset();

        let merged = PlanNodeBuilder::new(&Operator::Logical(LogicalLimit(Limit::with_offset(
            limit, offset,
        ))))
        .add_inputs(child.inputs().iter().cloned())
        .build()?;
        result.add(merged);
        Ok(())
    }
}
