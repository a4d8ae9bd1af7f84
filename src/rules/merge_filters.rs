use crate::error::{OptError, OptResult};
use crate::operator::LogicalOperator::LogicalFilter;
use crate::operator::LogicalOperatorKind;
use crate::operator::{Filter, Operator};
use crate::plan::{PlanNode, PlanNodeBuilder, PlanNodeRef};
use crate::rules::{Pattern, Rule, RuleId, RuleResult, RuleType};

/// `Filter(a) -> Filter(b) -> x` becomes `Filter(b AND a) -> x`.
#[derive(Clone, Debug)]
pub struct MergeFiltersRule {
    pattern: Pattern,
}

impl MergeFiltersRule {
    pub fn new() -> Self {
        Self {
            pattern: Pattern::unary(
                LogicalOperatorKind::LogicalFilter,
                Pattern::unary(LogicalOperatorKind::LogicalFilter, Pattern::Any),
            ),
        }
    }
}

impl Default for MergeFiltersRule {
    fn default() -> Self {
        Self::new()
    }
}

fn filter_of(plan: &PlanNode) -> OptResult<&Filter> {
    plan.operator()
        .as_logical()
        .and_then(|op| op.as_logical_filter())
        .ok_or_else(|| OptError::invariant(format!("{} is not a filter", plan.operator())))
}

impl Rule for MergeFiltersRule {
    fn id(&self) -> RuleId {
        RuleId::MergeFilters
    }

    fn rule_type(&self) -> RuleType {
        RuleType::Transformation
    }

    fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    fn apply(&self, input: PlanNodeRef, result: &mut RuleResult) -> OptResult<()> {
        let outer = filter_of(&input)?;
        let child = &input.inputs()[0];
        let inner = filter_of(child)?;

        let predicate = inner.predicate().clone().and(outer.predicate().clone());
        let merged = PlanNodeBuilder::new(&Operator::Logical(LogicalFilter(Filter::new(predicate))))
            .add_inputs(child.inputs().iter().cloned())
            .build()?;
        result.add(merged);
        Ok(())
    }
}
