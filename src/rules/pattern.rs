use crate::operator::{LogicalOperatorKind, Operator};
use crate::plan::PlanNode;

/// Shape a rule matches against.
///
/// An operator pattern with no children accepts any inputs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Pattern {
    Any,
    Logical(LogicalOperatorKind, Vec<Pattern>),
}

impl Pattern {
    pub fn leaf(kind: LogicalOperatorKind) -> Self {
        Pattern::Logical(kind, vec![])
    }

    pub fn unary(kind: LogicalOperatorKind, child: Pattern) -> Self {
        Pattern::Logical(kind, vec![child])
    }

    pub fn children(&self) -> &[Pattern] {
        match self {
            Pattern::Any => &[],
            Pattern::Logical(_, children) => children,
        }
    }

    /// Tests the root operator only.
    pub fn matches_operator(&self, operator: &Operator) -> bool {
        match self {
            Pattern::Any => true,
            Pattern::Logical(kind, _) => operator
                .as_logical()
                .map_or(false, |op| op.kind() == *kind),
        }
    }

    /// Tests a whole plan tree.
    pub fn matches(&self, plan: &PlanNode) -> bool {
        if !self.matches_operator(plan.operator()) {
            return false;
        }
        let children = self.children();
        children.is_empty()
            || (children.len() == plan.inputs().len()
                && children
                    .iter()
                    .zip(plan.inputs())
                    .all(|(pattern, input)| pattern.matches(input)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::LogicalPlanBuilder;

    #[test]
    fn test_match_tree() {
        let plan = LogicalPlanBuilder::scan("t", ["a"]).limit(2).limit(1).build();
        let limits = Pattern::unary(
            LogicalOperatorKind::LogicalLimit,
            Pattern::unary(LogicalOperatorKind::LogicalLimit, Pattern::Any),
        );
        assert!(limits.matches(&plan));
        assert!(!limits.matches(&plan.inputs()[0]));
        assert!(Pattern::leaf(LogicalOperatorKind::LogicalLimit).matches(&plan.inputs()[0]));
        assert!(!Pattern::leaf(LogicalOperatorKind::LogicalFilter).matches(&plan));
    }
}
