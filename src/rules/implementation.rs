//! Logical to physical rules. Inputs stay untouched; only the root operator is replaced.

use crate::error::{OptError, OptResult};
use crate::operator::LogicalOperatorKind;
use crate::operator::PhysicalOperator::{
    PhysicalFilter, PhysicalHashJoin, PhysicalLimit, PhysicalNestedLoopJoin,
    PhysicalProjection, PhysicalTableScan,
};
use crate::operator::{HashJoin, LogicalOperator, NestedLoopJoin, Operator, PhysicalOperator};
use crate::plan::{PlanNode, PlanNodeBuilder, PlanNodeRef};
use crate::rules::{Pattern, Rule, RuleId, RuleResult, RuleType};

fn logical_of(plan: &PlanNode) -> OptResult<&LogicalOperator> {
    plan.operator().as_logical().ok_or_else(|| {
        OptError::invariant(format!("{} is not a logical operator", plan.operator()))
    })
}

fn replace_root(input: &PlanNode, operator: PhysicalOperator) -> OptResult<PlanNode> {
    PlanNodeBuilder::new(&Operator::Physical(operator))
        .add_inputs(input.inputs().iter().cloned())
        .build()
}

fn mismatch(rule: RuleId, input: &PlanNode) -> OptError {
    OptError::invariant(format!("{} cannot implement {}", rule, input.operator()))
}

macro_rules! implementation_rule {
    ($name:ident, $id:ident, $kind:ident, |$op:ident, $input:ident, $result:ident| $body:block) => {
        #[derive(Clone, Debug)]
        pub struct $name {
            pattern: Pattern,
        }

        impl $name {
            pub fn new() -> Self {
                Self {
                    pattern: Pattern::leaf(LogicalOperatorKind::$kind),
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl Rule for $name {
            fn id(&self) -> RuleId {
                RuleId::$id
            }

            fn rule_type(&self) -> RuleType {
                RuleType::Implementation
            }

            fn pattern(&self) -> &Pattern {
                &self.pattern
            }

            fn apply(&self, $input: PlanNodeRef, $result: &mut RuleResult) -> OptResult<()> {
                let $op = logical_of(&$input)?;
                $body
                Ok(())
            }
        }
    };
}

implementation_rule!(ImplementScanRule, ImplementScan, LogicalScan, |op, input, result| {
    let scan = op
        .as_logical_scan()
        .ok_or_else(|| mismatch(RuleId::ImplementScan, &input))?;
    result.add(replace_root(&input, PhysicalTableScan(scan.clone()))?);
});

implementation_rule!(ImplementFilterRule, ImplementFilter, LogicalFilter, |op, input, result| {
    let filter = op
        .as_logical_filter()
        .ok_or_else(|| mismatch(RuleId::ImplementFilter, &input))?;
    result.add(replace_root(&input, PhysicalFilter(filter.clone()))?);
});

implementation_rule!(
    ImplementProjectionRule,
    ImplementProjection,
    LogicalProjection,
    |op, input, result| {
        let projection = op
            .as_logical_projection()
            .ok_or_else(|| mismatch(RuleId::ImplementProjection, &input))?;
        result.add(replace_root(&input, PhysicalProjection(projection.clone()))?);
    }
);

implementation_rule!(ImplementJoinRule, ImplementJoin, LogicalJoin, |op, input, result| {
    let join = op
        .as_logical_join()
        .ok_or_else(|| mismatch(RuleId::ImplementJoin, &input))?;
    if join.is_hashable() {
        result.add(replace_root(&input, PhysicalHashJoin(HashJoin::from(join.clone())))?);
    }
    result.add(replace_root(
        &input,
        PhysicalNestedLoopJoin(NestedLoopJoin::from(join.clone())),
    )?);
});

implementation_rule!(ImplementLimitRule, ImplementLimit, LogicalLimit, |op, input, result| {
    let limit = op
        .as_logical_limit()
        .ok_or_else(|| mismatch(RuleId::ImplementLimit, &input))?;
    result.add(replace_root(&input, PhysicalLimit(limit.clone()))?);
});
