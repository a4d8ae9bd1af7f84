use std::sync::Arc;

use anyhow::ensure;
use log::{debug, trace};

use crate::error::OptResult;
use crate::optimizer::{Optimizer, OptimizerContext};
use crate::plan::{Plan, PlanNodeRef};
use crate::rules::{Rule, RuleImpl, RuleResult};

/// Match order of plan tree.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MatchOrder {
    BottomUp,
    TopDown,
}

pub struct HepOptimizer {
    match_order: MatchOrder,
    /// Max number of iteration
    max_iter_times: usize,
    rules: Vec<RuleImpl>,
    plan: PlanNodeRef,
    context: OptimizerContext,
}

impl Optimizer for HepOptimizer {
    fn context(&self) -> &OptimizerContext {
        &self.context
    }

    fn find_best_plan(mut self) -> OptResult<Plan> {
        for times in 0..self.max_iter_times {
            match self.rewrite_once(&self.plan)? {
                Some(new_plan) => {
                    trace!("Plan after iteration {}:\n{}", times, new_plan.tree_string());
                    self.plan = new_plan;
                }
                // The plan no longer changes after iteration
                None => {
                    debug!("Heuristic optimizer reached fixed point after {} rewrites", times);
                    return Ok(Plan::new(self.plan));
                }
            }
        }

        debug!(
            "Heuristic optimizer stopped after {} rewrites without a fixed point",
            self.max_iter_times
        );
        Ok(Plan::new(self.plan))
    }
}

impl HepOptimizer {
    pub fn new(
        match_order: MatchOrder,
        max_iter_times: usize,
        rules: Vec<RuleImpl>,
        plan: Plan,
        context: OptimizerContext,
    ) -> Self {
        Self {
            match_order,
            max_iter_times,
            rules,
            plan: plan.root(),
            context,
        }
    }

    /// Applies the first matching rule at the first node in match order, if any.
    fn rewrite_once(&self, node: &PlanNodeRef) -> OptResult<Option<PlanNodeRef>> {
        if self.match_order == MatchOrder::TopDown {
            if let Some(new_node) = self.apply_rules(node)? {
                return Ok(Some(new_node));
            }
        }

        for (idx, input) in node.inputs().iter().enumerate() {
            if let Some(new_input) = self.rewrite_once(input)? {
                let mut inputs = node.inputs().to_vec();
                inputs[idx] = new_input;
                return Ok(Some(Arc::new(node.with_children(inputs)?)));
            }
        }

        if self.match_order == MatchOrder::BottomUp {
            return self.apply_rules(node);
        }
        Ok(None)
    }

    fn apply_rules(&self, node: &PlanNodeRef) -> OptResult<Option<PlanNodeRef>> {
        for rule in &self.rules {
            if !rule.pattern().matches(node) {
                continue;
            }
            let mut results = RuleResult::new();
            rule.apply(node.clone(), &mut results)?;
            if let Some(new_node) = single_result(rule, results)? {
                trace!("Applied rule {} to {}", rule.id(), node.operator());
                return Ok(Some(new_node));
            }
            trace!("Rule {} produced nothing for {}", rule.id(), node.operator());
        }
        Ok(None)
    }
}

fn single_result(rule: &RuleImpl, results: RuleResult) -> anyhow::Result<Option<PlanNodeRef>> {
    ensure!(
        results.len() <= 1,
        "Rewrite rule {} should not return more than 1 result.",
        rule.id()
    );
    Ok(results.into_iter().next())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit_i64, Slot};
    use crate::plan::LogicalPlanBuilder;
    use crate::rules::{rewrite_rules, MergeLimitsRule};

    fn optimize(order: MatchOrder, rules: Vec<RuleImpl>, plan: PlanNodeRef) -> Plan {
        HepOptimizer::new(order, 100, rules, Plan::new(plan), OptimizerContext::default())
            .find_best_plan()
            .unwrap()
    }

    #[test]
    fn test_merge_limits_to_fixed_point() {
        let plan = LogicalPlanBuilder::scan("t", ["x"])
            .limit(10)
            .limit(5)
            .limit(7)
            .build();
        for order in [MatchOrder::TopDown, MatchOrder::BottomUp] {
            let optimized = optimize(order, vec![MergeLimitsRule::new().into()], plan.clone());
            assert_eq!(
                "LogicalLimit(limit=5, offset=0)\n  LogicalScan(table=t, columns=[x])",
                optimized.tree_string()
            );
        }
    }

    #[test]
    fn test_rewrite_rules_remove_aliases_and_merge_filters() {
        let x = || col(Slot::qualified("v", "x"));
        let plan = LogicalPlanBuilder::scan("t", ["x"])
            .alias("v")
            .filter(x().gt(lit_i64(1)))
            .filter(x().gt(lit_i64(2)))
            .build();
        let optimized = optimize(MatchOrder::TopDown, rewrite_rules(), plan.clone());
        let names: Vec<&'static str> = optimized
            .bfs_iterator()
            .map(|p| p.operator().name())
            .collect();
        assert_eq!(
            vec!["LogicalFilter", "LogicalProjection", "LogicalScan"],
            names
        );
        assert_eq!(plan.logical_property(), optimized.root().logical_property());
    }

    #[test]
    fn test_iteration_bound() {
        let plan = LogicalPlanBuilder::scan("t", ["x"]).limit(3).limit(2).limit(1).build();
        let optimized = HepOptimizer::new(
            MatchOrder::TopDown,
            1,
            vec![MergeLimitsRule::new().into()],
            Plan::new(plan),
            OptimizerContext::default(),
        )
        .find_best_plan()
        .unwrap();
        let limits = optimized
            .bfs_iterator()
            .filter(|p| p.operator().name() == "LogicalLimit")
            .count();
        assert_eq!(2, limits);
    }
}
