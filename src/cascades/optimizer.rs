use std::collections::HashSet;

use log::{debug, log_enabled, trace, Level};

use crate::cascades::{bindings, GroupExprId, GroupId, Memo, Winner};
use crate::error::{ensure_invariant, OptError, OptResult};
use crate::operator::{Gather, PhysicalOperatorTrait};
use crate::optimizer::{Optimizer, OptimizerContext};
use crate::plan::{Plan, PlanNodeRef};
use crate::properties::{PhysicalProp, PhysicalPropertySet};
use crate::rules::{Rule, RuleImpl, RuleResult, RuleType};

/// Top down cost based search over a [`Memo`].
///
/// A group is explored (transformation rules) and implemented (implementation rules) the first
/// time a parent asks it for a physical property set. Every physical expression is then costed
/// against that requirement, recursively optimizing its inputs for what the expression needs
/// from them. The cheapest alternative is recorded as the group's winner for the requirement.
pub struct CascadesOptimizer {
    required_prop: PhysicalPropertySet,
    rules: Vec<RuleImpl>,
    memo: Memo,
    root: GroupId,
    context: OptimizerContext,
    rule_applications: usize,
    in_progress: HashSet<(GroupId, PhysicalPropertySet)>,
}

impl Optimizer for CascadesOptimizer {
    fn context(&self) -> &OptimizerContext {
        &self.context
    }

    fn find_best_plan(mut self) -> OptResult<Plan> {
        let required = self.required_prop.clone();
        Ok(Plan::new(self.optimize(&required)?))
    }
}

impl CascadesOptimizer {
    pub fn new(
        required_prop: PhysicalPropertySet,
        rules: Vec<RuleImpl>,
        plan: Plan,
        context: OptimizerContext,
    ) -> OptResult<Self> {
        let mut memo = Memo::new();
        let root = memo.insert(&plan.root())?;
        Ok(Self {
            required_prop,
            rules,
            memo,
            root,
            context,
            rule_applications: 0,
            in_progress: HashSet::new(),
        })
    }

    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn into_memo(self) -> Memo {
        self.memo
    }

    pub fn root_group(&self) -> GroupId {
        self.root
    }

    /// Searches for the cheapest plan of the root group delivering `required`.
    ///
    /// Winners are kept, so later calls with other requirements reuse earlier work.
    pub fn optimize(&mut self, required: &PhysicalPropertySet) -> OptResult<PlanNodeRef> {
        self.optimize_group(self.root, required)?;
        if log_enabled!(Level::Debug) {
            debug!("Memo after optimizing for {}:\n{}", required, self.memo.tree_string());
        }
        self.memo.extract_best_plan(self.root, required)
    }

    fn optimize_group(&mut self, group_id: GroupId, required: &PhysicalPropertySet) -> OptResult<()> {
        if self.memo.get_group(group_id)?.winner(required).is_some() {
            return Ok(());
        }
        let key = (group_id, required.clone());
        if !self.in_progress.insert(key.clone()) {
            trace!("Group {} is already being optimized for {}", group_id, required);
            return Ok(());
        }
        let result = self.search_group(group_id, required);
        self.in_progress.remove(&key);
        result
    }

    fn search_group(&mut self, group_id: GroupId, required: &PhysicalPropertySet) -> OptResult<()> {
        self.explore_group(group_id)?;
        self.implement_group(group_id)?;

        let mut best: Option<Winner> = None;
        let physical_exprs = self.memo.get_group(group_id)?.physical_exprs().to_vec();
        for expr_id in physical_exprs {
            let (operator, children) = {
                let expr = self.memo.get_group_expr(expr_id)?;
                let operator = expr.operator().as_physical().cloned().ok_or_else(|| {
                    OptError::invariant(format!(
                        "{} in physical expressions of group {}",
                        expr.operator(),
                        group_id
                    ))
                })?;
                (operator, expr.children().to_vec())
            };

            for alternative in operator.derive_properties(required) {
                if !alternative.output_prop.satisfies(required) {
                    continue;
                }
                ensure_invariant!(
                    alternative.input_required_props.len() == children.len(),
                    "{} requires {} input properties for {} children",
                    operator,
                    alternative.input_required_props.len(),
                    children.len()
                );

                let mut cost = operator.cost();
                let mut feasible = true;
                for (child, child_required) in children.iter().zip(&alternative.input_required_props) {
                    self.optimize_group(*child, child_required)?;
                    match self.memo.get_group(*child)?.winner(child_required) {
                        Some(winner) => cost = cost + winner.cost(),
                        None => {
                            feasible = false;
                            break;
                        }
                    }
                }

                if feasible && best.as_ref().map_or(true, |b| cost < b.cost()) {
                    best = Some(Winner::Expr {
                        expr_id,
                        output_prop: alternative.output_prop,
                        input_props: alternative.input_required_props,
                        cost,
                    });
                }
            }
        }

        let any = PhysicalPropertySet::any();
        if !any.satisfies(required) && PhysicalPropertySet::single().satisfies(required) {
            self.optimize_group(group_id, &any)?;
            if let Some(winner) = self.memo.get_group(group_id)?.winner(&any) {
                let cost = winner.cost() + Gather.cost();
                if best.as_ref().map_or(true, |b| cost < b.cost()) {
                    best = Some(Winner::Gather { cost });
                }
            }
        }

        match best {
            Some(winner) => {
                trace!("Winner of group {} for {}: {:?}", group_id, required, winner);
                self.memo.get_group_mut(group_id)?.set_winner(required.clone(), winner);
            }
            None => debug!("Group {} has no plan delivering {}", group_id, required),
        }
        Ok(())
    }

    fn explore_group(&mut self, group_id: GroupId) -> OptResult<()> {
        if self.memo.get_group(group_id)?.is_explored() {
            return Ok(());
        }
        self.memo.get_group_mut(group_id)?.set_explored();

        // Rules may append to the group while we walk it.
        let mut idx = 0;
        while let Some(expr_id) = self.memo.get_group(group_id)?.logical_exprs().get(idx).copied() {
            let children = self.memo.get_group_expr(expr_id)?.children().to_vec();
            for child in children {
                self.explore_group(child)?;
            }
            if self.context.enable_exploration {
                self.apply_rules(expr_id, RuleType::Transformation)?;
            }
            idx += 1;
        }
        Ok(())
    }

    fn implement_group(&mut self, group_id: GroupId) -> OptResult<()> {
        let logical_exprs = self.memo.get_group(group_id)?.logical_exprs().to_vec();
        for expr_id in logical_exprs {
            self.apply_rules(expr_id, RuleType::Implementation)?;
        }
        Ok(())
    }

    fn apply_rules(&mut self, expr_id: GroupExprId, rule_type: RuleType) -> OptResult<()> {
        let group_id = self.memo.get_group_expr(expr_id)?.group_id();
        for rule in &*self.rules.clone() {
            if rule.rule_type() != rule_type {
                continue;
            }
            let expr = self.memo.get_group_expr(expr_id)?;
            if expr.is_rule_applied(rule.id()) || !rule.pattern().matches_operator(expr.operator()) {
                continue;
            }
            if rule_type == RuleType::Transformation {
                if self.rule_applications >= self.context.max_search_iterations {
                    trace!("Search budget exhausted, skipped rule {} on {}", rule.id(), expr_id);
                    continue;
                }
                self.rule_applications += 1;
            }
            self.memo.mark_rule_applied(expr_id, rule.id())?;

            for binding in bindings(&self.memo, expr_id, rule.pattern())? {
                let mut results = RuleResult::new();
                rule.apply(binding, &mut results)?;
                for new_plan in results {
                    let copied = self.memo.copy_in(&new_plan, Some(group_id))?;
                    if copied.inserted {
                        trace!(
                            "Rule {} added {} to group {}",
                            rule.id(),
                            new_plan.operator(),
                            copied.group_id
                        );
                    }
                }
            }
        }
        Ok(())
    }
}
