use crate::error::{OptError, OptResult};
use crate::operator::{
    Filter, Gather, GroupPlan, HashJoin, Join, Limit, LogicalCte, NestedLoopJoin, Projection,
    SubQueryAlias, TableScan, UnboundRelation,
};
use crate::plan::PlanNode;
use crate::visitor::PlanVisitor;

/// Verifies that a logical plan is ready to be copied into the memo.
///
/// CTE nodes must have been inlined, every relation bound, and no physical operator may appear
/// yet. Group placeholders are accepted since they already live in the memo.
#[derive(Default)]
pub struct PlanChecker;

impl PlanChecker {
    pub fn check(plan: &PlanNode) -> OptResult<()> {
        plan.accept(&mut PlanChecker, ())
    }

    fn check_inputs(&mut self, plan: &PlanNode) -> OptResult<()> {
        for input in plan.inputs() {
            input.accept(self, ())?;
        }
        Ok(())
    }

    fn reject(plan: &PlanNode, reason: &str) -> OptResult<()> {
        Err(OptError::invariant(format!(
            "{} {}",
            plan.operator(),
            reason
        )))
    }
}

impl PlanVisitor<OptResult<()>, ()> for PlanChecker {
    fn visit_logical_scan(&mut self, _scan: &TableScan, plan: &PlanNode, _: ()) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_unbound_relation(
        &mut self,
        _relation: &UnboundRelation,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        Self::reject(plan, "was never bound")
    }

    fn visit_logical_filter(&mut self, _filter: &Filter, plan: &PlanNode, _: ()) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_projection(
        &mut self,
        _projection: &Projection,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_join(&mut self, _join: &Join, plan: &PlanNode, _: ()) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_limit(&mut self, _limit: &Limit, plan: &PlanNode, _: ()) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_sub_query_alias(
        &mut self,
        _alias: &SubQueryAlias,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        self.check_inputs(plan)
    }

    fn visit_logical_cte(&mut self, _cte: &LogicalCte, plan: &PlanNode, _: ()) -> OptResult<()> {
        Self::reject(plan, "must be inlined before optimization")
    }

    fn visit_physical_table_scan(
        &mut self,
        _scan: &TableScan,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_filter(&mut self, _filter: &Filter, plan: &PlanNode, _: ()) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_projection(
        &mut self,
        _projection: &Projection,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_hash_join(
        &mut self,
        _join: &HashJoin,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_nested_loop_join(
        &mut self,
        _join: &NestedLoopJoin,
        plan: &PlanNode,
        _: (),
    ) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_limit(&mut self, _limit: &Limit, plan: &PlanNode, _: ()) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_physical_gather(&mut self, _gather: &Gather, plan: &PlanNode, _: ()) -> OptResult<()> {
        Self::reject(plan, "is physical")
    }

    fn visit_group_plan(&mut self, _group: &GroupPlan, _plan: &PlanNode, _: ()) -> OptResult<()> {
        Ok(())
    }
}
