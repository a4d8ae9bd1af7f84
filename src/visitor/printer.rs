use crate::operator::{
    Filter, Gather, GroupPlan, HashJoin, Join, Limit, LogicalCte, NestedLoopJoin, Projection,
    SubQueryAlias, TableScan, UnboundRelation,
};
use crate::plan::PlanNode;
use crate::visitor::PlanVisitor;

/// Renders a plan as an indented tree, one operator per line.
///
/// Extra plans (CTE definitions) are printed before the inputs they are referenced from.
#[derive(Default)]
pub struct TreeStringVisitor {
    lines: Vec<String>,
}

impl TreeStringVisitor {
    pub fn finish(self) -> String {
        self.lines.join("\n")
    }

    fn render(&mut self, plan: &PlanNode, depth: usize) {
        self.lines
            .push(format!("{}{}", "  ".repeat(depth), plan.operator()));
        if plan.display_extra_plans_first() {
            for extra in plan.extra_plans() {
                extra.accept(self, depth + 1);
            }
        }
        for input in plan.inputs() {
            input.accept(self, depth + 1);
        }
    }
}

impl PlanVisitor<(), usize> for TreeStringVisitor {
    fn visit_logical_scan(&mut self, _scan: &TableScan, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_logical_unbound_relation(
        &mut self,
        _relation: &UnboundRelation,
        plan: &PlanNode,
        depth: usize,
    ) {
        self.render(plan, depth)
    }

    fn visit_logical_filter(&mut self, _filter: &Filter, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_logical_projection(&mut self, _projection: &Projection, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_logical_join(&mut self, _join: &Join, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_logical_limit(&mut self, _limit: &Limit, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_logical_sub_query_alias(
        &mut self,
        _alias: &SubQueryAlias,
        plan: &PlanNode,
        depth: usize,
    ) {
        self.render(plan, depth)
    }

    fn visit_logical_cte(&mut self, _cte: &LogicalCte, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_physical_table_scan(&mut self, _scan: &TableScan, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_physical_filter(&mut self, _filter: &Filter, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_physical_projection(
        &mut self,
        _projection: &Projection,
        plan: &PlanNode,
        depth: usize,
    ) {
        self.render(plan, depth)
    }

    fn visit_physical_hash_join(&mut self, _join: &HashJoin, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_physical_nested_loop_join(
        &mut self,
        _join: &NestedLoopJoin,
        plan: &PlanNode,
        depth: usize,
    ) {
        self.render(plan, depth)
    }

    fn visit_physical_limit(&mut self, _limit: &Limit, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_physical_gather(&mut self, _gather: &Gather, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }

    fn visit_group_plan(&mut self, _group: &GroupPlan, plan: &PlanNode, depth: usize) {
        self.render(plan, depth)
    }
}

#[cfg(test)]
mod tests {
    use crate::context::StatementContext;
    use crate::plan::LogicalPlanBuilder;

    #[test]
    fn test_cte_definitions_printed_before_body() {
        let mut ctx = StatementContext::new();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("t1", ["x"]))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap()
        .build();

        let expected = "\
LogicalCte(alias_queries=[a], registered=false)
  LogicalSubQueryAlias(alias=a, cte_id=CTEId#0)
    LogicalScan(table=t1, columns=[x])
  LogicalUnboundRelation(name=a)";
        assert_eq!(expected, plan.tree_string());
    }
}
