//! Traversals over plan trees.
//!
//! [`PlanVisitor`] has one method per operator variant and no defaults, so a new variant does not
//! compile until every visitor decides what to do with it. New consumers only need a new
//! visitor; plan nodes never change for them.

mod checker;
pub use checker::*;
mod printer;
pub use printer::*;

use crate::operator::{
    Filter, Gather, GroupPlan, HashJoin, Join, Limit, LogicalCte, NestedLoopJoin, Projection,
    SubQueryAlias, TableScan, UnboundRelation,
};
use crate::plan::PlanNode;

pub trait PlanVisitor<R, C> {
    fn visit_logical_scan(&mut self, scan: &TableScan, plan: &PlanNode, context: C) -> R;

    fn visit_logical_unbound_relation(
        &mut self,
        relation: &UnboundRelation,
        plan: &PlanNode,
        context: C,
    ) -> R;

    fn visit_logical_filter(&mut self, filter: &Filter, plan: &PlanNode, context: C) -> R;

    fn visit_logical_projection(
        &mut self,
        projection: &Projection,
        plan: &PlanNode,
        context: C,
    ) -> R;

    fn visit_logical_join(&mut self, join: &Join, plan: &PlanNode, context: C) -> R;

    fn visit_logical_limit(&mut self, limit: &Limit, plan: &PlanNode, context: C) -> R;

    fn visit_logical_sub_query_alias(
        &mut self,
        alias: &SubQueryAlias,
        plan: &PlanNode,
        context: C,
    ) -> R;

    fn visit_logical_cte(&mut self, cte: &LogicalCte, plan: &PlanNode, context: C) -> R;

    fn visit_physical_table_scan(&mut self, scan: &TableScan, plan: &PlanNode, context: C) -> R;

    fn visit_physical_filter(&mut self, filter: &Filter, plan: &PlanNode, context: C) -> R;

    fn visit_physical_projection(
        &mut self,
        projection: &Projection,
        plan: &PlanNode,
        context: C,
    ) -> R;

    fn visit_physical_hash_join(&mut self, join: &HashJoin, plan: &PlanNode, context: C) -> R;

    fn visit_physical_nested_loop_join(
        &mut self,
        join: &NestedLoopJoin,
        plan: &PlanNode,
        context: C,
    ) -> R;

    fn visit_physical_limit(&mut self, limit: &Limit, plan: &PlanNode, context: C) -> R;

    fn visit_physical_gather(&mut self, gather: &Gather, plan: &PlanNode, context: C) -> R;

    fn visit_group_plan(&mut self, group: &GroupPlan, plan: &PlanNode, context: C) -> R;
}
