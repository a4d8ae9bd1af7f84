use std::sync::Arc;

use plan_memo::context::StatementContext;
use plan_memo::expr::{col, lit_i64, JoinType, Slot};
use plan_memo::operator::{Operator, PhysicalOperator};
use plan_memo::optimizer::OptimizerContext;
use plan_memo::plan::{LogicalPlanBuilder, PlanNodeRef};
use plan_memo::planner::Planner;
use plan_memo::profile::{ExecutionSummaryKey, Summary, SummaryKey, SummaryProfile};
use plan_memo::properties::{Distribution, PhysicalPropertySet};

fn orders_with_customers(ctx: &mut StatementContext) -> PlanNodeRef {
    let big_orders = LogicalPlanBuilder::scan("orders", ["id", "customer", "amount"])
        .filter(col(Slot::qualified("orders", "amount")).gt(lit_i64(100)));
    let customers = LogicalPlanBuilder::scan("customers", ["id", "name"]);
    LogicalPlanBuilder::with_ctes(
        ctx,
        [("o", big_orders), ("c", customers)],
        LogicalPlanBuilder::unbound("o")
            .join(
                JoinType::Inner,
                Some(col(Slot::qualified("o", "customer")).equal(col(Slot::qualified("c", "id")))),
                LogicalPlanBuilder::unbound("c"),
            )
            .limit(10),
    )
    .unwrap()
    .build()
}

#[test]
fn test_physical_plan_with_gather() {
    let mut ctx = StatementContext::new();
    let plan = orders_with_customers(&mut ctx);
    let planned = Planner::default().plan(&plan).unwrap();
    let physical = planned.plan();

    let root = physical.root();
    assert_eq!("PhysicalLimit", root.operator().name());
    assert_eq!(Some(&PhysicalPropertySet::single()), root.physical_props());
    assert_eq!(
        "[o.id, o.customer, o.amount, c.id, c.name]",
        root.logical_property().to_string()
    );

    let names: Vec<&'static str> = physical
        .bfs_iterator()
        .map(|p| p.operator().name())
        .collect();
    assert!(names.contains(&"PhysicalGather"));
    assert!(names.contains(&"PhysicalHashJoin"));
    assert!(!names.contains(&"PhysicalNestedLoopJoin"));
    assert!(physical.bfs_iterator().all(|p| p.is_physical()));
    // Every operator taken from the memo points back at its expression.
    assert!(physical.bfs_iterator().all(|p| {
        matches!(
            p.operator(),
            Operator::Physical(PhysicalOperator::PhysicalGather(_))
        ) || p.group_expr().is_some()
    }));
    assert!(planned.memo().num_groups() > 0);
}

#[test]
fn test_any_distribution_needs_no_gather() {
    let mut ctx = StatementContext::new();
    let plan = LogicalPlanBuilder::with_ctes(
        &mut ctx,
        [("a", LogicalPlanBuilder::scan("t1", ["x"]))],
        LogicalPlanBuilder::unbound("a").cross_join(LogicalPlanBuilder::unbound("a")),
    )
    .unwrap()
    .build();
    let context = OptimizerContext {
        required_distribution: Distribution::Any,
        ..OptimizerContext::default()
    };
    let planned = Planner::new(context).plan(&plan).unwrap();
    let names: Vec<&'static str> = planned
        .plan()
        .bfs_iterator()
        .map(|p| p.operator().name())
        .collect();
    assert_eq!(
        vec![
            "PhysicalNestedLoopJoin",
            "PhysicalProjection",
            "PhysicalProjection",
            "PhysicalTableScan",
            "PhysicalTableScan"
        ],
        names
    );
}

#[test]
fn test_profile_rendering() {
    let profile = Arc::new(SummaryProfile::new());
    profile.update(
        &Summary::builder()
            .profile_id("q-1")
            .task_type("QUERY")
            .sql_statement("WITH o AS (...), c AS (...) SELECT ...")
            .build(),
    );

    let mut ctx = StatementContext::new();
    let plan = orders_with_customers(&mut ctx);
    Planner::default()
        .with_listener(profile.clone())
        .plan(&plan)
        .unwrap();

    for key in [
        ExecutionSummaryKey::AnalysisTime,
        ExecutionSummaryKey::CreateSingleNodeTime,
        ExecutionSummaryKey::QueryDistributedTime,
        ExecutionSummaryKey::PlanTime,
    ] {
        assert!(profile.phase_duration(key).is_some());
    }
    assert_eq!("q-1", profile.summary_value(SummaryKey::ProfileId));
    let rendered = profile.render();
    assert!(rendered.contains("Profile ID"));
    assert!(rendered.contains("QueryDistributed Time"));
}
