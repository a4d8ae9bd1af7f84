use plan_memo::cascades::{CascadesOptimizer, Memo};
use plan_memo::error::OptError;
use plan_memo::expr::{col, lit_i64, JoinType, Slot};
use plan_memo::optimizer::OptimizerContext;
use plan_memo::plan::{LogicalPlanBuilder, Plan, PlanNodeRef};
use plan_memo::properties::PhysicalPropertySet;
use plan_memo::rules::cascades_rules;

fn query(threshold: i64) -> PlanNodeRef {
    LogicalPlanBuilder::scan("t1", ["x", "y"])
        .filter(col(Slot::qualified("t1", "x")).gt(lit_i64(threshold)))
        .join(
            JoinType::Inner,
            Some(col(Slot::qualified("t1", "y")).equal(col(Slot::qualified("t2", "y")))),
            LogicalPlanBuilder::scan("t2", ["y"]),
        )
        .build()
}

#[test]
fn test_identical_trees_share_groups() {
    let mut memo = Memo::new();
    let first = memo.insert(&query(1)).unwrap();
    let groups = memo.num_groups();
    let exprs = memo.num_exprs();

    let second = memo.insert(&query(1)).unwrap();
    assert_eq!(first, second);
    assert_eq!(groups, memo.num_groups());
    assert_eq!(exprs, memo.num_exprs());

    let third = memo.insert(&query(2)).unwrap();
    assert_ne!(first, third);
    // Both scans are shared, the filter and the join are new.
    assert_eq!(groups + 2, memo.num_groups());
}

#[test]
fn test_group_ids_are_memo_local() {
    let mut memo = Memo::new();
    let mut other = Memo::new();
    let local = memo.insert(&query(1)).unwrap();
    let foreign = other.insert(&query(1)).unwrap();
    assert_ne!(local, foreign);
    assert!(matches!(
        memo.get_group(foreign),
        Err(OptError::UnknownGroupId(_))
    ));
}

#[test]
fn test_rules_are_idempotent_in_memo() {
    let x = || col(Slot::qualified("t1", "x"));
    let plan = LogicalPlanBuilder::scan("t1", ["x"])
        .filter(x().gt(lit_i64(1)))
        .filter(x().gt(lit_i64(2)))
        .build();
    let mut optimizer = CascadesOptimizer::new(
        PhysicalPropertySet::single(),
        cascades_rules(),
        Plan::new(plan),
        OptimizerContext::default(),
    )
    .unwrap();
    optimizer.optimize(&PhysicalPropertySet::single()).unwrap();
    let exprs = optimizer.memo().num_exprs();
    let groups = optimizer.memo().num_groups();

    // A second search finds recorded winners and applied rules and adds nothing.
    optimizer.optimize(&PhysicalPropertySet::single()).unwrap();
    optimizer.optimize(&PhysicalPropertySet::any()).unwrap();
    assert_eq!(exprs, optimizer.memo().num_exprs());
    assert_eq!(groups, optimizer.memo().num_groups());
}
