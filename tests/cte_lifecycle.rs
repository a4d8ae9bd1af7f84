use std::sync::Arc;

use plan_memo::context::{CteId, StatementContext};
use plan_memo::cte::{inline_ctes, register_ctes};
use plan_memo::error::OptError;
use plan_memo::expr::{col, JoinType, Slot};
use plan_memo::operator::{as_sub_query_alias, LogicalCte, LogicalOperator, Operator};
use plan_memo::plan::{LogicalPlanBuilder, Plan, PlanNodeRef};
use plan_memo::properties::LogicalProperty;

fn cte_of(plan: &PlanNodeRef) -> &LogicalCte {
    plan.operator()
        .as_logical()
        .and_then(|op| op.as_logical_cte())
        .expect("root is a CTE")
}

/// `WITH a AS (SELECT x FROM t1), b AS (SELECT y FROM t2) SELECT * FROM a JOIN b`
fn with_a_and_b() -> PlanNodeRef {
    let mut ctx = StatementContext::new();
    let a = LogicalPlanBuilder::scan("t1", ["x"]).project(vec![col(Slot::qualified("t1", "x"))]);
    let b = LogicalPlanBuilder::scan("t2", ["y"]).project(vec![col(Slot::qualified("t2", "y"))]);
    LogicalPlanBuilder::with_ctes(
        &mut ctx,
        [("a", a), ("b", b)],
        LogicalPlanBuilder::unbound("a").join(JoinType::Inner, None, LogicalPlanBuilder::unbound("b")),
    )
    .unwrap()
    .build()
}

#[test]
fn test_end_to_end_cte_lifecycle() {
    let plan = with_a_and_b();
    let cte = cte_of(&plan);
    assert_eq!(vec!["a", "b"], cte.aliases().collect::<Vec<_>>());
    assert_eq!(CteId(0), cte.find_cte_id("a").unwrap());
    assert_eq!(CteId(1), cte.find_cte_id("b").unwrap());
    assert_eq!(2, cte.cte_name_to_id().len());
    assert!(!cte.is_registered());

    let registered = register_ctes(&plan).unwrap();
    assert!(cte_of(&registered).is_registered());
    assert_eq!(CteId(0), cte_of(&registered).find_cte_id("a").unwrap());

    let inlined = inline_ctes(&registered).unwrap();
    let no_cte = Plan::new(inlined.clone()).bfs_iterator().all(|p| {
        !matches!(
            p.operator(),
            Operator::Logical(LogicalOperator::LogicalCte(_))
        )
    });
    assert!(no_cte);

    assert_eq!("LogicalJoin", inlined.operator().name());
    let ids: Vec<Option<CteId>> = inlined
        .inputs()
        .iter()
        .map(|input| as_sub_query_alias(input).expect("expanded alias").cte_id())
        .collect();
    assert_eq!(vec![Some(CteId(0)), Some(CteId(1))], ids);
    assert_eq!(
        "[a.x, b.y]",
        inlined.logical_property().to_string()
    );
}

#[test]
fn test_unknown_alias() {
    let plan = with_a_and_b();
    match cte_of(&plan).find_cte_id("C") {
        Err(OptError::UnknownAlias { alias }) => assert_eq!("C", alias),
        other => panic!("expected unknown alias, got {:?}", other),
    }
}

#[test]
fn test_ids_survive_copies() {
    let plan = with_a_and_b();
    let with_props = plan.with_logical_properties(Some(LogicalProperty::default()));
    let cte = cte_of(&plan);
    let copy = with_props
        .operator()
        .as_logical()
        .and_then(|op| op.as_logical_cte())
        .unwrap();
    assert_eq!(CteId(0), copy.find_cte_id("a").unwrap());
    assert_eq!(CteId(1), copy.find_cte_id("b").unwrap());
    assert!(Arc::ptr_eq(cte.cte_name_to_id(), copy.cte_name_to_id()));
    assert_eq!(&LogicalProperty::default(), with_props.logical_property());
    assert_eq!(None, with_props.group_expr());

    let body = LogicalPlanBuilder::scan("t3", ["z"]).build();
    let rewritten = plan.with_children(vec![body.clone()]).unwrap();
    let rewritten_cte = rewritten
        .operator()
        .as_logical()
        .and_then(|op| op.as_logical_cte())
        .unwrap();
    assert_eq!(CteId(1), rewritten_cte.find_cte_id("b").unwrap());
    assert_eq!(cte.is_registered(), rewritten_cte.is_registered());
    assert_eq!(&body, &rewritten.inputs()[0]);
    // The input plan keeps its body.
    assert_eq!("LogicalJoin", plan.inputs()[0].operator().name());
}

#[test]
fn test_extra_plans_come_first() {
    let plan = with_a_and_b();
    let extra: Vec<&str> = plan
        .extra_plans()
        .iter()
        .map(|p| as_sub_query_alias(p).unwrap().alias())
        .collect();
    assert_eq!(vec!["a", "b"], extra);
    assert!(plan.display_extra_plans_first());

    let lines: Vec<String> = plan
        .tree_string()
        .lines()
        .map(|l| l.trim().to_string())
        .collect();
    let a = lines.iter().position(|l| l.starts_with("LogicalSubQueryAlias(alias=a")).unwrap();
    let b = lines.iter().position(|l| l.starts_with("LogicalSubQueryAlias(alias=b")).unwrap();
    let join = lines.iter().position(|l| l.starts_with("LogicalJoin")).unwrap();
    assert!(a < b && b < join);

    let order: Vec<&'static str> = Plan::new(plan)
        .bfs_iterator()
        .take(4)
        .map(|p| p.operator().name())
        .collect();
    assert_eq!(
        vec![
            "LogicalCte",
            "LogicalSubQueryAlias",
            "LogicalSubQueryAlias",
            "LogicalJoin"
        ],
        order
    );
}

#[test]
fn test_self_reference_is_not_a_cte_reference() {
    let mut ctx = StatementContext::new();
    let plan = LogicalPlanBuilder::with_ctes(
        &mut ctx,
        [("a", LogicalPlanBuilder::unbound("a"))],
        LogicalPlanBuilder::unbound("a"),
    )
    .unwrap()
    .build();
    let registered = register_ctes(&plan).unwrap();
    let inlined = inline_ctes(&registered).unwrap();
    assert_eq!(Some(CteId(0)), as_sub_query_alias(&inlined).unwrap().cte_id());
    assert_eq!(
        "LogicalUnboundRelation",
        inlined.inputs()[0].operator().name()
    );
}
