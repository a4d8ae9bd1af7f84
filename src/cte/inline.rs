use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, trace};

use crate::cte::with_new_inputs;
use crate::error::{ensure_invariant, OptError, OptResult};
use crate::operator::{as_sub_query_alias, LogicalCte, LogicalOperator, Operator, SubQueryAlias};
use crate::plan::{PlanNode, PlanNodeBuilder, PlanNodeRef};

/// CTE definitions visible at some point of the plan, innermost first.
struct CteScope<'a> {
    parent: Option<&'a CteScope<'a>>,
    definitions: HashMap<String, PlanNodeRef>,
}

impl<'a> CteScope<'a> {
    fn resolve(&self, name: &str) -> Option<&PlanNodeRef> {
        self.definitions
            .get(name)
            .or_else(|| self.parent.and_then(|p| p.resolve(name)))
    }
}

/// Replaces every reference to a CTE by its definition and removes all `WITH` clauses.
///
/// Each reference becomes the alias query of the CTE it names, keeping the alias and CTE id,
/// so a CTE referenced twice appears twice. Inner clauses shadow outer ones. A definition sees
/// the definitions declared before it in its clause, then the enclosing clauses; a name it uses
/// for itself or a later sibling resolves outward. Every clause must be registered.
pub fn inline_ctes(plan: &PlanNodeRef) -> OptResult<PlanNodeRef> {
    let root = CteScope {
        parent: None,
        definitions: HashMap::new(),
    };
    inline(plan, &root)
}

fn inline(plan: &PlanNodeRef, scope: &CteScope<'_>) -> OptResult<PlanNodeRef> {
    match plan.operator() {
        Operator::Logical(LogicalOperator::LogicalCte(cte)) => inline_cte(plan, cte, scope),
        Operator::Logical(LogicalOperator::LogicalUnboundRelation(relation)) => {
            match relation.single_name().and_then(|name| scope.resolve(name)) {
                Some(definition) => {
                    trace!("Inlined reference to CTE {}", relation);
                    Ok(definition.clone())
                }
                None => Ok(plan.clone()),
            }
        }
        _ => {
            let inputs = plan
                .inputs()
                .iter()
                .map(|input| inline(input, scope))
                .collect::<OptResult<Vec<_>>>()?;
            with_new_inputs(plan, inputs)
        }
    }
}

fn inline_cte(plan: &PlanNode, cte: &LogicalCte, scope: &CteScope<'_>) -> OptResult<PlanNodeRef> {
    let aliases: Vec<&str> = cte.aliases().collect();
    ensure_invariant!(
        cte.is_registered(),
        "CTE {:?} must be registered before it is inlined",
        aliases
    );

    let mut definitions = HashMap::with_capacity(aliases.len());
    for query in cte.alias_queries() {
        let alias = sub_query_alias(query)?;
        let preceding = CteScope {
            parent: Some(scope),
            definitions: definitions.clone(),
        };
        let body = inline(&query.inputs()[0], &preceding)?;
        let cte_id = cte.find_cte_id(alias.alias())?;
        let definition = PlanNodeBuilder::new(&Operator::Logical(
            LogicalOperator::LogicalSubQueryAlias(SubQueryAlias::for_cte(alias.alias(), cte_id)),
        ))
        .add_inputs([body])
        .build()?;
        definitions.insert(alias.alias().to_string(), Arc::new(definition));
    }

    debug!("Inlined CTE {:?}", aliases);
    let body_scope = CteScope {
        parent: Some(scope),
        definitions,
    };
    inline(&plan.inputs()[0], &body_scope)
}

fn sub_query_alias(query: &PlanNode) -> OptResult<&SubQueryAlias> {
    as_sub_query_alias(query).ok_or_else(|| {
        OptError::invariant(format!(
            "alias query of CTE must be a sub-query alias, got {}",
            query.operator()
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{CteId, StatementContext};
    use crate::cte::register_ctes;
    use crate::plan::{LogicalPlanBuilder, Plan};

    fn registered(
        ctes: Vec<(&str, LogicalPlanBuilder)>,
        body: LogicalPlanBuilder,
    ) -> PlanNodeRef {
        let mut ctx = StatementContext::new();
        let plan = LogicalPlanBuilder::with_ctes(&mut ctx, ctes, body)
            .unwrap()
            .build();
        register_ctes(&plan).unwrap()
    }

    fn is_cte(plan: &PlanNodeRef) -> bool {
        matches!(
            plan.operator(),
            Operator::Logical(LogicalOperator::LogicalCte(_))
        )
    }

    #[test]
    fn test_inline_replaces_references() {
        let plan = registered(
            vec![("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound("a").cross_join(LogicalPlanBuilder::unbound("a")),
        );
        let inlined = inline_ctes(&plan).unwrap();

        assert_eq!("LogicalJoin", inlined.operator().name());
        for input in inlined.inputs() {
            let alias = as_sub_query_alias(input).unwrap();
            assert_eq!("a", alias.alias());
            assert_eq!(Some(CteId(0)), alias.cte_id());
            assert_eq!("LogicalScan", input.inputs()[0].operator().name());
        }
        assert_eq!(
            vec!["a.x", "a.x"],
            inlined
                .logical_property()
                .output()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unregistered_cte_rejected() {
        let mut ctx = StatementContext::new();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap()
        .build();
        assert!(matches!(
            inline_ctes(&plan),
            Err(OptError::StructuralInvariantViolation(_))
        ));
    }

    #[test]
    fn test_reference_to_preceding_sibling() {
        let plan = registered(
            vec![
                ("a", LogicalPlanBuilder::scan("t", ["x"])),
                ("b", LogicalPlanBuilder::unbound("a").limit(1)),
            ],
            LogicalPlanBuilder::unbound("b"),
        );
        let inlined = inline_ctes(&plan).unwrap();
        assert_eq!(Some(CteId(1)), as_sub_query_alias(&inlined).unwrap().cte_id());
        let limit = &inlined.inputs()[0];
        let a = &limit.inputs()[0];
        assert_eq!(Some(CteId(0)), as_sub_query_alias(a).unwrap().cte_id());
    }

    #[test]
    fn test_forward_reference_resolves_outward() {
        let mut ctx = StatementContext::new();
        let inner = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [
                ("a", LogicalPlanBuilder::unbound("b")),
                ("b", LogicalPlanBuilder::scan("v", ["y"])),
            ],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("b", LogicalPlanBuilder::scan("u", ["x"]))],
            inner,
        )
        .unwrap()
        .build();
        let inlined = inline_ctes(&register_ctes(&plan).unwrap()).unwrap();

        assert_eq!(Some(CteId(0)), as_sub_query_alias(&inlined).unwrap().cte_id());
        let b = &inlined.inputs()[0];
        assert_eq!(Some(CteId(2)), as_sub_query_alias(b).unwrap().cte_id());
        assert!(b.inputs()[0]
            .operator()
            .to_string()
            .starts_with("LogicalScan(table=u"));

        // Without an enclosing definition the name is left to later binding.
        let plan = registered(
            vec![
                ("a", LogicalPlanBuilder::unbound("b")),
                ("b", LogicalPlanBuilder::scan("v", ["y"])),
            ],
            LogicalPlanBuilder::unbound("a"),
        );
        let inlined = inline_ctes(&plan).unwrap();
        assert_eq!(
            "LogicalUnboundRelation",
            inlined.inputs()[0].operator().name()
        );
    }

    #[test]
    fn test_inner_clause_reads_outer_of_same_name() {
        let mut ctx = StatementContext::new();
        let inner = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::unbound("a").limit(1))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("t", ["x"]))],
            inner,
        )
        .unwrap()
        .build();
        let inlined = inline_ctes(&register_ctes(&plan).unwrap()).unwrap();

        assert_eq!(Some(CteId(0)), as_sub_query_alias(&inlined).unwrap().cte_id());
        let limit = &inlined.inputs()[0];
        assert_eq!("LogicalLimit", limit.operator().name());
        let outer = &limit.inputs()[0];
        assert_eq!(Some(CteId(1)), as_sub_query_alias(outer).unwrap().cte_id());
        assert_eq!("LogicalScan", outer.inputs()[0].operator().name());
    }

    #[test]
    fn test_self_reference_stays_unbound() {
        let plan = registered(
            vec![("a", LogicalPlanBuilder::unbound("a").limit(1))],
            LogicalPlanBuilder::unbound("a"),
        );
        let inlined = inline_ctes(&plan).unwrap();
        assert_eq!(Some(CteId(0)), as_sub_query_alias(&inlined).unwrap().cte_id());
        let limit = &inlined.inputs()[0];
        assert_eq!(
            "LogicalUnboundRelation",
            limit.inputs()[0].operator().name()
        );
    }

    #[test]
    fn test_inner_clause_shadows_outer() {
        let mut ctx = StatementContext::new();
        let inner = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("inner_t", ["y"]))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("outer_t", ["x"]))],
            inner.cross_join(LogicalPlanBuilder::unbound("a")),
        )
        .unwrap()
        .build();
        let inlined = inline_ctes(&register_ctes(&plan).unwrap()).unwrap();

        assert!(Plan::new(inlined.clone()).bfs_iterator().all(|p| !is_cte(&p)));
        let left = &inlined.inputs()[0];
        let right = &inlined.inputs()[1];
        assert_eq!(Some(CteId(0)), as_sub_query_alias(left).unwrap().cte_id());
        assert_eq!(Some(CteId(1)), as_sub_query_alias(right).unwrap().cte_id());
    }

    #[test]
    fn test_qualified_name_is_not_a_cte_reference() {
        let plan = registered(
            vec![("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound_qualified(["db", "a"]),
        );
        let inlined = inline_ctes(&plan).unwrap();
        assert_eq!("LogicalUnboundRelation", inlined.operator().name());
        assert!(Plan::new(inlined).bfs_iterator().all(|p| as_sub_query_alias(&p).is_none()));
    }

    #[test]
    fn test_unknown_relation_stays_unbound() {
        let plan = registered(
            vec![("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound("b"),
        );
        let inlined = inline_ctes(&plan).unwrap();
        assert_eq!("LogicalUnboundRelation", inlined.operator().name());
    }
}
