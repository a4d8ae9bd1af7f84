use std::sync::Arc;

use log::debug;

use crate::cte::with_new_inputs;
use crate::error::{ensure_invariant, OptResult};
use crate::operator::{LogicalOperator, Operator};
use crate::plan::{PlanNodeBuilder, PlanNodeRef};

/// Marks every `WITH` clause of the plan as registered.
///
/// Alias queries and CTE ids are kept as they are. Registering a clause twice is an error.
pub fn register_ctes(plan: &PlanNodeRef) -> OptResult<PlanNodeRef> {
    let inputs = plan
        .inputs()
        .iter()
        .map(register_ctes)
        .collect::<OptResult<Vec<_>>>()?;

    let cte = match plan.operator() {
        Operator::Logical(LogicalOperator::LogicalCte(cte)) => cte,
        _ => return with_new_inputs(plan, inputs),
    };

    let aliases: Vec<&str> = cte.aliases().collect();
    ensure_invariant!(
        !cte.is_registered(),
        "CTE {:?} is already registered",
        aliases
    );

    let alias_queries = cte
        .alias_queries()
        .iter()
        .map(register_ctes)
        .collect::<OptResult<Vec<_>>>()?;
    let registered = cte.with_alias_queries(alias_queries)?.into_registered();
    debug!("Registered CTE {:?}", aliases);

    Ok(Arc::new(
        PlanNodeBuilder::new(&Operator::Logical(LogicalOperator::LogicalCte(registered)))
            .add_inputs(inputs)
            .build()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::StatementContext;
    use crate::error::OptError;
    use crate::plan::LogicalPlanBuilder;

    fn cte_of(plan: &PlanNodeRef) -> &crate::operator::LogicalCte {
        plan.operator()
            .as_logical()
            .and_then(|op| op.as_logical_cte())
            .unwrap()
    }

    #[test]
    fn test_register_flips_flag_and_keeps_ids() {
        let mut ctx = StatementContext::new();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap()
        .build();
        assert!(!cte_of(&plan).is_registered());

        let registered = register_ctes(&plan).unwrap();
        let cte = cte_of(&registered);
        assert!(cte.is_registered());
        assert!(Arc::ptr_eq(cte_of(&plan).cte_name_to_id(), cte.cte_name_to_id()));
        assert_eq!(cte_of(&plan).alias_queries(), cte.alias_queries());
        // Registration is bookkeeping only.
        assert_eq!(plan, registered);
        assert!(!cte_of(&plan).is_registered());
    }

    #[test]
    fn test_register_twice_fails() {
        let mut ctx = StatementContext::new();
        let plan = LogicalPlanBuilder::with_ctes(
            &mut ctx,
            [("a", LogicalPlanBuilder::scan("t", ["x"]))],
            LogicalPlanBuilder::unbound("a"),
        )
        .unwrap()
        .build();
        let registered = register_ctes(&plan).unwrap();
        assert!(matches!(
            register_ctes(&registered),
            Err(OptError::StructuralInvariantViolation(_))
        ));
    }

    #[test]
    fn test_plan_without_cte_is_untouched() {
        let plan = LogicalPlanBuilder::scan("t", ["x"]).limit(1).build();
        assert!(Arc::ptr_eq(&plan, &register_ctes(&plan).unwrap()));
    }
}
