use std::sync::Arc;
use std::time::Instant;

use log::debug;

use crate::cascades::{CascadesOptimizer, Memo};
use crate::cte::{inline_ctes, register_ctes};
use crate::error::OptResult;
use crate::heuristic::HepOptimizer;
use crate::optimizer::{Optimizer, OptimizerContext};
use crate::plan::{Plan, PlanNodeRef};
use crate::profile::{PhaseListener, PlanningPhase};
use crate::properties::PhysicalPropertySet;
use crate::rules::{cascades_rules, rewrite_rules};
use crate::visitor::PlanChecker;

/// Result of a planning session.
#[derive(Debug)]
pub struct PlannedQuery {
    plan: Plan,
    memo: Memo,
}

impl PlannedQuery {
    /// The physical plan.
    pub fn plan(&self) -> &Plan {
        &self.plan
    }

    /// Search space the plan was extracted from.
    pub fn memo(&self) -> &Memo {
        &self.memo
    }

    pub fn into_plan(self) -> Plan {
        self.plan
    }
}

/// Drives one query from a bound logical plan to a physical plan.
///
/// Phases run in a fixed order: CTE registration, CTE inlining and validation, heuristic
/// rewriting, then cost based search, first for any distribution and then for the required
/// one. Each phase boundary is reported to the registered listeners.
#[derive(Clone, Default)]
pub struct Planner {
    context: OptimizerContext,
    listeners: Vec<Arc<dyn PhaseListener>>,
}

impl Planner {
    pub fn new(context: OptimizerContext) -> Self {
        Self {
            context,
            listeners: vec![],
        }
    }

    pub fn with_listener(mut self, listener: Arc<dyn PhaseListener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn context(&self) -> &OptimizerContext {
        &self.context
    }

    fn notify(&self, phase: PlanningPhase) {
        let now = Instant::now();
        debug!("Planning phase {} finished", phase);
        for listener in &self.listeners {
            listener.on_phase_finished(phase, now);
        }
    }

    pub fn plan(&self, logical_plan: &PlanNodeRef) -> OptResult<PlannedQuery> {
        self.notify(PlanningPhase::QueryBegin);

        let registered = register_ctes(logical_plan)?;
        self.notify(PlanningPhase::CteRegistered);

        let analyzed = inline_ctes(&registered)?;
        PlanChecker::check(&analyzed)?;
        self.notify(PlanningPhase::Analyzed);

        let rewritten = HepOptimizer::new(
            self.context.match_order,
            self.context.max_rewrite_iterations,
            rewrite_rules(),
            Plan::new(analyzed),
            self.context.clone(),
        )
        .find_best_plan()?;
        self.notify(PlanningPhase::Rewritten);

        let required = PhysicalPropertySet::with_distribution(self.context.required_distribution);
        let mut optimizer = CascadesOptimizer::new(
            required.clone(),
            cascades_rules(),
            rewritten,
            self.context.clone(),
        )?;
        optimizer.optimize(&PhysicalPropertySet::any())?;
        self.notify(PlanningPhase::SingleNodePlanned);

        let best = optimizer.optimize(&required)?;
        self.notify(PlanningPhase::DistributedPlanned);

        let planned = PlannedQuery {
            plan: Plan::new(best),
            memo: optimizer.into_memo(),
        };
        self.notify(PlanningPhase::Planned);
        Ok(planned)
    }
}
