use crate::error::OptResult;
use crate::heuristic::MatchOrder;
use crate::plan::Plan;
use crate::properties::Distribution;

/// Knobs shared by all optimizers of a planning session.
#[derive(Clone, Debug)]
pub struct OptimizerContext {
    /// Traversal order of the heuristic optimizer.
    pub match_order: MatchOrder,
    /// Upper bound of heuristic rewrites before giving up on a fixed point.
    pub max_rewrite_iterations: usize,
    /// Upper bound of rule applications during cascades search.
    pub max_search_iterations: usize,
    /// Run transformation rules during cascades search. Implementation rules always run.
    pub enable_exploration: bool,
    /// Distribution the final plan has to deliver.
    pub required_distribution: Distribution,
}

impl Default for OptimizerContext {
    fn default() -> Self {
        Self {
            match_order: MatchOrder::TopDown,
            max_rewrite_iterations: 1000,
            max_search_iterations: 100_000,
            enable_exploration: true,
            required_distribution: Distribution::Single,
        }
    }
}

/// An optimizer turns a plan into a better one.
pub trait Optimizer {
    fn context(&self) -> &OptimizerContext;

    fn find_best_plan(self) -> OptResult<Plan>;
}
