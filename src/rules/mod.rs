//! Rewrite, transformation and implementation rules.
//!
//! A rule declares a [`Pattern`] and produces replacement plans for every binding of that
//! pattern. The heuristic optimizer binds against plan trees, the cascades optimizer against
//! memo groups; rules cannot tell the difference.

use enum_dispatch::enum_dispatch;
use enumset::EnumSetType;
use strum_macros::Display;

use crate::error::OptResult;
use crate::plan::{PlanNode, PlanNodeRef};

mod eliminate_sub_query_alias;
pub use eliminate_sub_query_alias::*;
mod implementation;
pub use implementation::*;
mod merge_filters;
pub use merge_filters::*;
mod merge_limits;
pub use merge_limits::*;
mod pattern;
pub use pattern::*;

#[derive(EnumSetType, Debug, Hash, Display)]
pub enum RuleId {
    EliminateSubQueryAlias,
    MergeFilters,
    MergeLimits,
    ImplementScan,
    ImplementFilter,
    ImplementProjection,
    ImplementJoin,
    ImplementLimit,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RuleType {
    /// Only runs in the heuristic phase.
    Rewrite,
    /// Logical to logical, runs in both phases.
    Transformation,
    /// Logical to physical, only runs in cascades.
    Implementation,
}

#[derive(Default)]
pub struct RuleResult {
    results: Vec<PlanNodeRef>,
}

impl RuleResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, plan: PlanNode) {
        self.results.push(plan.into());
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

impl IntoIterator for RuleResult {
    type Item = PlanNodeRef;
    type IntoIter = std::vec::IntoIter<PlanNodeRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

#[enum_dispatch]
pub trait Rule {
    fn id(&self) -> RuleId;

    fn rule_type(&self) -> RuleType;

    fn pattern(&self) -> &Pattern;

    /// Adds zero or more replacements of `input` to `result`.
    ///
    /// `input` matches [`Rule::pattern`]. Replacements must have the same logical property.
    fn apply(&self, input: PlanNodeRef, result: &mut RuleResult) -> OptResult<()>;
}

#[enum_dispatch(Rule)]
#[derive(Clone, Debug)]
pub enum RuleImpl {
    EliminateSubQueryAlias(EliminateSubQueryAliasRule),
    MergeFilters(MergeFiltersRule),
    MergeLimits(MergeLimitsRule),
    ImplementScan(ImplementScanRule),
    ImplementFilter(ImplementFilterRule),
    ImplementProjection(ImplementProjectionRule),
    ImplementJoin(ImplementJoinRule),
    ImplementLimit(ImplementLimitRule),
}

lazy_static! {
    static ref REWRITE_RULES: Vec<RuleImpl> = vec![
        EliminateSubQueryAliasRule::new().into(),
        MergeFiltersRule::new().into(),
        MergeLimitsRule::new().into(),
    ];
    static ref CASCADES_RULES: Vec<RuleImpl> = vec![
        MergeFiltersRule::new().into(),
        MergeLimitsRule::new().into(),
        ImplementScanRule::new().into(),
        ImplementFilterRule::new().into(),
        ImplementProjectionRule::new().into(),
        ImplementJoinRule::new().into(),
        ImplementLimitRule::new().into(),
    ];
}

/// Rules run to a fixed point by the heuristic optimizer.
pub fn rewrite_rules() -> Vec<RuleImpl> {
    REWRITE_RULES.clone()
}

/// Transformation and implementation rules of the cost based search.
pub fn cascades_rules() -> Vec<RuleImpl> {
    CASCADES_RULES.clone()
}
