use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use itertools::Itertools;

use crate::context::CteId;
use crate::error::{ensure_invariant, OptError, OptResult};
use crate::expr::Expr;
use crate::operator::{pass_through, OperatorTrait, SubQueryAlias};
use crate::plan::{PlanNode, PlanNodeRef};
use crate::properties::LogicalProperty;

/// Holds the `WITH` clause of a query until it is registered and inlined.
///
/// The node only exists between binding and CTE inlining: registration flips `registered`, and
/// inlining replaces the node by its body. The alias queries are not children; they are
/// [extra plans](PlanNode::extra_plans) planned before the body that references them.
#[derive(Clone, Debug)]
pub struct LogicalCte {
    alias_queries: Vec<PlanNodeRef>,
    cte_name_to_id: Arc<HashMap<String, CteId>>,
    registered: bool,
}

/// The sub-query alias operator of an alias query, if it is one.
pub fn as_sub_query_alias(plan: &PlanNode) -> Option<&SubQueryAlias> {
    plan.operator()
        .as_logical()
        .and_then(|op| op.as_logical_sub_query_alias())
}

fn check_alias_queries(alias_queries: &[PlanNodeRef]) -> OptResult<()> {
    ensure_invariant!(
        !alias_queries.is_empty(),
        "LogicalCte requires at least one alias query"
    );
    let mut seen = HashSet::with_capacity(alias_queries.len());
    for query in alias_queries {
        let alias = as_sub_query_alias(query).ok_or_else(|| {
            OptError::invariant(format!(
                "alias query of LogicalCte must be a sub-query alias, got {}",
                query.operator().name()
            ))
        })?;
        ensure_invariant!(
            seen.insert(alias.alias()),
            "duplicate CTE alias: {}",
            alias.alias()
        );
    }
    Ok(())
}

impl LogicalCte {
    /// Creates an unregistered node whose alias map is derived from the alias queries.
    pub fn new(alias_queries: Vec<PlanNodeRef>) -> OptResult<Self> {
        check_alias_queries(&alias_queries)?;
        let mut cte_name_to_id = HashMap::with_capacity(alias_queries.len());
        for query in &alias_queries {
            // Checked above.
            if let Some(alias) = as_sub_query_alias(query) {
                let id = alias.cte_id().ok_or_else(|| {
                    OptError::invariant(format!("CTE alias {} has no CTE id", alias.alias()))
                })?;
                cte_name_to_id.insert(alias.alias().to_string(), id);
            }
        }
        Ok(Self {
            alias_queries,
            cte_name_to_id: Arc::new(cte_name_to_id),
            registered: false,
        })
    }

    /// Creates a node with an explicit alias map, keeping CTE ids stable across rewrites.
    pub fn with_registration(
        alias_queries: Vec<PlanNodeRef>,
        registered: bool,
        cte_name_to_id: Arc<HashMap<String, CteId>>,
    ) -> OptResult<Self> {
        check_alias_queries(&alias_queries)?;
        for query in &alias_queries {
            if let Some(alias) = as_sub_query_alias(query) {
                ensure_invariant!(
                    cte_name_to_id.contains_key(alias.alias()),
                    "CTE alias map misses alias {}",
                    alias.alias()
                );
            }
        }
        Ok(Self {
            alias_queries,
            cte_name_to_id,
            registered,
        })
    }

    pub fn alias_queries(&self) -> &[PlanNodeRef] {
        &self.alias_queries
    }

    pub fn is_registered(&self) -> bool {
        self.registered
    }

    pub fn cte_name_to_id(&self) -> &Arc<HashMap<String, CteId>> {
        &self.cte_name_to_id
    }

    pub fn find_cte_id(&self, alias: &str) -> OptResult<CteId> {
        self.cte_name_to_id
            .get(alias)
            .copied()
            .ok_or_else(|| OptError::UnknownAlias {
                alias: alias.to_string(),
            })
    }

    /// Aliases in declaration order.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.alias_queries
            .iter()
            .filter_map(|q| as_sub_query_alias(q))
            .map(SubQueryAlias::alias)
    }

    /// Copy marked as registered, sharing the alias map.
    pub(crate) fn into_registered(self) -> Self {
        Self {
            registered: true,
            ..self
        }
    }

    /// Copy with new alias queries, keeping flag and map.
    pub(crate) fn with_alias_queries(&self, alias_queries: Vec<PlanNodeRef>) -> OptResult<Self> {
        Self::with_registration(alias_queries, self.registered, self.cte_name_to_id.clone())
    }
}

/// Only the alias queries define the shape; the map and flag are bookkeeping.
impl PartialEq for LogicalCte {
    fn eq(&self, other: &Self) -> bool {
        self.alias_queries == other.alias_queries
    }
}

impl Eq for LogicalCte {}

impl Hash for LogicalCte {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.alias_queries.hash(state);
    }
}

impl OperatorTrait for LogicalCte {
    fn arity(&self) -> usize {
        1
    }

    fn expressions(&self) -> Vec<&Expr> {
        vec![]
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        pass_through(inputs)
    }
}

impl fmt::Display for LogicalCte {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "alias_queries=[{}], registered={}",
            self.aliases().join(", "),
            self.registered
        )
    }
}
