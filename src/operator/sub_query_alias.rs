use std::fmt;

use crate::context::CteId;
use crate::expr::{Expr, Slot};
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

/// Names the output of its child, e.g. a derived table or a common table expression.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct SubQueryAlias {
    alias: String,
    cte_id: Option<CteId>,
}

impl SubQueryAlias {
    pub fn new<S: Into<String>>(alias: S) -> Self {
        Self {
            alias: alias.into(),
            cte_id: None,
        }
    }

    /// Alias of a `WITH` clause entry.
    pub fn for_cte<S: Into<String>>(alias: S, cte_id: CteId) -> Self {
        Self {
            alias: alias.into(),
            cte_id: Some(cte_id),
        }
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn cte_id(&self) -> Option<CteId> {
        self.cte_id
    }
}

impl OperatorTrait for SubQueryAlias {
    fn arity(&self) -> usize {
        1
    }

    fn expressions(&self) -> Vec<&Expr> {
        vec![]
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        let output: Vec<Slot> = inputs
            .first()
            .map(|p| {
                p.output()
                    .iter()
                    .map(|s| s.clone().with_qualifier(self.alias.as_str()))
                    .collect()
            })
            .unwrap_or_default();
        LogicalProperty::new(output)
    }
}

impl fmt::Display for SubQueryAlias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.cte_id {
            Some(id) => write!(f, "alias={}, cte_id={}", self.alias, id),
            None => write!(f, "alias={}", self.alias),
        }
    }
}
