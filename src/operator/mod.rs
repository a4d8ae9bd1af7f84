//! Relational operators.
//!
//! The operator set is closed: every traversal matches on [`Operator`] exhaustively, so adding a
//! variant is a compile error until every visitor, rule and property derivation handles it.

use std::fmt;

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;

use crate::cost::Cost;
use crate::expr::Expr;
use crate::properties::{LogicalProperty, PhysicalPropertySet};

mod cte;
pub use cte::*;
mod filter;
pub use filter::*;
mod gather;
pub use gather::*;
mod group_plan;
pub use group_plan::*;
mod join;
pub use join::*;
mod limit;
pub use limit::*;
mod logical;
pub use logical::*;
mod physical;
pub use physical::*;
mod projection;
pub use projection::*;
mod sub_query_alias;
pub use sub_query_alias::*;
mod table_scan;
pub use table_scan::*;
mod unbound;
pub use unbound::*;

/// Behavior shared by every logical and physical operator.
#[enum_dispatch]
pub trait OperatorTrait {
    /// Number of children a node carrying this operator must have.
    fn arity(&self) -> usize;

    /// Scalar expressions used by this operator.
    fn expressions(&self) -> Vec<&Expr>;

    /// Derives output of this operator from its inputs' logical properties.
    ///
    /// `inputs` has exactly [`OperatorTrait::arity`] entries.
    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty;
}

/// Result of [`PhysicalOperatorTrait::derive_properties`].
#[derive(Clone, Debug, PartialEq)]
pub struct DerivePropResult {
    pub output_prop: PhysicalPropertySet,
    pub input_required_props: Vec<PhysicalPropertySet>,
}

#[enum_dispatch]
pub trait PhysicalOperatorTrait {
    /// Alternatives of (delivered property, required input properties) for a parent
    /// requirement.
    fn derive_properties(&self, required: &PhysicalPropertySet) -> Vec<DerivePropResult>;

    /// Local cost of this operator, children excluded.
    fn cost(&self) -> Cost;
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, EnumAsInner)]
pub enum Operator {
    Logical(LogicalOperator),
    Physical(PhysicalOperator),
    /// Placeholder for a whole memo group inside a rule binding.
    Group(GroupPlan),
}

impl Operator {
    pub fn is_logical(&self) -> bool {
        matches!(self, Operator::Logical(_))
    }

    pub fn is_physical(&self) -> bool {
        matches!(self, Operator::Physical(_))
    }

    pub fn name(&self) -> &'static str {
        match self {
            Operator::Logical(op) => op.into(),
            Operator::Physical(op) => op.into(),
            Operator::Group(_) => "GroupPlan",
        }
    }

    pub fn arity(&self) -> usize {
        match self {
            Operator::Logical(op) => op.arity(),
            Operator::Physical(op) => op.arity(),
            Operator::Group(_) => 0,
        }
    }

    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Operator::Logical(op) => op.expressions(),
            Operator::Physical(op) => op.expressions(),
            Operator::Group(_) => vec![],
        }
    }

    pub fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        match self {
            Operator::Logical(op) => op.derive_logical_property(inputs),
            Operator::Physical(op) => op.derive_logical_property(inputs),
            Operator::Group(group) => group.logical_property().clone(),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operator::Logical(op) => write!(f, "{}", op),
            Operator::Physical(op) => write!(f, "{}", op),
            Operator::Group(group) => write!(f, "{}", group),
        }
    }
}

/// Output of the single input, or nothing for a malformed input list.
pub(crate) fn pass_through(inputs: &[&LogicalProperty]) -> LogicalProperty {
    inputs
        .first()
        .map(|p| (*p).clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use crate::operator::LogicalOperator::LogicalScan;
    use crate::operator::PhysicalOperator::PhysicalTableScan;
    use crate::operator::{Operator, TableScan};

    #[test]
    fn test_operator_side() {
        let scan = TableScan::new("t", ["x"]);
        let logical = Operator::Logical(LogicalScan(scan.clone()));
        let physical = Operator::Physical(PhysicalTableScan(scan));

        assert!(logical.is_logical());
        assert!(!logical.is_physical());
        assert!(physical.is_physical());
        assert!(!physical.is_logical());
        assert_eq!("LogicalScan", logical.name());
        assert_eq!("PhysicalTableScan", physical.name());
    }
}
