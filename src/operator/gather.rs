use std::fmt;

use crate::cost::Cost;
use crate::expr::Expr;
use crate::operator::{pass_through, DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

/// Exchange that collects all rows of its input on a single node.
///
/// Never produced by a rule; the search adds it as an enforcer.
#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct Gather;

impl OperatorTrait for Gather {
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

impl PhysicalOperatorTrait for Gather {
    fn derive_properties(&self, _required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        vec![DerivePropResult {
            output_prop: PhysicalPropertySet::single(),
            input_required_props: vec![PhysicalPropertySet::any()],
        }]
    }

    fn cost(&self) -> Cost {
        Cost::from(1.0)
    }
}

impl fmt::Display for Gather {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "distribution=SINGLE")
    }
}
