use std::fmt;

use crate::cost::Cost;
use crate::expr::Expr;
use crate::operator::{pass_through, DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Filter {
    predicate: Expr,
}

impl Filter {
    pub fn new(predicate: Expr) -> Self {
        Self { predicate }
    }

    pub fn predicate(&self) -> &Expr {
        &self.predicate
    }
}

impl OperatorTrait for Filter {
    fn arity(&self) -> usize {
        1
    }

    fn expressions(&self) -> Vec<&Expr> {
        vec![&self.predicate]
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        pass_through(inputs)
    }
}

impl PhysicalOperatorTrait for Filter {
    fn derive_properties(&self, required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        vec![DerivePropResult {
            output_prop: required.clone(),
            input_required_props: vec![required.clone()],
        }]
    }

    fn cost(&self) -> Cost {
        Cost::from(0.5)
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "predicate={}", self.predicate)
    }
}
