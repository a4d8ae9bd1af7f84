use std::fmt;

use itertools::Itertools;

use crate::cost::Cost;
use crate::expr::Expr;
use crate::operator::{DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Projection {
    exprs: Vec<Expr>,
}

impl Projection {
    pub fn new(exprs: Vec<Expr>) -> Self {
        Self { exprs }
    }

    pub fn exprs(&self) -> &[Expr] {
        &self.exprs
    }
}

impl OperatorTrait for Projection {
    fn arity(&self) -> usize {
        1
    }

    fn expressions(&self) -> Vec<&Expr> {
        self.exprs.iter().collect()
    }

    fn derive_logical_property(&self, _inputs: &[&LogicalProperty]) -> LogicalProperty {
        LogicalProperty::new(self.exprs.iter().map(Expr::to_slot).collect())
    }
}

impl PhysicalOperatorTrait for Projection {
    fn derive_properties(&self, required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        vec![DerivePropResult {
            output_prop: required.clone(),
            input_required_props: vec![required.clone()],
        }]
    }

    fn cost(&self) -> Cost {
        Cost::from(0.1)
    }
}

impl fmt::Display for Projection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exprs=[{}]", self.exprs.iter().join(", "))
    }
}
