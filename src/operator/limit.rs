use std::fmt;

use crate::cost::Cost;
use crate::expr::Expr;
use crate::operator::{pass_through, DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Limit {
    limit: usize,
    offset: usize,
}

impl Limit {
    pub fn new(limit: usize) -> Self {
        Self { limit, offset: 0 }
    }

    pub fn with_offset(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl OperatorTrait for Limit {
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

/// A limit counts rows globally, so its input must be gathered first.
impl PhysicalOperatorTrait for Limit {
    fn derive_properties(&self, _required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        vec![DerivePropResult {
            output_prop: PhysicalPropertySet::single(),
            input_required_props: vec![PhysicalPropertySet::single()],
        }]
    }

    fn cost(&self) -> Cost {
        Cost::from(0.1)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "limit={}, offset={}", self.limit, self.offset)
    }
}
