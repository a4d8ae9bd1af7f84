use std::fmt;

use derive_more::{Deref, From};

use crate::cost::Cost;
use crate::expr::{Expr, JoinType, Slot};
use crate::operator::{DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

/// Logical join operator.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Join {
    join_type: JoinType,
    condition: Option<Expr>,
}

impl Join {
    pub fn new(join_type: JoinType, condition: Option<Expr>) -> Self {
        Self {
            join_type,
            condition,
        }
    }

    pub fn cross() -> Self {
        Self::new(JoinType::Cross, None)
    }

    pub fn join_type(&self) -> JoinType {
        self.join_type
    }

    pub fn condition(&self) -> Option<&Expr> {
        self.condition.as_ref()
    }

    /// Whether a hash table can be built on `column = column` conjuncts.
    pub fn is_hashable(&self) -> bool {
        self.join_type != JoinType::Cross
            && self
                .condition
                .as_ref()
                .map(Expr::has_equi_conjunct)
                .unwrap_or(false)
    }
}

fn nullable(slots: &[Slot]) -> impl Iterator<Item = Slot> + '_ {
    slots.iter().map(|s| s.clone().with_nullable(true))
}

impl OperatorTrait for Join {
    fn arity(&self) -> usize {
        2
    }

    fn expressions(&self) -> Vec<&Expr> {
        self.condition.iter().collect()
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        let (left, right) = match inputs {
            [left, right] => (left.output(), right.output()),
            [left] => (left.output(), &[][..]),
            _ => (&[][..], &[][..]),
        };

        let output: Vec<Slot> = match self.join_type {
            JoinType::Inner | JoinType::Cross => left.iter().chain(right.iter()).cloned().collect(),
            JoinType::Left => left.iter().cloned().chain(nullable(right)).collect(),
            JoinType::Right => nullable(left).chain(right.iter().cloned()).collect(),
            JoinType::Full => nullable(left).chain(nullable(right)).collect(),
            JoinType::LeftSemi | JoinType::LeftAnti => left.to_vec(),
        };
        LogicalProperty::new(output)
    }
}

impl fmt::Display for Join {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.condition {
            Some(c) => write!(f, "type={:?}, condition={}", self.join_type, c),
            None => write!(f, "type={:?}", self.join_type),
        }
    }
}

fn join_properties() -> Vec<DerivePropResult> {
    vec![DerivePropResult {
        output_prop: PhysicalPropertySet::any(),
        input_required_props: vec![PhysicalPropertySet::any(), PhysicalPropertySet::any()],
    }]
}

/// Hash join, building on the right input.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Deref, From)]
pub struct HashJoin(Join);

impl OperatorTrait for HashJoin {
    fn arity(&self) -> usize {
        self.0.arity()
    }

    fn expressions(&self) -> Vec<&Expr> {
        self.0.expressions()
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        self.0.derive_logical_property(inputs)
    }
}

impl PhysicalOperatorTrait for HashJoin {
    fn derive_properties(&self, _required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        join_properties()
    }

    fn cost(&self) -> Cost {
        Cost::from(1.0)
    }
}

impl fmt::Display for HashJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq, Deref, From)]
pub struct NestedLoopJoin(Join);

impl OperatorTrait for NestedLoopJoin {
    fn arity(&self) -> usize {
        self.0.arity()
    }

    fn expressions(&self) -> Vec<&Expr> {
        self.0.expressions()
    }

    fn derive_logical_property(&self, inputs: &[&LogicalProperty]) -> LogicalProperty {
        self.0.derive_logical_property(inputs)
    }
}

impl PhysicalOperatorTrait for NestedLoopJoin {
    fn derive_properties(&self, _required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        join_properties()
    }

    fn cost(&self) -> Cost {
        Cost::from(5.0)
    }
}

impl fmt::Display for NestedLoopJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
