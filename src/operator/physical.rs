use std::fmt;

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;
use strum_macros::{EnumDiscriminants, IntoStaticStr};

use crate::operator::{Filter, Gather, HashJoin, Limit, NestedLoopJoin, Projection, TableScan};

/// Physical operator, the output of implementation rules.
#[enum_dispatch(OperatorTrait, PhysicalOperatorTrait)]
#[derive(Clone, Debug, Hash, Eq, PartialEq, EnumAsInner, EnumDiscriminants, IntoStaticStr)]
#[strum_discriminants(name(PhysicalOperatorKind), derive(Hash, IntoStaticStr))]
pub enum PhysicalOperator {
    PhysicalTableScan(TableScan),
    PhysicalFilter(Filter),
    PhysicalProjection(Projection),
    PhysicalHashJoin(HashJoin),
    PhysicalNestedLoopJoin(NestedLoopJoin),
    PhysicalLimit(Limit),
    PhysicalGather(Gather),
}

impl PhysicalOperator {
    pub fn kind(&self) -> PhysicalOperatorKind {
        self.into()
    }
}

impl fmt::Display for PhysicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        match self {
            PhysicalOperator::PhysicalTableScan(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalFilter(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalProjection(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalHashJoin(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalNestedLoopJoin(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalLimit(op) => write!(f, "{}({})", name, op),
            PhysicalOperator::PhysicalGather(op) => write!(f, "{}({})", name, op),
        }
    }
}
