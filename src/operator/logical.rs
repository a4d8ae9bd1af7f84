use std::fmt;

use enum_as_inner::EnumAsInner;
use enum_dispatch::enum_dispatch;
use strum_macros::{EnumDiscriminants, IntoStaticStr};

use crate::operator::{
    Filter, Join, Limit, LogicalCte, Projection, SubQueryAlias, TableScan, UnboundRelation,
};

/// Logical relational operator.
#[enum_dispatch(OperatorTrait)]
#[derive(Clone, Debug, Hash, Eq, PartialEq, EnumAsInner, EnumDiscriminants, IntoStaticStr)]
#[strum_discriminants(name(LogicalOperatorKind), derive(Hash, IntoStaticStr))]
pub enum LogicalOperator {
    LogicalLimit(Limit),
    LogicalProjection(Projection),
    LogicalFilter(Filter),
    LogicalJoin(Join),
    LogicalScan(TableScan),
    LogicalUnboundRelation(UnboundRelation),
    LogicalSubQueryAlias(SubQueryAlias),
    LogicalCte(LogicalCte),
}

impl LogicalOperator {
    pub fn kind(&self) -> LogicalOperatorKind {
        self.into()
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name: &'static str = self.into();
        match self {
            LogicalOperator::LogicalLimit(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalProjection(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalFilter(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalJoin(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalScan(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalUnboundRelation(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalSubQueryAlias(op) => write!(f, "{}({})", name, op),
            LogicalOperator::LogicalCte(op) => write!(f, "{}({})", name, op),
        }
    }
}
