use std::fmt;

use itertools::Itertools;

use crate::cost::Cost;
use crate::expr::{Expr, Slot};
use crate::operator::{DerivePropResult, OperatorTrait, PhysicalOperatorTrait};
use crate::properties::{LogicalProperty, PhysicalPropertySet};

/// Scan of a bound catalog table.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct TableScan {
    table_name: String,
    columns: Vec<String>,
}

impl TableScan {
    pub fn new<S, I, C>(table_name: S, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self {
            table_name: table_name.into(),
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }
}

impl OperatorTrait for TableScan {
    fn arity(&self) -> usize {
        0
    }

    fn expressions(&self) -> Vec<&Expr> {
        vec![]
    }

    fn derive_logical_property(&self, _inputs: &[&LogicalProperty]) -> LogicalProperty {
        LogicalProperty::new(
            self.columns
                .iter()
                .map(|c| Slot::qualified(self.table_name.as_str(), c.as_str()))
                .collect(),
        )
    }
}

impl PhysicalOperatorTrait for TableScan {
    fn derive_properties(&self, _required: &PhysicalPropertySet) -> Vec<DerivePropResult> {
        vec![DerivePropResult {
            output_prop: PhysicalPropertySet::any(),
            input_required_props: vec![],
        }]
    }

    fn cost(&self) -> Cost {
        Cost::from(1.0)
    }
}

impl fmt::Display for TableScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "table={}, columns=[{}]",
            self.table_name,
            self.columns.iter().join(", ")
        )
    }
}
