use std::fmt;
use std::sync::Arc;

use itertools::Itertools;

use crate::expr::Slot;

/// Derived, schema level metadata of a plan node or memo group.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default)]
pub struct LogicalProperty {
    output: Arc<Vec<Slot>>,
}

impl LogicalProperty {
    pub fn new(output: Vec<Slot>) -> Self {
        Self {
            output: Arc::new(output),
        }
    }

    pub fn output(&self) -> &[Slot] {
        &self.output
    }
}

impl fmt::Display for LogicalProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.output.iter().join(", "))
    }
}
