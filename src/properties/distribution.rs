use std::fmt;

use crate::properties::PhysicalProp;

/// How the rows of a plan are spread over the cluster.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq)]
pub enum Distribution {
    /// No requirement, rows may live on any number of nodes.
    #[default]
    Any,
    /// All rows gathered on one node.
    Single,
}

impl PhysicalProp for Distribution {
    /// `self` is the delivered distribution, `other` the required one.
    fn satisfies(&self, other: &Self) -> bool {
        match other {
            Distribution::Any => true,
            Distribution::Single => *self == Distribution::Single,
        }
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Distribution::Any => write!(f, "ANY"),
            Distribution::Single => write!(f, "SINGLE"),
        }
    }
}
