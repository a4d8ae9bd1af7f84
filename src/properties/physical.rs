use std::fmt;

use crate::properties::{Distribution, PhysicalProp};

#[derive(Clone, Debug, Default, Hash, Eq, PartialEq)]
pub struct PhysicalPropertySet {
    distribution: Distribution,
}

impl PhysicalPropertySet {
    pub fn any() -> Self {
        Self::default()
    }

    pub fn single() -> Self {
        Self {
            distribution: Distribution::Single,
        }
    }

    pub fn with_distribution(distribution: Distribution) -> Self {
        Self { distribution }
    }

    pub fn distribution(&self) -> Distribution {
        self.distribution
    }
}

impl PhysicalProp for PhysicalPropertySet {
    fn satisfies(&self, other: &Self) -> bool {
        self.distribution.satisfies(&other.distribution)
    }
}

impl fmt::Display for PhysicalPropertySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{distribution: {}}}", self.distribution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_satisfies_any() {
        assert!(PhysicalPropertySet::single().satisfies(&PhysicalPropertySet::any()));
        assert!(PhysicalPropertySet::single().satisfies(&PhysicalPropertySet::single()));
        assert!(!PhysicalPropertySet::any().satisfies(&PhysicalPropertySet::single()));
    }
}
