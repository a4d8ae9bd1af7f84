use std::fmt;
use std::hash::{Hash, Hasher};

use crate::cascades::GroupId;
use crate::properties::LogicalProperty;

/// Stands for every expression of a memo group at once.
///
/// Rule bindings use it for the parts of a pattern they do not inspect, so a rule result can
/// point back at an existing group instead of copying a subtree.
#[derive(Clone, Debug)]
pub struct GroupPlan {
    group_id: GroupId,
    logical_property: LogicalProperty,
}

impl GroupPlan {
    pub fn new(group_id: GroupId, logical_property: LogicalProperty) -> Self {
        Self {
            group_id,
            logical_property,
        }
    }

    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn logical_property(&self) -> &LogicalProperty {
        &self.logical_property
    }
}

impl PartialEq for GroupPlan {
    fn eq(&self, other: &Self) -> bool {
        self.group_id == other.group_id
    }
}

impl Eq for GroupPlan {}

impl Hash for GroupPlan {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.group_id.hash(state);
    }
}

impl fmt::Display for GroupPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "GroupPlan(group={})", self.group_id)
    }
}
