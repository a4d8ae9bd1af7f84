use std::collections::HashMap;

use crate::cascades::{GroupExprId, GroupId};
use crate::cost::Cost;
use crate::properties::{LogicalProperty, PhysicalPropertySet};

/// Cheapest way found so far to deliver a physical property set from a group.
#[derive(Clone, Debug, PartialEq)]
pub enum Winner {
    /// A physical expression of the group, with the property set each input was optimized for.
    Expr {
        expr_id: GroupExprId,
        output_prop: PhysicalPropertySet,
        input_props: Vec<PhysicalPropertySet>,
        cost: Cost,
    },
    /// A gather enforcer on top of the group's winner for any distribution.
    Gather { cost: Cost },
}

impl Winner {
    pub fn cost(&self) -> Cost {
        match self {
            Winner::Expr { cost, .. } | Winner::Gather { cost } => *cost,
        }
    }
}

/// An equivalence class of expressions sharing one logical property.
///
/// Members are only ever added.
#[derive(Debug)]
pub struct Group {
    id: GroupId,
    logical_exprs: Vec<GroupExprId>,
    physical_exprs: Vec<GroupExprId>,
    logical_prop: LogicalProperty,
    explored: bool,
    winners: HashMap<PhysicalPropertySet, Winner>,
}

impl Group {
    pub(super) fn new(id: GroupId, logical_prop: LogicalProperty) -> Self {
        Self {
            id,
            logical_exprs: vec![],
            physical_exprs: vec![],
            logical_prop,
            explored: false,
            winners: HashMap::new(),
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn logical_exprs(&self) -> &[GroupExprId] {
        &self.logical_exprs
    }

    pub fn physical_exprs(&self) -> &[GroupExprId] {
        &self.physical_exprs
    }

    pub fn logical_property(&self) -> &LogicalProperty {
        &self.logical_prop
    }

    pub fn is_explored(&self) -> bool {
        self.explored
    }

    pub fn winner(&self, required: &PhysicalPropertySet) -> Option<&Winner> {
        self.winners.get(required)
    }

    pub fn winners(&self) -> impl Iterator<Item = (&PhysicalPropertySet, &Winner)> {
        self.winners.iter()
    }

    pub(super) fn add_expr(&mut self, expr_id: GroupExprId, physical: bool) {
        if physical {
            self.physical_exprs.push(expr_id);
        } else {
            self.logical_exprs.push(expr_id);
        }
    }

    pub(super) fn set_explored(&mut self) {
        self.explored = true;
    }

    pub(super) fn set_winner(&mut self, required: PhysicalPropertySet, winner: Winner) {
        self.winners.insert(required, winner);
    }
}
