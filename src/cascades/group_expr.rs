use enumset::EnumSet;
use smallvec::SmallVec;

use crate::cascades::{GroupExprId, GroupId};
use crate::operator::Operator;
use crate::rules::RuleId;

pub type GroupIds = SmallVec<[GroupId; 2]>;

/// An operator whose children are memo groups.
#[derive(Debug)]
pub struct GroupExpr {
    id: GroupExprId,
    group_id: GroupId,
    operator: Operator,
    children: GroupIds,
    applied_rules: EnumSet<RuleId>,
}

impl GroupExpr {
    pub(super) fn new(
        id: GroupExprId,
        group_id: GroupId,
        operator: Operator,
        children: GroupIds,
    ) -> Self {
        Self {
            id,
            group_id,
            operator,
            children,
            applied_rules: EnumSet::new(),
        }
    }

    pub fn id(&self) -> GroupExprId {
        self.id
    }

    /// Group owning this expression.
    pub fn group_id(&self) -> GroupId {
        self.group_id
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn children(&self) -> &[GroupId] {
        &self.children
    }

    pub fn is_rule_applied(&self, rule: RuleId) -> bool {
        self.applied_rules.contains(rule)
    }

    pub(super) fn mark_rule_applied(&mut self, rule: RuleId) {
        self.applied_rules.insert(rule);
    }
}
