use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use log::{debug, trace};
use prettytable::Table;

use crate::cascades::{Group, GroupExpr, GroupExprId, GroupId, GroupIds, Winner};
use crate::error::{ensure_invariant, OptError, OptResult};
use crate::operator::{Gather, GroupPlan, Operator, PhysicalOperator};
use crate::plan::{PlanNode, PlanNodeBuilder, PlanNodeRef};
use crate::properties::{LogicalProperty, PhysicalPropertySet};
use crate::rules::RuleId;

static NEXT_MEMO_ID: AtomicU32 = AtomicU32::new(0);

/// Key of the structural dedup index.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
struct ExprSignature {
    operator: Operator,
    children: GroupIds,
}

/// Outcome of [`Memo::copy_in`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CopyInResult {
    /// Group the plan root landed in.
    pub group_id: GroupId,
    /// Expression of the plan root, `None` when the root was a group placeholder.
    pub expr_id: Option<GroupExprId>,
    /// Whether a new expression was created for the root.
    pub inserted: bool,
}

/// Search space of one planning session.
///
/// Groups and expressions live in arenas and refer to each other by id. Ids carry the id of the
/// memo that allocated them, so an id handed to another memo is rejected instead of silently
/// pointing at an unrelated group.
#[derive(Debug)]
pub struct Memo {
    id: u32,
    groups: Vec<Group>,
    exprs: Vec<GroupExpr>,
    expr_index: HashMap<ExprSignature, GroupExprId>,
}

impl Default for Memo {
    fn default() -> Self {
        Self::new()
    }
}

impl Memo {
    pub fn new() -> Self {
        Self {
            id: NEXT_MEMO_ID.fetch_add(1, Ordering::Relaxed),
            groups: vec![],
            exprs: vec![],
            expr_index: HashMap::new(),
        }
    }

    /// Copies a whole plan into fresh or existing groups and returns the root group.
    pub fn insert(&mut self, plan: &PlanNode) -> OptResult<GroupId> {
        Ok(self.copy_in(plan, None)?.group_id)
    }

    /// Copies `plan` into the memo.
    ///
    /// Children that are [`GroupPlan`] placeholders resolve to their group, every other child
    /// is copied in recursively. An expression whose operator and child groups are already
    /// known is not added again: the existing one is returned, even when it lives in another
    /// group than `target`.
    ///
    /// With a `target`, a new root expression joins that group, which requires the derived
    /// logical property to equal the group's.
    pub fn copy_in(&mut self, plan: &PlanNode, target: Option<GroupId>) -> OptResult<CopyInResult> {
        if let Some(target) = target {
            self.check_group_id(target)?;
        }

        if let Operator::Group(group_plan) = plan.operator() {
            let group_id = group_plan.group_id();
            self.check_group_id(group_id)?;
            if target.map_or(false, |t| t != group_id) {
                debug!(
                    "Plan resolves to group {} while copying into {:?}, groups are not merged",
                    group_id, target
                );
            }
            return Ok(CopyInResult {
                group_id,
                expr_id: None,
                inserted: false,
            });
        }

        let mut children = GroupIds::with_capacity(plan.inputs().len());
        for input in plan.inputs() {
            children.push(self.copy_in(input, None)?.group_id);
        }

        let signature = ExprSignature {
            operator: plan.operator().clone(),
            children,
        };

        if let Some(&expr_id) = self.expr_index.get(&signature) {
            let group_id = self.expr(expr_id).group_id();
            if target.map_or(false, |t| t != group_id) {
                debug!(
                    "Expression {} already lives in group {}, skipped copy into {:?}",
                    expr_id, group_id, target
                );
            }
            return Ok(CopyInResult {
                group_id,
                expr_id: Some(expr_id),
                inserted: false,
            });
        }

        let logical_prop = {
            let inputs: Vec<&LogicalProperty> = signature
                .children
                .iter()
                .map(|g| self.group(*g).logical_property())
                .collect();
            signature.operator.derive_logical_property(&inputs)
        };

        let group_id = match target {
            Some(target) => {
                let group = self.group(target);
                ensure_invariant!(
                    group.logical_property() == &logical_prop,
                    "{} with output {} cannot join group {} with output {}",
                    signature.operator.name(),
                    logical_prop,
                    target,
                    group.logical_property()
                );
                target
            }
            None => self.new_group(logical_prop),
        };

        let expr_id = GroupExprId {
            memo: self.id,
            index: self.exprs.len() as u32,
        };
        let physical = signature.operator.is_physical();
        trace!("Add {} as {} to group {}", signature.operator, expr_id, group_id);
        self.exprs.push(GroupExpr::new(
            expr_id,
            group_id,
            signature.operator.clone(),
            signature.children.clone(),
        ));
        self.expr_index.insert(signature, expr_id);
        self.group_mut_unchecked(group_id).add_expr(expr_id, physical);

        Ok(CopyInResult {
            group_id,
            expr_id: Some(expr_id),
            inserted: true,
        })
    }

    fn new_group(&mut self, logical_prop: LogicalProperty) -> GroupId {
        let group_id = GroupId {
            memo: self.id,
            index: self.groups.len() as u32,
        };
        self.groups.push(Group::new(group_id, logical_prop));
        group_id
    }

    fn check_group_id(&self, group_id: GroupId) -> OptResult<()> {
        if group_id.memo == self.id && (group_id.index as usize) < self.groups.len() {
            Ok(())
        } else {
            Err(OptError::UnknownGroupId(group_id))
        }
    }

    fn check_expr_id(&self, expr_id: GroupExprId) -> OptResult<()> {
        if expr_id.memo == self.id && (expr_id.index as usize) < self.exprs.len() {
            Ok(())
        } else {
            Err(OptError::UnknownGroupExprId(expr_id))
        }
    }

    /// Only for ids already validated or allocated by this memo.
    fn group(&self, group_id: GroupId) -> &Group {
        &self.groups[group_id.index as usize]
    }

    fn group_mut_unchecked(&mut self, group_id: GroupId) -> &mut Group {
        &mut self.groups[group_id.index as usize]
    }

    fn expr(&self, expr_id: GroupExprId) -> &GroupExpr {
        &self.exprs[expr_id.index as usize]
    }

    pub fn get_group(&self, group_id: GroupId) -> OptResult<&Group> {
        self.check_group_id(group_id)?;
        Ok(self.group(group_id))
    }

    pub(crate) fn get_group_mut(&mut self, group_id: GroupId) -> OptResult<&mut Group> {
        self.check_group_id(group_id)?;
        Ok(self.group_mut_unchecked(group_id))
    }

    pub fn get_group_expr(&self, expr_id: GroupExprId) -> OptResult<&GroupExpr> {
        self.check_expr_id(expr_id)?;
        Ok(self.expr(expr_id))
    }

    pub fn groups(&self) -> impl Iterator<Item = &Group> {
        self.groups.iter()
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    pub fn num_exprs(&self) -> usize {
        self.exprs.len()
    }

    pub fn mark_rule_applied(&mut self, expr_id: GroupExprId, rule: RuleId) -> OptResult<()> {
        self.check_expr_id(expr_id)?;
        self.exprs[expr_id.index as usize].mark_rule_applied(rule);
        Ok(())
    }

    pub fn is_rule_applied(&self, expr_id: GroupExprId, rule: RuleId) -> OptResult<bool> {
        Ok(self.get_group_expr(expr_id)?.is_rule_applied(rule))
    }

    /// A leaf standing for the whole group in rule bindings.
    pub fn group_plan(&self, group_id: GroupId) -> OptResult<PlanNodeRef> {
        let group = self.get_group(group_id)?;
        let operator = Operator::Group(GroupPlan::new(
            group_id,
            group.logical_property().clone(),
        ));
        Ok(Arc::new(
            PlanNodeBuilder::new(&operator)
                .with_logical_prop(Some(group.logical_property().clone()))
                .build()?,
        ))
    }

    /// Physical plan made of the winners recorded for `required`, starting at `group_id`.
    pub fn extract_best_plan(
        &self,
        group_id: GroupId,
        required: &PhysicalPropertySet,
    ) -> OptResult<PlanNodeRef> {
        let group = self.get_group(group_id)?;
        let winner = group
            .winner(required)
            .ok_or(OptError::NoPlanFound(group_id))?;
        let node = match winner {
            Winner::Expr {
                expr_id,
                output_prop,
                input_props,
                ..
            } => {
                let expr = self.get_group_expr(*expr_id)?;
                ensure_invariant!(
                    expr.children().len() == input_props.len(),
                    "winner {} of group {} records {} input properties for {} children",
                    expr_id,
                    group_id,
                    input_props.len(),
                    expr.children().len()
                );
                let inputs = expr
                    .children()
                    .iter()
                    .zip(input_props)
                    .map(|(child, prop)| self.extract_best_plan(*child, prop))
                    .collect::<OptResult<Vec<_>>>()?;
                PlanNodeBuilder::new(expr.operator())
                    .add_inputs(inputs)
                    .with_group_expr(Some(*expr_id))
                    .with_logical_prop(Some(group.logical_property().clone()))
                    .with_physical_props(Some(output_prop.clone()))
                    .build()?
            }
            Winner::Gather { .. } => {
                let input = self.extract_best_plan(group_id, &PhysicalPropertySet::any())?;
                PlanNodeBuilder::new(&Operator::Physical(PhysicalOperator::PhysicalGather(
                    Gather,
                )))
                .add_inputs([input])
                .with_logical_prop(Some(group.logical_property().clone()))
                .with_physical_props(Some(PhysicalPropertySet::single()))
                .build()?
            }
        };
        Ok(Arc::new(node))
    }

    /// Table of all groups, their expressions and winners.
    pub fn tree_string(&self) -> String {
        let mut table = Table::new();
        table.set_titles(row!["Group", "Output", "Expressions", "Winners"]);
        for group in &self.groups {
            let exprs = group
                .logical_exprs()
                .iter()
                .chain(group.physical_exprs())
                .map(|id| {
                    let expr = self.expr(*id);
                    let children: Vec<String> =
                        expr.children().iter().map(ToString::to_string).collect();
                    format!("{}: {} [{}]", id, expr.operator(), children.join(", "))
                })
                .collect::<Vec<_>>()
                .join("\n");
            let mut winners: Vec<String> = group
                .winners()
                .map(|(prop, winner)| match winner {
                    Winner::Expr { expr_id, cost, .. } => {
                        format!("{} -> {} ({})", prop, expr_id, cost)
                    }
                    Winner::Gather { cost } => format!("{} -> Gather ({})", prop, cost),
                })
                .collect();
            winners.sort();
            table.add_row(row![
                group.id(),
                group.logical_property(),
                exprs,
                winners.join("\n")
            ]);
        }
        table.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{col, lit_i64, JoinType, Slot};
    use crate::plan::LogicalPlanBuilder;

    fn scan_filter() -> PlanNodeRef {
        LogicalPlanBuilder::scan("t1", ["x", "y"])
            .filter(col(Slot::qualified("t1", "x")).gt(lit_i64(1)))
            .build()
    }

    #[test]
    fn test_insert_creates_group_per_node() {
        let mut memo = Memo::new();
        let root = memo.insert(&scan_filter()).unwrap();
        assert_eq!(2, memo.num_groups());
        assert_eq!(2, memo.num_exprs());

        let group = memo.get_group(root).unwrap();
        assert_eq!(1, group.logical_exprs().len());
        assert_eq!(scan_filter().logical_property(), group.logical_property());
    }

    #[test]
    fn test_insert_dedups_structurally_equal_plans() {
        let mut memo = Memo::new();
        let first = memo.copy_in(&scan_filter(), None).unwrap();
        let second = memo.copy_in(&scan_filter(), None).unwrap();
        assert!(first.inserted);
        assert!(!second.inserted);
        assert_eq!(first.group_id, second.group_id);
        assert_eq!(first.expr_id, second.expr_id);
        assert_eq!(2, memo.num_exprs());
    }

    #[test]
    fn test_shared_subtree_is_shared_group() {
        let scan = || LogicalPlanBuilder::scan("t1", ["x"]);
        let plan = scan().join(JoinType::Cross, None, scan()).build();
        let mut memo = Memo::new();
        let root = memo.insert(&plan).unwrap();
        let join = memo.get_group(root).unwrap().logical_exprs()[0];
        let children = memo.get_group_expr(join).unwrap().children().to_vec();
        assert_eq!(children[0], children[1]);
        assert_eq!(2, memo.num_groups());
    }

    #[test]
    fn test_copy_in_group_placeholder() {
        let mut memo = Memo::new();
        let root = memo.insert(&scan_filter()).unwrap();
        let placeholder = memo.group_plan(root).unwrap();
        let limit = LogicalPlanBuilder::from_plan(placeholder).limit(3).build();

        let result = memo.copy_in(&limit, None).unwrap();
        assert!(result.inserted);
        let expr = memo.get_group_expr(result.expr_id.unwrap()).unwrap();
        assert_eq!(&[root], expr.children());
    }

    #[test]
    fn test_copy_in_target_requires_same_output() {
        let mut memo = Memo::new();
        let root = memo.insert(&scan_filter()).unwrap();
        let other = LogicalPlanBuilder::scan("t2", ["z"]).build();
        let err = memo.copy_in(&other, Some(root)).unwrap_err();
        assert!(matches!(err, OptError::StructuralInvariantViolation(_)));
    }

    #[test]
    fn test_foreign_group_id_rejected() {
        let mut memo = Memo::new();
        let mut other = Memo::new();
        let foreign = other.insert(&scan_filter()).unwrap();
        memo.insert(&scan_filter()).unwrap();

        assert!(matches!(
            memo.get_group(foreign),
            Err(OptError::UnknownGroupId(id)) if id == foreign
        ));
        assert!(matches!(
            memo.extract_best_plan(foreign, &PhysicalPropertySet::any()),
            Err(OptError::UnknownGroupId(_))
        ));
    }

    #[test]
    fn test_extract_without_winner() {
        let mut memo = Memo::new();
        let root = memo.insert(&scan_filter()).unwrap();
        assert!(matches!(
            memo.extract_best_plan(root, &PhysicalPropertySet::any()),
            Err(OptError::NoPlanFound(id)) if id == root
        ));
    }

    #[test]
    fn test_rule_applied_marks() {
        let mut memo = Memo::new();
        let root = memo.insert(&scan_filter()).unwrap();
        let expr = memo.get_group(root).unwrap().logical_exprs()[0];
        assert!(!memo.is_rule_applied(expr, RuleId::MergeFilters).unwrap());
        memo.mark_rule_applied(expr, RuleId::MergeFilters).unwrap();
        assert!(memo.is_rule_applied(expr, RuleId::MergeFilters).unwrap());
        assert!(!memo.is_rule_applied(expr, RuleId::ImplementFilter).unwrap());
    }

    #[test]
    fn test_tree_string_lists_groups() {
        let mut memo = Memo::new();
        memo.insert(&scan_filter()).unwrap();
        let s = memo.tree_string();
        assert!(s.contains("G0"));
        assert!(s.contains("G1"));
        assert!(s.contains("LogicalScan(table=t1"));
    }
}
