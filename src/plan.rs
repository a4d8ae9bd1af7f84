use std::collections::VecDeque;
use std::hash::{Hash, Hasher};
use std::sync::{Arc, OnceLock};

use crate::cascades::GroupExprId;
use crate::context::StatementContext;
use crate::error::{ensure_invariant, OptResult};
use crate::expr::{Expr, JoinType};
use crate::operator::LogicalOperator::{
    LogicalFilter, LogicalJoin, LogicalLimit, LogicalProjection, LogicalScan,
    LogicalSubQueryAlias, LogicalUnboundRelation,
};
use crate::operator::Operator::{Group, Logical, Physical};
use crate::operator::{
    Filter, Join, Limit, LogicalCte, LogicalOperator, Operator, PhysicalOperator, Projection,
    SubQueryAlias, TableScan, UnboundRelation,
};
use crate::properties::{LogicalProperty, PhysicalPropertySet};
use crate::visitor::{PlanVisitor, TreeStringVisitor};

pub type PlanNodeRef = Arc<PlanNode>;

/// One node in a plan.
///
/// This is used in both input and output of an optimizer. Given that we may have many different
/// phases in query optimization, we use one data structure to represent a plan.
///
/// Nodes are immutable. Every `with_*` method returns a new node and leaves `self` untouched,
/// which is what keeps the lazily derived logical property valid for the node's lifetime.
#[derive(Debug)]
pub struct PlanNode {
    operator: Operator,
    inputs: Vec<PlanNodeRef>,
    group_expr: Option<GroupExprId>,
    logical_prop: OnceLock<LogicalProperty>,
    physical_props: Option<PhysicalPropertySet>,
}

/// The `eq` should only look at the plan shape: operator and inputs.
impl PartialEq for PlanNode {
    fn eq(&self, other: &Self) -> bool {
        self.operator == other.operator && self.inputs == other.inputs
    }
}

impl Eq for PlanNode {}

impl Hash for PlanNode {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.operator.hash(state);
        self.inputs.hash(state);
    }
}

/// A query plan.
///
/// A query plan is a single root tree. It can be used in many places, for example, logical plan
/// after binding, a physical plan after completing optimizer.
#[derive(PartialEq, Debug, Clone)]
pub struct Plan {
    root: PlanNodeRef,
}

/// Breath first iterator of a plan, extra plans included.
struct BFSPlanNodeIter {
    cur_level: VecDeque<PlanNodeRef>,
}

impl Iterator for BFSPlanNodeIter {
    type Item = PlanNodeRef;

    fn next(&mut self) -> Option<Self::Item> {
        let p = self.cur_level.pop_front()?;
        self.cur_level.extend(p.extra_plans().iter().cloned());
        self.cur_level.extend(p.inputs.iter().cloned());
        Some(p)
    }
}

impl Plan {
    pub fn new(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn root(&self) -> PlanNodeRef {
        self.root.clone()
    }

    pub fn bfs_iterator(&self) -> impl Iterator<Item = PlanNodeRef> {
        BFSPlanNodeIter {
            cur_level: VecDeque::from(vec![self.root.clone()]),
        }
    }

    pub fn tree_string(&self) -> String {
        self.root.tree_string()
    }
}

impl PlanNode {
    /// Builds a node whose arity is known to be right.
    fn of(operator: Operator, inputs: Vec<PlanNodeRef>) -> PlanNodeRef {
        Arc::new(Self {
            operator,
            inputs,
            group_expr: None,
            logical_prop: OnceLock::new(),
            physical_props: None,
        })
    }

    pub fn operator(&self) -> &Operator {
        &self.operator
    }

    pub fn inputs(&self) -> &[PlanNodeRef] {
        &self.inputs
    }

    pub fn expressions(&self) -> Vec<&Expr> {
        self.operator.expressions()
    }

    pub fn group_expr(&self) -> Option<GroupExprId> {
        self.group_expr
    }

    pub fn physical_props(&self) -> Option<&PhysicalPropertySet> {
        self.physical_props.as_ref()
    }

    /// Logical property, derived on first access.
    pub fn logical_property(&self) -> &LogicalProperty {
        self.logical_prop.get_or_init(|| self.compute_output())
    }

    /// Derives the logical property from the inputs, ignoring any cached value.
    pub fn compute_output(&self) -> LogicalProperty {
        let inputs: Vec<&LogicalProperty> =
            self.inputs.iter().map(|i| i.logical_property()).collect();
        self.operator.derive_logical_property(&inputs)
    }

    /// Plans attached to this node besides its inputs.
    ///
    /// They are planned, visited and printed before the inputs.
    pub fn extra_plans(&self) -> &[PlanNodeRef] {
        match &self.operator {
            Logical(LogicalOperator::LogicalCte(cte)) => cte.alias_queries(),
            _ => &[],
        }
    }

    pub fn display_extra_plans_first(&self) -> bool {
        !self.extra_plans().is_empty()
    }

    /// Same operator with `children` as inputs.
    pub fn with_children(&self, children: Vec<PlanNodeRef>) -> OptResult<PlanNode> {
        PlanNodeBuilder::new(&self.operator)
            .add_inputs(children)
            .build()
    }

    pub fn with_group_expression(&self, group_expr: Option<GroupExprId>) -> PlanNode {
        PlanNode {
            operator: self.operator.clone(),
            inputs: self.inputs.clone(),
            group_expr,
            logical_prop: OnceLock::from(self.logical_property().clone()),
            physical_props: self.physical_props.clone(),
        }
    }

    pub fn with_logical_properties(&self, logical_prop: Option<LogicalProperty>) -> PlanNode {
        PlanNode {
            operator: self.operator.clone(),
            inputs: self.inputs.clone(),
            group_expr: None,
            logical_prop: logical_prop.map(OnceLock::from).unwrap_or_default(),
            physical_props: self.physical_props.clone(),
        }
    }

    pub fn with_group_expr_logical_prop_children(
        &self,
        group_expr: Option<GroupExprId>,
        logical_prop: Option<LogicalProperty>,
        children: Vec<PlanNodeRef>,
    ) -> OptResult<PlanNode> {
        PlanNodeBuilder::new(&self.operator)
            .add_inputs(children)
            .with_group_expr(group_expr)
            .with_logical_prop(logical_prop)
            .with_physical_props(self.physical_props.clone())
            .build()
    }

    pub fn is_logical(&self) -> bool {
        self.operator.is_logical()
    }

    pub fn is_physical(&self) -> bool {
        self.operator.is_physical()
    }

    /// Double dispatch to the visitor method of this node's operator.
    pub fn accept<V, R, C>(&self, visitor: &mut V, context: C) -> R
    where
        V: PlanVisitor<R, C>,
    {
        match &self.operator {
            Logical(op) => match op {
                LogicalScan(scan) => visitor.visit_logical_scan(scan, self, context),
                LogicalUnboundRelation(relation) => {
                    visitor.visit_logical_unbound_relation(relation, self, context)
                }
                LogicalFilter(filter) => visitor.visit_logical_filter(filter, self, context),
                LogicalProjection(projection) => {
                    visitor.visit_logical_projection(projection, self, context)
                }
                LogicalJoin(join) => visitor.visit_logical_join(join, self, context),
                LogicalLimit(limit) => visitor.visit_logical_limit(limit, self, context),
                LogicalSubQueryAlias(alias) => {
                    visitor.visit_logical_sub_query_alias(alias, self, context)
                }
                LogicalOperator::LogicalCte(cte) => visitor.visit_logical_cte(cte, self, context),
            },
            Physical(op) => match op {
                PhysicalOperator::PhysicalTableScan(scan) => {
                    visitor.visit_physical_table_scan(scan, self, context)
                }
                PhysicalOperator::PhysicalFilter(filter) => {
                    visitor.visit_physical_filter(filter, self, context)
                }
                PhysicalOperator::PhysicalProjection(projection) => {
                    visitor.visit_physical_projection(projection, self, context)
                }
                PhysicalOperator::PhysicalHashJoin(join) => {
                    visitor.visit_physical_hash_join(join, self, context)
                }
                PhysicalOperator::PhysicalNestedLoopJoin(join) => {
                    visitor.visit_physical_nested_loop_join(join, self, context)
                }
                PhysicalOperator::PhysicalLimit(limit) => {
                    visitor.visit_physical_limit(limit, self, context)
                }
                PhysicalOperator::PhysicalGather(gather) => {
                    visitor.visit_physical_gather(gather, self, context)
                }
            },
            Group(group) => visitor.visit_group_plan(group, self, context),
        }
    }

    pub fn tree_string(&self) -> String {
        let mut visitor = TreeStringVisitor::default();
        self.accept(&mut visitor, 0usize);
        visitor.finish()
    }
}

pub struct PlanNodeBuilder {
    operator: Operator,
    inputs: Vec<PlanNodeRef>,
    group_expr: Option<GroupExprId>,
    logical_prop: Option<LogicalProperty>,
    physical_props: Option<PhysicalPropertySet>,
}

impl PlanNodeBuilder {
    pub fn new(operator: &Operator) -> Self {
        Self {
            operator: operator.clone(),
            inputs: vec![],
            group_expr: None,
            logical_prop: None,
            physical_props: None,
        }
    }

    pub fn add_inputs<I>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = PlanNodeRef>,
    {
        self.inputs.extend(inputs);
        self
    }

    pub fn with_group_expr(mut self, group_expr: Option<GroupExprId>) -> Self {
        self.group_expr = group_expr;
        self
    }

    pub fn with_logical_prop(mut self, logical_prop: Option<LogicalProperty>) -> Self {
        self.logical_prop = logical_prop;
        self
    }

    pub fn with_physical_props(mut self, physical_props: Option<PhysicalPropertySet>) -> Self {
        self.physical_props = physical_props;
        self
    }

    /// Fails if the number of inputs does not match the operator's arity.
    pub fn build(self) -> OptResult<PlanNode> {
        ensure_invariant!(
            self.inputs.len() == self.operator.arity(),
            "{} expects {} children, got {}",
            self.operator.name(),
            self.operator.arity(),
            self.inputs.len()
        );
        Ok(PlanNode {
            operator: self.operator,
            inputs: self.inputs,
            group_expr: self.group_expr,
            logical_prop: self.logical_prop.map(OnceLock::from).unwrap_or_default(),
            physical_props: self.physical_props,
        })
    }
}

/// Fluent construction of bound logical plans.
///
/// This is how tests and upstream binders assemble input trees for the optimizer.
#[derive(Clone, Debug)]
pub struct LogicalPlanBuilder {
    root: PlanNodeRef,
}

impl LogicalPlanBuilder {
    pub fn from_plan(root: PlanNodeRef) -> Self {
        Self { root }
    }

    pub fn scan<S, I, C>(table_name: S, columns: I) -> Self
    where
        S: Into<String>,
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        Self::leaf(LogicalScan(TableScan::new(table_name, columns)))
    }

    /// Unqualified relation reference, possibly naming a CTE.
    pub fn unbound<S: Into<String>>(name: S) -> Self {
        Self::leaf(LogicalUnboundRelation(UnboundRelation::new([name.into()])))
    }

    pub fn unbound_qualified<I, S>(name_parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::leaf(LogicalUnboundRelation(UnboundRelation::new(name_parts)))
    }

    fn leaf(operator: LogicalOperator) -> Self {
        Self {
            root: PlanNode::of(Logical(operator), vec![]),
        }
    }

    fn unary(self, operator: LogicalOperator) -> Self {
        Self {
            root: PlanNode::of(Logical(operator), vec![self.root]),
        }
    }

    pub fn filter(self, predicate: Expr) -> Self {
        self.unary(LogicalFilter(Filter::new(predicate)))
    }

    pub fn project(self, exprs: Vec<Expr>) -> Self {
        self.unary(LogicalProjection(Projection::new(exprs)))
    }

    pub fn limit(self, limit: usize) -> Self {
        self.unary(LogicalLimit(Limit::new(limit)))
    }

    pub fn alias<S: Into<String>>(self, alias: S) -> Self {
        self.unary(LogicalSubQueryAlias(SubQueryAlias::new(alias)))
    }

    pub fn join(self, join_type: JoinType, condition: Option<Expr>, right: LogicalPlanBuilder) -> Self {
        let join = Join::new(join_type, condition);
        Self {
            root: PlanNode::of(Logical(LogicalJoin(join)), vec![self.root, right.root]),
        }
    }

    pub fn cross_join(self, right: LogicalPlanBuilder) -> Self {
        self.join(JoinType::Cross, None, right)
    }

    /// `WITH alias AS (query), ... body`.
    ///
    /// Each alias gets the next CTE id of the statement, in declaration order.
    pub fn with_ctes<I, S>(
        ctx: &mut StatementContext,
        ctes: I,
        body: LogicalPlanBuilder,
    ) -> OptResult<Self>
    where
        I: IntoIterator<Item = (S, LogicalPlanBuilder)>,
        S: Into<String>,
    {
        let alias_queries = ctes
            .into_iter()
            .map(|(alias, query)| {
                let alias = SubQueryAlias::for_cte(alias, ctx.next_cte_id());
                PlanNode::of(Logical(LogicalSubQueryAlias(alias)), vec![query.root])
            })
            .collect();
        let cte = LogicalCte::new(alias_queries)?;
        Ok(Self {
            root: PlanNode::of(Logical(LogicalOperator::LogicalCte(cte)), vec![body.root]),
        })
    }

    pub fn build(self) -> PlanNodeRef {
        self.root
    }
}
