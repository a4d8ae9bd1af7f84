//! ## Background
//!
//! The query planner accepts a bound logical query plan, and outputs an optimized physical plan
//! ready to be scheduled. Planning comes in several phases: analysis, rule based rewriting and
//! cost based search.
//!
//! Analysis takes care of common table expressions. A `WITH` clause is carried by a
//! [`LogicalCte`](operator::LogicalCte) node whose alias queries get a [`CteId`](context::CteId)
//! each when the plan is bound. The clause is first registered, then inlined: every reference
//! to a CTE is replaced by its definition and the node disappears from the plan.
//!
//! Rule based optimization is relative simple. We apply a collection of optimization rules to a
//! query plan repeatedly until some condition is met, for example, a fix point (plan no longer
//! changes) or number of times. Here it removes sub-query aliases and merges stacked filters
//! and limits before the cost based search starts.
//!
//! Cost based optimization tries to find plan with lowest cost by searching plan space. [2]
//! proposed a top-down searching strategy to enumerate possible plans, and used dynamic
//! programming to reduce duplicated computation. This is also the cost based optimization
//! framework implemented in this crate. There are also other searching strategies, for example,
//! [1] used a bottom-up searching strategy to enumerate possible plans and also used dynamic
//! programming to reduce search time.
//!
//! ## Design
//!
//! ### Plans
//!
//! [`PlanNode`](plan::PlanNode)s are immutable and shared through `Arc`. Equality and hashing
//! only look at operators and inputs, so two independently built trees of the same shape are
//! equal. The logical property of a node is derived on first access and cached.
//!
//! Consumers walk plans with a [`PlanVisitor`](visitor::PlanVisitor), which has one method per
//! operator.
//!
//! ### Heuristic Optimizer
//!
//! Heuristic optimizer is a rule base optimizer. As mentioned above, it runs a batch of rules
//! iteratively, until reaching fix point or maximum number of iteration times.
//!
//! ### Cascade Optimizer
//!
//! The [`Memo`](cascades::Memo) groups logically equivalent expressions. Expressions refer to
//! child groups by id, and an expression already present in the memo is never inserted twice.
//! Rules bind against memo expressions and copy their results back in; the search records the
//! cheapest physical expression per group and required physical property, adding a gather
//! enforcer when a single stream is required.
//!
//! ## Reference
//!
//! 1. Selinger, P. Griffiths, et al. "Access path selection in a relational database management
//! system." Readings in Artificial Intelligence and Databases. Morgan Kaufmann, 1989. 511-522.
//! 2. Graefe, G., 1995. The cascades framework for query optimization. IEEE Data Eng. Bull., 18(3),
//! pp.19-29.

#[macro_use]
extern crate prettytable;
#[macro_use]
extern crate lazy_static;

pub mod cascades;
pub mod context;
pub mod cost;
pub mod cte;
pub mod error;
pub mod expr;
pub mod heuristic;
pub mod operator;
pub mod optimizer;
pub mod plan;
pub mod planner;
pub mod profile;
pub mod properties;
pub mod rules;
pub mod visitor;
