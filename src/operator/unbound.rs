use std::fmt;

use itertools::Itertools;

use crate::expr::Expr;
use crate::operator::OperatorTrait;
use crate::properties::LogicalProperty;

/// A relation referenced by name that the binder has not resolved yet.
///
/// Single part names may refer to a common table expression in scope.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct UnboundRelation {
    name_parts: Vec<String>,
}

impl UnboundRelation {
    pub fn new<I, S>(name_parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name_parts: name_parts.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name_parts(&self) -> &[String] {
        &self.name_parts
    }

    /// The name, if this reference is unqualified.
    pub fn single_name(&self) -> Option<&str> {
        match self.name_parts.as_slice() {
            [name] => Some(name.as_str()),
            _ => None,
        }
    }
}

impl OperatorTrait for UnboundRelation {
    fn arity(&self) -> usize {
        0
    }

    fn expressions(&self) -> Vec<&Expr> {
        vec![]
    }

    /// Unbound leaves carry no schema.
    fn derive_logical_property(&self, _inputs: &[&LogicalProperty]) -> LogicalProperty {
        LogicalProperty::default()
    }
}

impl fmt::Display for UnboundRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "name={}", self.name_parts.iter().join("."))
    }
}
