//! Scalar expressions and output slots.
//!
//! Plan nodes only read these values: they are produced by the binder and are carried through
//! every rewrite unchanged unless a rule builds a new expression on purpose.

use std::fmt;

use itertools::Itertools;

/// One output column of a plan node.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub struct Slot {
    name: String,
    qualifier: Option<String>,
    nullable: bool,
}

impl Slot {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            qualifier: None,
            nullable: true,
        }
    }

    pub fn qualified<Q: Into<String>, S: Into<String>>(qualifier: Q, name: S) -> Self {
        Self {
            name: name.into(),
            qualifier: Some(qualifier.into()),
            nullable: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn qualifier(&self) -> Option<&str> {
        self.qualifier.as_deref()
    }

    pub fn nullable(&self) -> bool {
        self.nullable
    }

    pub fn with_nullable(mut self, nullable: bool) -> Self {
        self.nullable = nullable;
        self
    }

    pub fn with_qualifier<Q: Into<String>>(mut self, qualifier: Q) -> Self {
        self.qualifier = Some(qualifier.into());
        self
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(q) => write!(f, "{}.{}", q, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum ScalarValue {
    Null,
    Boolean(bool),
    Int64(i64),
    Utf8(String),
}

impl fmt::Display for ScalarValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScalarValue::Null => write!(f, "NULL"),
            ScalarValue::Boolean(v) => write!(f, "{}", v),
            ScalarValue::Int64(v) => write!(f, "{}", v),
            ScalarValue::Utf8(v) => write!(f, "'{}'", v),
        }
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum BinaryOperator {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    And,
    Or,
    Plus,
    Minus,
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BinaryOperator::Eq => "=",
            BinaryOperator::NotEq => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::LtEq => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::GtEq => ">=",
            BinaryOperator::And => "AND",
            BinaryOperator::Or => "OR",
            BinaryOperator::Plus => "+",
            BinaryOperator::Minus => "-",
        };
        write!(f, "{}", s)
    }
}

#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum JoinType {
    Inner,
    Left,
    Right,
    Full,
    LeftSemi,
    LeftAnti,
    Cross,
}

/// Scalar expression used by plan operators.
#[derive(Clone, Debug, Hash, Eq, PartialEq)]
pub enum Expr {
    Column(Slot),
    Literal(ScalarValue),
    BinaryExpr {
        left: Box<Expr>,
        op: BinaryOperator,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull(Box<Expr>),
    Function {
        name: String,
        args: Vec<Expr>,
    },
    Alias {
        expr: Box<Expr>,
        name: String,
        qualifier: Option<String>,
    },
}

pub fn col(slot: Slot) -> Expr {
    Expr::Column(slot)
}

pub fn lit_i64(v: i64) -> Expr {
    Expr::Literal(ScalarValue::Int64(v))
}

pub fn binary(left: Expr, op: BinaryOperator, right: Expr) -> Expr {
    Expr::BinaryExpr {
        left: Box::new(left),
        op,
        right: Box::new(right),
    }
}

impl Expr {
    pub fn equal(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::Eq, other)
    }

    pub fn gt(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::Gt, other)
    }

    pub fn and(self, other: Expr) -> Expr {
        binary(self, BinaryOperator::And, other)
    }

    pub fn alias<S: Into<String>>(self, name: S) -> Expr {
        Expr::Alias {
            expr: Box::new(self),
            name: name.into(),
            qualifier: None,
        }
    }

    /// Slot produced when this expression appears in a projection list.
    pub fn to_slot(&self) -> Slot {
        match self {
            Expr::Column(slot) => slot.clone(),
            Expr::Alias {
                expr,
                name,
                qualifier,
            } => {
                let nullable = match expr.as_ref() {
                    Expr::Column(slot) => slot.nullable(),
                    Expr::Literal(v) => *v == ScalarValue::Null,
                    _ => true,
                };
                Slot {
                    name: name.clone(),
                    qualifier: qualifier.clone(),
                    nullable,
                }
            }
            other => Slot::new(other.to_string()),
        }
    }

    /// All column references, depth first.
    pub fn input_slots(&self) -> Vec<&Slot> {
        let mut slots = Vec::new();
        self.collect_slots(&mut slots);
        slots
    }

    fn collect_slots<'a>(&'a self, out: &mut Vec<&'a Slot>) {
        match self {
            Expr::Column(slot) => out.push(slot),
            Expr::Literal(_) => {}
            Expr::BinaryExpr { left, right, .. } => {
                left.collect_slots(out);
                right.collect_slots(out);
            }
            Expr::Not(e) | Expr::IsNull(e) => e.collect_slots(out),
            Expr::Function { args, .. } => {
                for arg in args {
                    arg.collect_slots(out);
                }
            }
            Expr::Alias { expr, .. } => expr.collect_slots(out),
        }
    }

    /// Returns whether this predicate contains `column = column` in a conjunct.
    pub fn has_equi_conjunct(&self) -> bool {
        match self {
            Expr::BinaryExpr {
                left,
                op: BinaryOperator::Eq,
                right,
            } => matches!(
                (left.as_ref(), right.as_ref()),
                (Expr::Column(_), Expr::Column(_))
            ),
            Expr::BinaryExpr {
                left,
                op: BinaryOperator::And,
                right,
            } => left.has_equi_conjunct() || right.has_equi_conjunct(),
            _ => false,
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Column(slot) => write!(f, "{}", slot),
            Expr::Literal(v) => write!(f, "{}", v),
            Expr::BinaryExpr { left, op, right } => write!(f, "({} {} {})", left, op, right),
            Expr::Not(e) => write!(f, "NOT {}", e),
            Expr::IsNull(e) => write!(f, "{} IS NULL", e),
            Expr::Function { name, args } => write!(f, "{}({})", name, args.iter().join(", ")),
            Expr::Alias { expr, name, .. } => write!(f, "{} AS {}", expr, name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alias_slot_keeps_column_nullability() {
        let x = Slot::qualified("t1", "x").with_nullable(false);
        let aliased = col(x).alias("y");
        let slot = aliased.to_slot();
        assert_eq!("y", slot.name());
        assert!(!slot.nullable());
        assert_eq!(None, slot.qualifier());
    }

    #[test]
    fn test_equi_conjunct_detection() {
        let a = col(Slot::qualified("a", "x"));
        let b = col(Slot::qualified("b", "y"));
        assert!(a.clone().equal(b.clone()).has_equi_conjunct());
        assert!(a.clone().gt(lit_i64(1)).and(a.clone().equal(b.clone())).has_equi_conjunct());
        assert!(!a.gt(b).has_equi_conjunct());
    }

    #[test]
    fn test_display() {
        let e = col(Slot::qualified("t", "x")).gt(lit_i64(3));
        assert_eq!("(t.x > 3)", e.to_string());
    }
}
