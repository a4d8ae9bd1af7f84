use thiserror::Error;

use crate::cascades::{GroupExprId, GroupId};

pub type OptResult<T> = Result<T, OptError>;

/// Errors raised while planning a query.
///
/// None of them are transient: each one aborts the current planning session.
#[derive(Error, Debug)]
pub enum OptError {
    #[error("structural invariant violated: {0}")]
    StructuralInvariantViolation(String),
    #[error("cannot find id for sub-query: {alias}")]
    UnknownAlias { alias: String },
    #[error("group {0} does not belong to this memo")]
    UnknownGroupId(GroupId),
    #[error("group expression {0} does not belong to this memo")]
    UnknownGroupExprId(GroupExprId),
    #[error("no physical plan found for group {0}")]
    NoPlanFound(GroupId),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl OptError {
    pub fn invariant<S: Into<String>>(msg: S) -> Self {
        OptError::StructuralInvariantViolation(msg.into())
    }
}

macro_rules! ensure_invariant {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            return Err($crate::error::OptError::invariant(format!($($arg)+)));
        }
    };
}

pub(crate) use ensure_invariant;
