use std::fmt;

use derive_more::{Add, From};

/// Estimated cost of a (sub)plan. Lower is better.
#[derive(Copy, Clone, Debug, Default, PartialEq, PartialOrd, Add, From)]
pub struct Cost(f64);

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
