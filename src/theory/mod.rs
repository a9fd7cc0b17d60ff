pub mod cost;
pub mod strategy;
pub mod variable;

use serde::{Deserialize, Serialize};

pub use cost::ExponentialCost;
pub use strategy::Strategy;
pub use variable::Variable;

/// The two alternating production modes of a laplace-transform theory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    /// Time domain: produces the primary currency rho.
    Time,
    /// Laplace domain: produces the secondary currency lambda.
    Laplace,
}

impl Phase {
    /// The mode entered when this one's cycle cap expires.
    pub fn toggled(self) -> Phase {
        match self {
            Phase::Time => Phase::Laplace,
            Phase::Laplace => Phase::Time,
        }
    }
}

/// Currency channel a variable is priced in. The assignment is fixed for
/// the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurrencySymbol {
    Rho,
    Lambda,
}

impl CurrencySymbol {
    /// Index into the engine's currency array.
    pub fn channel(self) -> usize {
        match self {
            CurrencySymbol::Rho => 0,
            CurrencySymbol::Lambda => 1,
        }
    }
}
