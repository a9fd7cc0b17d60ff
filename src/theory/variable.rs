//! Purchasable upgrade variables.

use crate::config::theories::VariableParams;
use crate::numeric::{LogValue, l10};
use crate::theory::cost::ExponentialCost;
use crate::theory::{CurrencySymbol, Phase};

/// A purchasable upgrade: a level, the log-space value it contributes to
/// production, and the cached cost of the next level.
///
/// A variable is created once at level 0 when the run starts and is only
/// mutated by [`Variable::buy`] and the phase-exit [`Variable::reset`].
#[derive(Debug, Clone)]
pub struct Variable {
    name: String,
    level: u32,
    value: LogValue,
    cost: LogValue,
    curve: ExponentialCost,
    log_value_base: f64,
    currency: CurrencySymbol,
    unlock: Phase,
    reset_phase: Option<Phase>,
}

impl Variable {
    pub fn new(params: &VariableParams) -> Self {
        let curve = if params.first_free {
            ExponentialCost::first_free(params.cost_base, params.cost_scale)
        } else {
            ExponentialCost::new(params.cost_base, params.cost_scale)
        };
        let mut variable = Variable {
            name: params.name.clone(),
            level: 0,
            value: 0.0,
            cost: 0.0,
            curve,
            log_value_base: l10(params.value_base),
            currency: params.currency,
            unlock: params.unlock,
            reset_phase: params.reset_phase,
        };
        variable.refresh();
        variable
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Log-space contribution to the active production formula.
    pub fn value(&self) -> LogValue {
        self.value
    }

    /// Log-space cost of the next purchase.
    pub fn cost(&self) -> LogValue {
        self.cost
    }

    pub fn currency(&self) -> CurrencySymbol {
        self.currency
    }

    /// Phase in which this variable may be bought.
    pub fn unlock(&self) -> Phase {
        self.unlock
    }

    /// Phase whose exit zeroes this variable, if any.
    pub fn reset_phase(&self) -> Option<Phase> {
        self.reset_phase
    }

    /// Advance one level. The engine has already verified affordability and
    /// gating and debits the paying currency itself; this only moves the
    /// level and refreshes the cached value and next cost.
    pub fn buy(&mut self) {
        self.level += 1;
        self.refresh();
    }

    /// Drop back to level 0, keeping the cached value and cost consistent.
    pub fn reset(&mut self) {
        self.level = 0;
        self.refresh();
    }

    fn refresh(&mut self) {
        self.value = f64::from(self.level) * self.log_value_base;
        self.cost = self.curve.at(self.level);
    }
}
