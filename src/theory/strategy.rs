//! Purchase strategies.
//!
//! A strategy decides which variables the simulated player is willing to
//! buy at all; milestone gating (the variable's unlock phase) layers on top
//! of it. The supported strategy names form a closed set per theory, and an
//! unrecognized name is rejected before the run starts.

use crate::error::ConfigError;

/// A named purchasing heuristic for the LT-c4 theory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// The published route: pump `omega_t`, `omega_s`, and `c`; never buy
    /// the laplace helpers `c1s`/`c2s`.
    Standard,
}

impl Strategy {
    /// Look up a strategy by its published name.
    pub fn from_name(theory: &str, name: &str) -> Result<Self, ConfigError> {
        match (theory, name) {
            ("LT-c4", "LT-c4") => Ok(Strategy::Standard),
            _ => Err(ConfigError::UnknownStrategy {
                theory: theory.to_string(),
                name: name.to_string(),
            }),
        }
    }

    /// The name this strategy is published under.
    pub fn label(&self) -> &'static str {
        match self {
            Strategy::Standard => "LT-c4",
        }
    }

    /// Buy permission for the variable at `index`, evaluated fresh for
    /// every candidate purchase.
    pub fn permits(&self, index: usize) -> bool {
        match self {
            Strategy::Standard => matches!(index, 0..=2),
        }
    }
}

/// The strategy names published for a theory; empty for unknown theories.
pub fn names_for(theory: &str) -> &'static [&'static str] {
    match theory {
        "LT-c4" => &["LT-c4"],
        _ => &[],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_strategy_resolves() {
        let strategy = Strategy::from_name("LT-c4", "LT-c4").unwrap();
        assert_eq!(strategy, Strategy::Standard);
        assert_eq!(strategy.label(), "LT-c4");
    }

    #[test]
    fn unknown_strategy_is_rejected() {
        let err = Strategy::from_name("LT-c4", "aggressive").unwrap_err();
        match err {
            ConfigError::UnknownStrategy { theory, name } => {
                assert_eq!(theory, "LT-c4");
                assert_eq!(name, "aggressive");
            }
            other => panic!("expected UnknownStrategy, got {other:?}"),
        }
    }

    #[test]
    fn strategy_for_unknown_theory_is_rejected() {
        assert!(Strategy::from_name("T9", "LT-c4").is_err());
    }

    #[test]
    fn standard_permits_only_first_three_variables() {
        let strategy = Strategy::Standard;
        for index in 0..3 {
            assert!(strategy.permits(index));
        }
        for index in 3..5 {
            assert!(!strategy.permits(index));
        }
    }

    #[test]
    fn published_names_cover_known_theories() {
        assert_eq!(names_for("LT-c4"), &["LT-c4"]);
        assert!(names_for("T9").is_empty());
    }
}
