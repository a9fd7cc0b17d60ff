use serde::Deserialize;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::error::ConfigError;
use crate::theory::{CurrencySymbol, Phase};

/// Static data for every theory the simulator knows: cost curves, growth
/// bases, cycle caps, tau factors. Nothing in here is hard-coded in the
/// engine.
#[derive(Debug, Clone, Deserialize)]
pub struct TheoryFile {
    pub theories: HashMap<String, TheoryParams>,
}

/// Constants for one theory.
#[derive(Debug, Clone, Deserialize)]
pub struct TheoryParams {
    /// Scales published rho gain into tau for scoring.
    pub tau_factor: f64,
    /// Log-space rho at which the run publishes.
    pub publish_rho: f64,
    /// Time-phase cycle cap in sim seconds.
    pub time_cycle: f64,
    /// Laplace-phase cycle cap in sim seconds.
    pub laplace_cycle: f64,
    /// Purchases are recorded only once `max_rho` has climbed to within
    /// this margin of the previous publication.
    #[serde(default = "default_history_margin")]
    pub history_margin: f64,
    pub variables: Vec<VariableParams>,
}

/// Constants for one purchasable variable.
#[derive(Debug, Clone, Deserialize)]
pub struct VariableParams {
    pub name: String,
    /// Linear cost of the level-0 purchase.
    pub cost_base: f64,
    /// Linear cost multiplier per level.
    pub cost_scale: f64,
    /// The level-0 purchase costs nothing.
    #[serde(default)]
    pub first_free: bool,
    /// Growth base of the variable's production contribution.
    #[serde(default = "default_value_base")]
    pub value_base: f64,
    /// Currency the variable is priced in.
    pub currency: CurrencySymbol,
    /// Phase in which the variable may be bought.
    pub unlock: Phase,
    /// Exiting this phase zeroes the variable's level.
    #[serde(default)]
    pub reset_phase: Option<Phase>,
}

fn default_history_margin() -> f64 {
    25.0
}
fn default_value_base() -> f64 {
    10.0
}

impl TheoryFile {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let file: TheoryFile = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
        file.validate()?;
        Ok(file)
    }

    /// Look up a theory id; anything outside the file is a configuration
    /// error.
    pub fn get(&self, id: &str) -> Result<&TheoryParams, ConfigError> {
        self.theories
            .get(id)
            .ok_or_else(|| ConfigError::UnknownTheory {
                name: id.to_string(),
            })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();
        for (id, theory) in &self.theories {
            theory.collect_errors(id, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Invalid {
                message: errors.join("\n"),
            })
        }
    }
}

impl TheoryParams {
    fn collect_errors(&self, id: &str, errors: &mut Vec<String>) {
        if self.tau_factor <= 0.0 {
            errors.push(format!(
                "{id}: tau_factor must be > 0, got {}",
                self.tau_factor
            ));
        }
        if !self.publish_rho.is_finite() {
            errors.push(format!(
                "{id}: publish_rho must be finite, got {}",
                self.publish_rho
            ));
        }
        if self.time_cycle <= 0.0 {
            errors.push(format!(
                "{id}: time_cycle must be > 0, got {}",
                self.time_cycle
            ));
        }
        if self.laplace_cycle <= 0.0 {
            errors.push(format!(
                "{id}: laplace_cycle must be > 0, got {}",
                self.laplace_cycle
            ));
        }
        if self.history_margin < 0.0 {
            errors.push(format!(
                "{id}: history_margin must be >= 0, got {}",
                self.history_margin
            ));
        }
        if self.variables.is_empty() {
            errors.push(format!("{id}: at least one variable is required"));
        }

        let mut seen = HashSet::new();
        for variable in &self.variables {
            if !seen.insert(variable.name.as_str()) {
                errors.push(format!("{id}: duplicate variable '{}'", variable.name));
            }
            if variable.cost_base <= 0.0 {
                errors.push(format!(
                    "{id}: variable '{}' cost_base must be > 0, got {}",
                    variable.name, variable.cost_base
                ));
            }
            if variable.cost_scale <= 0.0 {
                errors.push(format!(
                    "{id}: variable '{}' cost_scale must be > 0, got {}",
                    variable.name, variable.cost_scale
                ));
            }
            if variable.value_base <= 0.0 {
                errors.push(format!(
                    "{id}: variable '{}' value_base must be > 0, got {}",
                    variable.name, variable.value_base
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn test_path() -> PathBuf {
        PathBuf::from("test-theories.toml")
    }

    const MINIMAL: &str = r#"
        [theories.LT-c4]
        tau_factor = 0.015
        publish_rho = 20.0
        time_cycle = 55.0
        laplace_cycle = 300.0

        [[theories.LT-c4.variables]]
        name = "omega_t"
        cost_base = 10.0
        cost_scale = 10.0
        value_base = 7.0
        currency = "rho"
        unlock = "time"
    "#;

    #[test]
    fn minimal_theory_parses_with_defaults() {
        let file = TheoryFile::from_toml_str(MINIMAL, &test_path()).unwrap();
        let theory = file.get("LT-c4").unwrap();
        assert_eq!(theory.tau_factor, 0.015);
        assert_eq!(theory.history_margin, 25.0);
        let variable = &theory.variables[0];
        assert!(!variable.first_free);
        assert_eq!(variable.currency, CurrencySymbol::Rho);
        assert_eq!(variable.unlock, Phase::Time);
        assert_eq!(variable.reset_phase, None);
    }

    #[test]
    fn reset_phase_and_first_free_parse() {
        let toml = r#"
            [theories.LT-c4]
            tau_factor = 0.015
            publish_rho = 20.0
            time_cycle = 55.0
            laplace_cycle = 300.0

            [[theories.LT-c4.variables]]
            name = "c1s"
            cost_base = 1000.0
            cost_scale = 1.2
            first_free = true
            currency = "lambda"
            unlock = "laplace"
            reset_phase = "time"
        "#;
        let file = TheoryFile::from_toml_str(toml, &test_path()).unwrap();
        let variable = &file.get("LT-c4").unwrap().variables[0];
        assert!(variable.first_free);
        assert_eq!(variable.value_base, 10.0);
        assert_eq!(variable.currency, CurrencySymbol::Lambda);
        assert_eq!(variable.unlock, Phase::Laplace);
        assert_eq!(variable.reset_phase, Some(Phase::Time));
    }

    #[test]
    fn unknown_theory_lookup_fails() {
        let file = TheoryFile::from_toml_str(MINIMAL, &test_path()).unwrap();
        match file.get("T9") {
            Err(ConfigError::UnknownTheory { name }) => assert_eq!(name, "T9"),
            other => panic!("expected UnknownTheory, got {other:?}"),
        }
    }

    #[test]
    fn non_positive_cycle_rejected() {
        let toml = MINIMAL.replace("time_cycle = 55.0", "time_cycle = 0.0");
        let err = TheoryFile::from_toml_str(&toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("time_cycle"));
    }

    #[test]
    fn non_positive_tau_factor_rejected() {
        let toml = MINIMAL.replace("tau_factor = 0.015", "tau_factor = 0.0");
        let err = TheoryFile::from_toml_str(&toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("tau_factor"));
    }

    #[test]
    fn empty_variable_list_rejected() {
        let toml = r#"
            [theories.LT-c4]
            tau_factor = 0.015
            publish_rho = 20.0
            time_cycle = 55.0
            laplace_cycle = 300.0
            variables = []
        "#;
        let err = TheoryFile::from_toml_str(toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("at least one variable"));
    }

    #[test]
    fn duplicate_variable_names_rejected() {
        let toml = format!(
            "{MINIMAL}
            [[theories.LT-c4.variables]]
            name = \"omega_t\"
            cost_base = 10.0
            cost_scale = 10.0
            currency = \"rho\"
            unlock = \"time\"
        "
        );
        let err = TheoryFile::from_toml_str(&toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("duplicate variable"));
    }

    #[test]
    fn non_positive_cost_parameters_rejected() {
        let toml = MINIMAL.replace("cost_scale = 10.0", "cost_scale = 0.0");
        let err = TheoryFile::from_toml_str(&toml, &test_path()).unwrap_err();
        assert!(err.to_string().contains("cost_scale"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = TheoryFile::from_toml_str("theories = [broken", &test_path()).unwrap_err();
        assert!(err.to_string().contains("test-theories.toml"));
    }
}
