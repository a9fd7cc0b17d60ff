use serde::Deserialize;
use std::path::Path;

use crate::error::ConfigError;

/// Simulator-wide settings, independent of any one theory.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulatorConfig {
    /// Starting tick length in sim seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Per-tick multiplicative growth of `dt`. Longer runs get coarser.
    #[serde(default = "default_ddt")]
    pub ddt: f64,
    /// Ticks between cooperative yields back to the scheduler.
    #[serde(default = "default_yield_interval")]
    pub yield_interval: u64,
    /// Path to the static theory data file.
    #[serde(default = "default_theory_file")]
    pub theory_file: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_dt() -> f64 {
    1.5
}
fn default_ddt() -> f64 {
    1.0001
}
fn default_yield_interval() -> u64 {
    500_000
}
fn default_theory_file() -> String {
    "theories.toml".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}

impl SimulatorConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content, path)
    }

    pub fn from_toml_str(content: &str, source_path: &Path) -> Result<Self, ConfigError> {
        let config: SimulatorConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.dt <= 0.0 {
            errors.push(format!("dt must be > 0.0, got {}. Example: dt = 1.5", self.dt));
        }

        if self.ddt < 1.0 {
            errors.push(format!(
                "ddt must be >= 1.0, got {}. Example: ddt = 1.0001",
                self.ddt
            ));
        }

        if self.yield_interval == 0 {
            errors.push(format!(
                "yield_interval must be > 0, got {}. Example: yield_interval = 500000",
                self.yield_interval
            ));
        }

        if self.theory_file.is_empty() {
            errors.push("theory_file must not be empty. Example: theory_file = \"theories.toml\"".to_string());
        }

        let valid_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            errors.push(format!(
                "log_level must be one of {:?}, got '{}'. Example: log_level = \"info\"",
                valid_levels, self.log_level
            ));
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    fn test_path() -> PathBuf {
        PathBuf::from("test-config.toml")
    }

    #[test]
    fn valid_config_loads_all_fields() {
        let toml = r#"
            dt = 1.0
            ddt = 1.01
            yield_interval = 1000
            theory_file = "data/theories.toml"
            log_level = "debug"
        "#;
        let config = SimulatorConfig::from_toml_str(toml, &test_path()).unwrap();
        assert_eq!(config.dt, 1.0);
        assert_eq!(config.ddt, 1.01);
        assert_eq!(config.yield_interval, 1000);
        assert_eq!(config.theory_file, "data/theories.toml");
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn defaults_applied_for_empty_config() {
        let config = SimulatorConfig::from_toml_str("", &test_path()).unwrap();
        assert_eq!(config.dt, 1.5);
        assert_eq!(config.ddt, 1.0001);
        assert_eq!(config.yield_interval, 500_000);
        assert_eq!(config.theory_file, "theories.toml");
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn non_positive_dt_rejected() {
        let err = SimulatorConfig::from_toml_str("dt = 0.0", &test_path()).unwrap_err();
        assert!(err.to_string().contains("dt must be > 0.0"));
    }

    #[test]
    fn shrinking_ddt_rejected() {
        let err = SimulatorConfig::from_toml_str("ddt = 0.99", &test_path()).unwrap_err();
        assert!(err.to_string().contains("ddt must be >= 1.0"));
    }

    #[test]
    fn zero_yield_interval_rejected() {
        let err = SimulatorConfig::from_toml_str("yield_interval = 0", &test_path()).unwrap_err();
        assert!(err.to_string().contains("yield_interval"));
    }

    #[test]
    fn invalid_log_level_rejected() {
        let err =
            SimulatorConfig::from_toml_str(r#"log_level = "verbose""#, &test_path()).unwrap_err();
        assert!(err.to_string().contains("log_level"));
    }

    #[test]
    fn multiple_errors_reported_together() {
        let toml = "dt = -1.0\nddt = 0.5\nyield_interval = 0";
        let err = SimulatorConfig::from_toml_str(toml, &test_path()).unwrap_err();
        let message = err.to_string();
        assert!(message.contains("dt"));
        assert!(message.contains("ddt"));
        assert!(message.contains("yield_interval"));
    }

    #[test]
    fn malformed_toml_includes_source_path() {
        let err = SimulatorConfig::from_toml_str("dt = [invalid", &test_path()).unwrap_err();
        assert!(err.to_string().contains("test-config.toml"));
    }

    #[test]
    fn from_file_loads_valid_config() {
        let mut tmp = NamedTempFile::new().unwrap();
        use std::io::Write;
        writeln!(tmp, "dt = 2.0").unwrap();
        let config = SimulatorConfig::from_file(tmp.path()).unwrap();
        assert_eq!(config.dt, 2.0);
    }

    #[test]
    fn from_file_missing_file_error() {
        let err = SimulatorConfig::from_file(Path::new("/nonexistent/config.toml")).unwrap_err();
        assert!(err.to_string().contains("cannot read"));
    }
}
