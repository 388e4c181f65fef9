//! Configuration
//!
//! Settings are layered, later sources overriding earlier ones:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config <path>`, or `loopscope.toml` in the working directory if present)
//! 3. Environment variables prefixed with `LOOPSCOPE_` (e.g. `LOOPSCOPE_ITERATIONS=5`)
//!
//! Command-line flags are applied on top by the CLI.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::interpreter::Declaration;
use crate::scenarios::Scenario;

/// Default config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "loopscope.toml";

/// Upper bound on loop iterations accepted from configuration
pub const MAX_ITERATIONS: u32 = 10_000;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("iterations must be at most {max}, got {got}")]
    TooManyIterations { max: u32, got: u32 },
}

/// How the CLI prints a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub scenario: Scenario,
    pub declaration: Declaration,
    pub iterations: u32,
    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    pub report_format: ReportFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scenario: Scenario::DeferredLog,
            declaration: Declaration::Let,
            iterations: 3,
            log_level: "warn".to_string(),
            report_format: ReportFormat::Text,
        }
    }
}

impl Settings {
    /// Load settings from defaults, an optional file and the environment
    ///
    /// An explicit `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_layered(path, environment())
    }

    fn load_layered(path: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::from(Path::new(DEFAULT_CONFIG_FILE)).required(false),
        };

        let settings: Settings = Self::builder()?
            .add_source(file)
            .add_source(env)
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Parse settings from a TOML string layered over the defaults
    pub fn from_toml_str(source: &str) -> Result<Self, SettingsError> {
        let settings: Settings = Self::builder()?
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    /// Render as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        let defaults = Settings::default();
        Ok(Config::builder()
            .set_default("scenario", "deferred-log")?
            .set_default("declaration", defaults.declaration.to_string())?
            .set_default("iterations", i64::from(defaults.iterations))?
            .set_default("log_level", defaults.log_level)?
            .set_default("report_format", "text")?)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.iterations > MAX_ITERATIONS {
            return Err(SettingsError::TooManyIterations {
                max: MAX_ITERATIONS,
                got: self.iterations,
            });
        }
        Ok(())
    }
}

/// `LOOPSCOPE_*` variables, e.g. `LOOPSCOPE_ITERATIONS=5`
fn environment() -> Environment {
    Environment::with_prefix("LOOPSCOPE").try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml_str("").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_file_overrides_defaults() {
        let settings = Settings::from_toml_str(
            r#"
            declaration = "var"
            iterations = 5
            scenario = "multi-variable"
            report_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(settings.declaration, Declaration::Var);
        assert_eq!(settings.iterations, 5);
        assert_eq!(settings.scenario, Scenario::MultiVariable);
        assert_eq!(settings.report_format, ReportFormat::Json);
        assert_eq!(settings.log_level, "warn");
    }

    #[test]
    fn test_rejects_unknown_declaration() {
        let err = Settings::from_toml_str(r#"declaration = "const""#).unwrap_err();
        assert!(matches!(err, SettingsError::Load(_)));
    }

    #[test]
    fn test_rejects_too_many_iterations() {
        let err = Settings::from_toml_str("iterations = 20000").unwrap_err();
        assert!(matches!(
            err,
            SettingsError::TooManyIterations { max: MAX_ITERATIONS, got: 20000 }
        ));
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let path = std::env::temp_dir().join("loopscope-does-not-exist.toml");
        assert!(Settings::load(Some(&path)).is_err());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("loopscope-test-{}.toml", std::process::id()));
        std::fs::write(&path, "iterations = 7\ndeclaration = \"var\"\n").unwrap();

        let settings = Settings::load(Some(&path));
        std::fs::remove_file(&path).ok();

        let settings = settings.unwrap();
        assert_eq!(settings.iterations, 7);
        assert_eq!(settings.declaration, Declaration::Var);
    }

    fn env_vars(vars: &[(&str, &str)]) -> Environment {
        let mut map = config::Map::new();
        for (key, value) in vars {
            map.insert(key.to_string(), value.to_string());
        }
        environment().source(Some(map))
    }

    #[test]
    fn test_environment_overrides_file() {
        let path = std::env::temp_dir().join(format!("loopscope-env-{}.toml", std::process::id()));
        std::fs::write(&path, "iterations = 7\ndeclaration = \"var\"\n").unwrap();

        let settings = Settings::load_layered(
            Some(&path),
            env_vars(&[("LOOPSCOPE_ITERATIONS", "5"), ("LOOPSCOPE_LOG_LEVEL", "debug")]),
        );
        let too_many = Settings::load_layered(
            Some(&path),
            env_vars(&[("LOOPSCOPE_ITERATIONS", "20000")]),
        );
        std::fs::remove_file(&path).ok();

        let settings = settings.unwrap();
        assert_eq!(settings.iterations, 5);
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.declaration, Declaration::Var);

        assert!(matches!(
            too_many.unwrap_err(),
            SettingsError::TooManyIterations { max: MAX_ITERATIONS, got: 20000 }
        ));
    }

    #[test]
    fn test_unprefixed_variables_are_ignored() {
        let env = env_vars(&[("ITERATIONS", "9"), ("OTHER_ITERATIONS", "9")]);
        let settings = Settings::load_layered(None, env).unwrap();

        assert_eq!(settings.iterations, Settings::default().iterations);
    }

    #[test]
    fn test_toml_round_trip() {
        let settings = Settings {
            iterations: 9,
            ..Settings::default()
        };
        let rendered = settings.to_toml().unwrap();

        assert!(rendered.contains("iterations = 9"));
        assert_eq!(Settings::from_toml_str(&rendered).unwrap(), settings);
    }
}
