use crate::error::ConfigError;
use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use settings::{
    Config, MAX_SIMULATION_RUNS, RiskSettings, ServerSettings, SimulationOverrides,
    SimulationSettings,
};

/// Environment variable prefix, e.g. `RISKDESK__SIMULATION__RUNS=5000`.
pub const ENV_PREFIX: &str = "RISKDESK";

/// Loads the application configuration.
///
/// Reads `path` when given (it must exist), otherwise an optional `config.toml`
/// in the working directory. `RISKDESK__*` environment variables are layered on
/// top. The result is deserialized into our strongly-typed `Config` struct and
/// validated before it is returned.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file_source = match path {
        Some(p) => config::File::from(p).required(true),
        None => config::File::with_name("config").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file_source)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded.");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.runs, 10_000);
        assert_eq!(config.server.socket_addr().unwrap().port(), 3000);
    }

    #[test]
    fn loads_partial_file_with_defaults() {
        let file = write_config(
            r#"
            [simulation]
            runs = 2500
            seed = 7

            [risk]
            default_accepted_risk = 0.25
            "#,
        );

        let config = load_config(Some(file.path())).unwrap();
        assert_eq!(config.simulation.runs, 2500);
        assert_eq!(config.simulation.horizon_months, 12);
        assert_eq!(config.simulation.seed, Some(7));
        assert_eq!(config.risk.default_accepted_risk, 0.25);
        assert_eq!(config.server.host, "0.0.0.0");
    }

    #[test]
    fn rejects_out_of_range_accepted_risk() {
        let file = write_config("[risk]\ndefault_accepted_risk = 1.5\n");
        let err = load_config(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn rejects_zero_horizon() {
        let file = write_config("[simulation]\nhorizon_months = 0\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn missing_explicit_file_is_a_load_error() {
        let err = load_config(Some(Path::new("/definitely/not/here.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::LoadError(_)));
    }

    #[test]
    fn overrides_replace_only_provided_fields() {
        let base = SimulationSettings {
            runs: 100,
            horizon_months: 6,
            seed: Some(1),
        };
        let merged = base.with_overrides(&SimulationOverrides {
            runs: Some(500),
            horizon_months: None,
            seed: None,
        });
        assert_eq!(
            merged,
            SimulationSettings {
                runs: 500,
                horizon_months: 6,
                seed: Some(1),
            }
        );
    }
}
