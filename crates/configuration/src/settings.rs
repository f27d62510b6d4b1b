use crate::error::ConfigError;
use serde::Deserialize;
use std::net::SocketAddr;

/// Upper bound on Monte Carlo runs accepted from configuration or requests.
pub const MAX_SIMULATION_RUNS: usize = 1_000_000;

/// The root configuration structure for the entire application.
///
/// Every section is optional in `config.toml`; missing values fall back to
/// the defaults below.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub simulation: SimulationSettings,
    pub risk: RiskSettings,
    pub server: ServerSettings,
}

/// Contains parameters for the Monte Carlo drawdown simulation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationSettings {
    /// Number of simulated equity paths (one drawdown sample each).
    pub runs: usize,
    /// Number of monthly results drawn per path.
    pub horizon_months: usize,
    /// Seed for reproducible runs. `None` draws from OS entropy.
    pub seed: Option<u64>,
}

/// Contains parameters for ruin-risk estimation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Accepted risk fraction used when a request does not provide one.
    pub default_accepted_risk: f64,
}

/// Contains parameters for the dashboard HTTP server.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub body_limit_bytes: usize,
}

/// Optional per-invocation overrides for `SimulationSettings`.
///
/// Shared by the CLI (`--runs`, `--horizon-months`, `--seed`) and the
/// simulation HTTP endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "clap", derive(clap::Args))]
pub struct SimulationOverrides {
    /// Number of simulated equity paths.
    #[cfg_attr(feature = "clap", arg(long))]
    #[serde(default)]
    pub runs: Option<usize>,
    /// Number of monthly results drawn per path.
    #[cfg_attr(feature = "clap", arg(long))]
    #[serde(default)]
    pub horizon_months: Option<usize>,
    /// Seed for reproducible runs.
    #[cfg_attr(feature = "clap", arg(long))]
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            runs: 10_000,
            horizon_months: 12,
            seed: None,
        }
    }
}

impl Default for RiskSettings {
    fn default() -> Self {
        Self {
            default_accepted_risk: 0.1,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            body_limit_bytes: 1024 * 1024 * 50,
        }
    }
}

impl SimulationSettings {
    /// Returns a copy with any provided overrides applied.
    pub fn with_overrides(&self, overrides: &SimulationOverrides) -> Self {
        Self {
            runs: overrides.runs.unwrap_or(self.runs),
            horizon_months: overrides.horizon_months.unwrap_or(self.horizon_months),
            seed: overrides.seed.or(self.seed),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.runs > MAX_SIMULATION_RUNS {
            return Err(ConfigError::ValidationError(format!(
                "simulation.runs must not exceed {MAX_SIMULATION_RUNS}, got {}",
                self.runs
            )));
        }
        if self.horizon_months == 0 {
            return Err(ConfigError::ValidationError(
                "simulation.horizon_months must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {e}")))
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;

        let risk = self.risk.default_accepted_risk;
        if !(risk > 0.0 && risk <= 1.0) {
            return Err(ConfigError::ValidationError(format!(
                "risk.default_accepted_risk must be in (0, 1], got {risk}"
            )));
        }

        if self.server.body_limit_bytes == 0 {
            return Err(ConfigError::ValidationError(
                "server.body_limit_bytes must be greater than 0".to_string(),
            ));
        }
        self.server.socket_addr()?;

        Ok(())
    }
}
