use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::allocation::scoring::FactorWeights;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub scoring_weights: FactorWeights,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = LogFormat::from_str(
            &env::var("APP_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string()),
        );

        let defaults = FactorWeights::default();
        let scoring_weights = FactorWeights {
            priority: weight_from_env("APP_WEIGHT_PRIORITY", defaults.priority)?,
            urgency: weight_from_env("APP_WEIGHT_URGENCY", defaults.urgency)?,
            impact: weight_from_env("APP_WEIGHT_IMPACT", defaults.impact)?,
            risk: weight_from_env("APP_WEIGHT_RISK", defaults.risk)?,
            strategic: weight_from_env("APP_WEIGHT_STRATEGIC", defaults.strategic)?,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            scoring_weights,
        })
    }
}

fn weight_from_env(key: &'static str, fallback: f64) -> Result<f64, ConfigError> {
    match env::var(key) {
        Ok(raw) => {
            let parsed = raw.trim().parse::<f64>();
            parsed.map_err(|_| ConfigError::InvalidWeight { key, value: raw })
        }
        Err(_) => Ok(fallback),
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing and metrics controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Output shape for the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Pretty,
}

impl LogFormat {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "pretty" => Self::Pretty,
            _ => Self::Compact,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidWeight { key: &'static str, value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidWeight { key, value } => {
                write!(f, "{key} must be a valid number, found '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort => None,
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidWeight { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("APP_ENV");
        env::remove_var("APP_HOST");
        env::remove_var("APP_PORT");
        env::remove_var("APP_LOG_LEVEL");
        env::remove_var("APP_LOG_FORMAT");
        env::remove_var("APP_WEIGHT_PRIORITY");
        env::remove_var("APP_WEIGHT_URGENCY");
        env::remove_var("APP_WEIGHT_IMPACT");
        env::remove_var("APP_WEIGHT_RISK");
        env::remove_var("APP_WEIGHT_STRATEGIC");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.telemetry.log_level, "info");
        assert_eq!(config.telemetry.log_format, LogFormat::Compact);
        assert_eq!(config.scoring_weights, FactorWeights::default());
    }

    #[test]
    fn accepts_localhost_host() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_HOST", "localhost");
        let config = AppConfig::load().expect("config loads");
        let addr = config.server.socket_addr().expect("localhost resolves");
        assert_eq!(addr, SocketAddr::new(IpAddr::from([127, 0, 0, 1]), 3000));
        env::remove_var("APP_HOST");
    }

    #[test]
    fn reads_weight_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_WEIGHT_PRIORITY", "0.5");
        env::set_var("APP_WEIGHT_STRATEGIC", "0.1");
        let config = AppConfig::load().expect("config loads");
        assert_eq!(config.scoring_weights.priority, 0.5);
        assert_eq!(config.scoring_weights.strategic, 0.1);
        assert_eq!(config.scoring_weights.urgency, FactorWeights::default().urgency);
        env::remove_var("APP_WEIGHT_PRIORITY");
        env::remove_var("APP_WEIGHT_STRATEGIC");
    }

    #[test]
    fn rejects_malformed_weight() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("APP_WEIGHT_RISK", "not-a-number");
        match AppConfig::load() {
            Err(ConfigError::InvalidWeight { key, value }) => {
                assert_eq!(key, "APP_WEIGHT_RISK");
                assert_eq!(value, "not-a-number");
            }
            other => panic!("expected invalid weight error, got {other:?}"),
        }
        env::remove_var("APP_WEIGHT_RISK");
    }
}
