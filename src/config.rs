//! Service configuration
//!
//! Defaults suit a local run; every field can be overridden through
//! `CASHFLOW_*` environment variables.

use std::env;
use std::path::PathBuf;

use crate::error::{Error, Result};
use crate::projection::DEFAULT_HORIZON_YEARS;

/// Largest projection horizon accepted from clients
pub const DEFAULT_MAX_HORIZON_YEARS: i64 = 300;

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Path prefix shared by every route
    pub api_prefix: String,

    /// Upper bound on `years` for projection requests
    pub max_horizon_years: i64,

    /// Horizon used when a request omits `years`
    pub default_horizon_years: i64,

    /// JSON snapshot for the store; `None` keeps data in memory only
    pub data_path: Option<PathBuf>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            api_prefix: "/api".to_string(),
            max_horizon_years: DEFAULT_MAX_HORIZON_YEARS,
            default_horizon_years: DEFAULT_HORIZON_YEARS,
            data_path: None,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            api_prefix: env::var("CASHFLOW_API_PREFIX").unwrap_or(defaults.api_prefix),
            max_horizon_years: parse_env("CASHFLOW_MAX_HORIZON_YEARS", defaults.max_horizon_years)?,
            default_horizon_years: parse_env("CASHFLOW_DEFAULT_HORIZON_YEARS", defaults.default_horizon_years)?,
            data_path: env::var("CASHFLOW_DATA_PATH").ok().map(PathBuf::from),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_horizon_years < 1 {
            return Err(Error::validation("max_horizon_years must be at least 1"));
        }
        if self.default_horizon_years < 1 || self.default_horizon_years > self.max_horizon_years {
            return Err(Error::validation(format!(
                "default_horizon_years must be between 1 and {}",
                self.max_horizon_years
            )));
        }
        if !self.api_prefix.is_empty() && !self.api_prefix.starts_with('/') {
            return Err(Error::validation("api_prefix must start with '/'"));
        }
        Ok(())
    }
}

fn parse_env(name: &str, default: i64) -> Result<i64> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("{} must be an integer, got '{}'", name, raw))),
        Err(_) => Ok(default),
    }
}
