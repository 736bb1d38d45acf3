//! Process configuration, read once from the environment before the socket
//! binds and never mutated afterwards.

use shared::{Endpoint, DEFAULT_BIND_HOST, DEFAULT_PORT};
use std::collections::HashMap;
use std::env;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value {value:?} for {key}")]
    Invalid { key: &'static str, value: String },
}

/// Immutable sidecar configuration.
///
/// Built once at startup; absence of any required value is fatal and must
/// be detected before the UDP socket is bound.
#[derive(Debug, Clone)]
pub struct Config {
    /// Name of the game server instance this sidecar reports for.
    pub server_name: String,
    /// Namespace the instance runs in.
    pub namespace: String,
    /// Base URL of the control-plane API.
    pub api_base_url: String,
    /// Shared access code appended to every endpoint URL.
    pub api_code: String,
    /// Address the UDP socket binds to.
    pub bind_host: String,
    /// Port the UDP socket binds to.
    pub bind_port: u16,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&env::vars().collect())
    }

    /// Builds configuration from an explicit variable map.
    ///
    /// `SERVER_NAMESPACE` is the canonical namespace key; `POD_NAMESPACE`
    /// is accepted as an alias for minimal deployments.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self, ConfigError> {
        let namespace = non_empty(vars, "SERVER_NAMESPACE")
            .or_else(|| non_empty(vars, "POD_NAMESPACE"))
            .ok_or(ConfigError::Missing("SERVER_NAMESPACE"))?;

        let bind_port = match non_empty(vars, "BIND_PORT") {
            Some(value) => value.parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "BIND_PORT",
                value,
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Config {
            server_name: require(vars, "SERVER_NAME")?,
            namespace,
            api_base_url: require(vars, "API_SERVER_URL")?,
            api_code: require(vars, "API_SERVER_CODE")?,
            bind_host: non_empty(vars, "BIND_HOST")
                .unwrap_or_else(|| DEFAULT_BIND_HOST.to_string()),
            bind_port,
        })
    }

    /// Full URL for one of the four reporting endpoints, in the form
    /// `{base}/{path}?code={code}`.
    pub fn endpoint_url(&self, endpoint: Endpoint) -> String {
        format!(
            "{}/{}?code={}",
            self.api_base_url.trim_end_matches('/'),
            endpoint.path(),
            self.api_code
        )
    }

    /// `host:port` string for the UDP bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind_host, self.bind_port)
    }
}

fn require(vars: &HashMap<String, String>, key: &'static str) -> Result<String, ConfigError> {
    non_empty(vars, key).ok_or(ConfigError::Missing(key))
}

fn non_empty(vars: &HashMap<String, String>, key: &str) -> Option<String> {
    vars.get(key).filter(|value| !value.is_empty()).cloned()
}
