//! Server configuration for `SacredSecret` sign-up.
//!
//! Loads configuration from environment variables with sensible defaults.
//! All settings can be overridden via `SACRED_*` environment variables.

use std::net::SocketAddr;

/// Default listen address.
const DEFAULT_ADDR: ([u8; 4], u16) = ([127, 0, 0, 1], 8300);

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Log level filter (e.g., `info`, `debug`, `warn`).
    pub log_level: String,
    /// Where validated sign-ups are sent.
    pub registrar: RegistrarKind,
    /// Origin allowed by CORS (`None` allows any origin).
    pub allowed_origin: Option<String>,
}

/// Supported registrar backends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrarKind {
    /// In-memory (development only, accounts lost on restart).
    Memory,
    /// Forward each sign-up to an upstream account service.
    Upstream { url: String },
}

/// Invalid configuration.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// `SACRED_REGISTRAR=upstream` without `SACRED_UPSTREAM_URL`.
    #[error("SACRED_UPSTREAM_URL is required when SACRED_REGISTRAR=upstream")]
    MissingUpstreamUrl,

    /// Unrecognised `SACRED_REGISTRAR` value.
    #[error("unknown registrar '{0}' (expected 'memory' or 'upstream')")]
    UnknownRegistrar(String),
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `PORT` — port to bind on (binds to `0.0.0.0`)
    /// - `SACRED_BIND_ADDR` — full bind address (overrides `PORT`, default: `127.0.0.1:8300`)
    /// - `SACRED_LOG_LEVEL` — log filter (default: `info`)
    /// - `SACRED_REGISTRAR` — `memory` or `upstream` (default: `memory`)
    /// - `SACRED_UPSTREAM_URL` — account service endpoint (required for `upstream`)
    /// - `SACRED_ALLOWED_ORIGIN` — CORS origin (default: any)
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the registrar settings are inconsistent.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup` instead of the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the registrar settings are inconsistent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Priority: SACRED_BIND_ADDR > PORT > default 127.0.0.1:8300
        let bind_addr = if let Some(addr) = lookup("SACRED_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(DEFAULT_ADDR))
        } else if let Some(port_str) = lookup("PORT") {
            let port: u16 = port_str.parse().unwrap_or(DEFAULT_ADDR.1);
            SocketAddr::from(([0, 0, 0, 0], port))
        } else {
            SocketAddr::from(DEFAULT_ADDR)
        };

        let log_level = lookup("SACRED_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        let registrar = match lookup("SACRED_REGISTRAR")
            .unwrap_or_else(|| "memory".to_owned())
            .to_lowercase()
            .as_str()
        {
            "memory" => RegistrarKind::Memory,
            "upstream" => {
                let url = lookup("SACRED_UPSTREAM_URL")
                    .filter(|u| !u.trim().is_empty())
                    .ok_or(ConfigError::MissingUpstreamUrl)?;
                RegistrarKind::Upstream { url }
            }
            other => return Err(ConfigError::UnknownRegistrar(other.to_owned())),
        };

        let allowed_origin = lookup("SACRED_ALLOWED_ORIGIN").filter(|o| o != "*");

        Ok(Self {
            bind_addr,
            log_level,
            registrar,
            allowed_origin,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        ServerConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8300".parse().unwrap());
        assert_eq!(config.log_level, "info");
        assert_eq!(config.registrar, RegistrarKind::Memory);
        assert_eq!(config.allowed_origin, None);
    }

    #[test]
    fn port_binds_all_interfaces() {
        let config = load(&[("PORT", "9000")]).unwrap();
        assert_eq!(config.bind_addr, "0.0.0.0:9000".parse().unwrap());
    }

    #[test]
    fn bind_addr_overrides_port() {
        let config = load(&[("PORT", "9000"), ("SACRED_BIND_ADDR", "10.0.0.5:7000")]).unwrap();
        assert_eq!(config.bind_addr, "10.0.0.5:7000".parse().unwrap());
    }

    #[test]
    fn unparsable_addr_falls_back() {
        let config = load(&[("SACRED_BIND_ADDR", "nonsense")]).unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:8300".parse().unwrap());
    }

    #[test]
    fn upstream_requires_url() {
        assert_eq!(
            load(&[("SACRED_REGISTRAR", "upstream")]).unwrap_err(),
            ConfigError::MissingUpstreamUrl
        );

        let config = load(&[
            ("SACRED_REGISTRAR", "Upstream"),
            ("SACRED_UPSTREAM_URL", "https://accounts.internal/v1/users"),
        ])
        .unwrap();
        assert_eq!(
            config.registrar,
            RegistrarKind::Upstream {
                url: "https://accounts.internal/v1/users".to_owned()
            }
        );
    }

    #[test]
    fn unknown_registrar_rejected() {
        assert_eq!(
            load(&[("SACRED_REGISTRAR", "ldap")]).unwrap_err(),
            ConfigError::UnknownRegistrar("ldap".to_owned())
        );
    }

    #[test]
    fn wildcard_origin_means_any() {
        assert_eq!(load(&[("SACRED_ALLOWED_ORIGIN", "*")]).unwrap().allowed_origin, None);
        assert_eq!(
            load(&[("SACRED_ALLOWED_ORIGIN", "https://sacredsecret.app")])
                .unwrap()
                .allowed_origin
                .as_deref(),
            Some("https://sacredsecret.app")
        );
    }
}
