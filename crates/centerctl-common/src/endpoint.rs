//! Service Endpoints
//!
//! Every command takes the service address as its first positional
//! argument. A bare port is the common case (services usually run next to
//! the operator's shell), so `8010` is shorthand for `<default host>:8010`.

use std::fmt;
use std::str::FromStr;

use crate::protocol::error::{CenterError, Result};

/// Host used when an endpoint is given as a bare port.
pub const DEFAULT_HOST: &str = "localhost";

/// Environment variable overriding [`DEFAULT_HOST`].
pub const HOST_ENV_VAR: &str = "CENTERCTL_HOST";

/// Default Information Center port.
pub const INFORMATION_CENTER_PORT: u16 = 8020;

/// Default Control Center port.
pub const CONTROL_CENTER_PORT: u16 = 8010;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Endpoint {
            host: host.into(),
            port,
        }
    }

    /// Endpoint on the default host, honoring `CENTERCTL_HOST`.
    pub fn on_default_host(port: u16) -> Self {
        Endpoint::new(default_host(), port)
    }

    /// Parses an endpoint, resolving a bare port against `default_host`.
    pub fn parse_with_default_host(s: &str, default_host: &str) -> Result<Self> {
        let s = s.trim();
        if let Ok(port) = s.parse::<u16>() {
            return Ok(Endpoint::new(default_host, port));
        }

        // rsplit so that bracketed IPv6 hosts keep their colons
        let (host, port) = s
            .rsplit_once(':')
            .ok_or_else(|| CenterError::InvalidEndpoint(s.to_string()))?;
        let port = port
            .parse::<u16>()
            .map_err(|_| CenterError::InvalidEndpoint(s.to_string()))?;
        if host.is_empty() {
            return Err(CenterError::InvalidEndpoint(s.to_string()));
        }

        Ok(Endpoint::new(host, port))
    }
}

impl FromStr for Endpoint {
    type Err = CenterError;

    fn from_str(s: &str) -> Result<Self> {
        Endpoint::parse_with_default_host(s, &default_host())
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    std::env::var(HOST_ENV_VAR)
        .ok()
        .filter(|h| !h.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_HOST.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_port_uses_default_host() {
        let ep = Endpoint::parse_with_default_host("8010", "localhost").unwrap();
        assert_eq!(ep, Endpoint::new("localhost", 8010));
        assert_eq!(ep.to_string(), "localhost:8010");
    }

    #[test]
    fn test_host_and_port() {
        let ep = Endpoint::parse_with_default_host("10.0.0.5:8020", "localhost").unwrap();
        assert_eq!(ep.host, "10.0.0.5");
        assert_eq!(ep.port, 8020);
    }

    #[test]
    fn test_ipv6_host() {
        let ep = Endpoint::parse_with_default_host("[::1]:8010", "localhost").unwrap();
        assert_eq!(ep.host, "[::1]");
        assert_eq!(ep.to_string(), "[::1]:8010");
    }

    #[test]
    fn test_invalid_endpoints() {
        for bad in ["", "abc", "host:", ":8010", "host:99999", "70000"] {
            let err = Endpoint::parse_with_default_host(bad, "localhost").unwrap_err();
            assert!(
                matches!(err, CenterError::InvalidEndpoint(_)),
                "expected InvalidEndpoint for {:?}, got {:?}",
                bad,
                err
            );
        }
    }
}
