use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Output format for lookup results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Text,
    Json,
}

/// User configuration read from `~/.hostlookup.json`.
///
/// Every field is optional; command-line flags take precedence over
/// anything set here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nameserver: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<Format>,
}

impl Config {
    /// Host looked up when neither `--host` nor the config file names one.
    pub const DEFAULT_HOST: &'static str = "mikemarciano.dev.br";

    /// Port assumed when `nameserver` carries no port.
    pub const DNS_PORT: u16 = 53;

    /// Returns the configured host, falling back to [`Config::DEFAULT_HOST`].
    pub fn host_or_default(&self) -> &str {
        self.host.as_deref().unwrap_or(Self::DEFAULT_HOST)
    }

    /// Returns the configured output format, falling back to text.
    pub fn format_or_default(&self) -> Format {
        self.format.unwrap_or_default()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Parses the `nameserver` field as `IP` or `IP:port`.
    ///
    /// Returns `None` when the field is unset or not an address.
    pub fn nameserver_addr(&self) -> Option<SocketAddr> {
        let raw = self.nameserver.as_deref()?.trim();

        if let Ok(addr) = raw.parse::<SocketAddr>() {
            return Some(addr);
        }

        // Bracketed IPv6 without a port, e.g. "[::1]"
        let bare = raw.trim_start_matches('[').trim_end_matches(']');
        bare.parse::<IpAddr>()
            .ok()
            .map(|ip| SocketAddr::new(ip, Self::DNS_PORT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.host_or_default(), "mikemarciano.dev.br");
        assert_eq!(config.format_or_default(), Format::Text);
        assert!(config.timeout().is_none());
        assert!(config.nameserver_addr().is_none());
    }

    #[test]
    fn test_host_override() {
        let config = Config {
            host: Some("example.com".into()),
            ..Config::default()
        };
        assert_eq!(config.host_or_default(), "example.com");
    }

    #[test]
    fn test_nameserver_without_port() {
        let config = Config {
            nameserver: Some("9.9.9.9".into()),
            ..Config::default()
        };
        assert_eq!(
            config.nameserver_addr(),
            Some("9.9.9.9:53".parse().unwrap())
        );
    }

    #[test]
    fn test_nameserver_with_port() {
        let config = Config {
            nameserver: Some("127.0.0.1:5353".into()),
            ..Config::default()
        };
        assert_eq!(
            config.nameserver_addr(),
            Some("127.0.0.1:5353".parse().unwrap())
        );
    }

    #[test]
    fn test_nameserver_ipv6() {
        let bare = Config {
            nameserver: Some("[2001:4860:4860::8888]".into()),
            ..Config::default()
        };
        assert_eq!(
            bare.nameserver_addr(),
            Some("[2001:4860:4860::8888]:53".parse().unwrap())
        );

        let unbracketed = Config {
            nameserver: Some("::1".into()),
            ..Config::default()
        };
        assert_eq!(
            unbracketed.nameserver_addr(),
            Some("[::1]:53".parse().unwrap())
        );
    }

    #[test]
    fn test_nameserver_garbage() {
        let config = Config {
            nameserver: Some("dns.google".into()),
            ..Config::default()
        };
        assert!(config.nameserver_addr().is_none());
    }

    #[test]
    fn test_timeout_from_millis() {
        let config = Config {
            timeout_ms: Some(1500),
            ..Config::default()
        };
        assert_eq!(config.timeout(), Some(Duration::from_millis(1500)));
    }
}
