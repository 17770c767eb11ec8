use crate::error::ResolveError;
use crate::host::HostName;
use crate::ip::{Addresses, lookup_ip};
use crate::lookup::Lookup;
use crate::ns::lookup_ns;
use std::fs;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Default location of the stub resolver configuration.
pub const RESOLV_CONF: &str = "/etc/resolv.conf";

const DNS_PORT: u16 = 53;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
const MAX_TIMEOUT: Duration = Duration::from_secs(30);

/// The parts of `resolv.conf` used for NS queries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvConf {
    pub nameservers: Vec<SocketAddr>,
    pub timeout: Option<Duration>,
}

impl ResolvConf {
    /// Parses `resolv.conf` syntax. Lines it does not understand are skipped.
    pub fn parse(contents: &str) -> Self {
        let mut conf = ResolvConf::default();

        for line in contents.lines() {
            let line = line.trim();
            if line.starts_with('#') || line.starts_with(';') {
                continue;
            }

            let mut fields = line.split_whitespace();
            match fields.next() {
                Some("nameserver") => {
                    if let Some(ip) = fields.next().and_then(|f| f.parse::<IpAddr>().ok()) {
                        conf.nameservers.push(SocketAddr::new(ip, DNS_PORT));
                    }
                }
                Some("options") => {
                    for option in fields {
                        if let Some(secs) = option
                            .strip_prefix("timeout:")
                            .and_then(|n| n.parse::<u64>().ok())
                        {
                            conf.timeout =
                                Some(Duration::from_secs(secs.max(1)).min(MAX_TIMEOUT));
                        }
                    }
                }
                _ => {}
            }
        }

        conf
    }

    /// Reads and parses `path`; an unreadable file yields an empty config.
    pub fn load_from(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents),
            Err(e) => {
                debug!(path = %path.display(), error = %e, "cannot read resolver config");
                Self::default()
            }
        }
    }

    /// First configured name server, or `127.0.0.1:53` when there is none.
    pub fn nameserver(&self) -> SocketAddr {
        self.nameservers
            .first()
            .copied()
            .unwrap_or(SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), DNS_PORT))
    }

    pub fn timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

/// Resolver backed by the operating system: `getaddrinfo` for addresses
/// and a direct query to the configured name server for NS records.
#[derive(Debug, Clone)]
pub struct SystemResolver {
    nameserver: SocketAddr,
    timeout: Duration,
}

impl SystemResolver {
    pub fn new(nameserver: SocketAddr, timeout: Duration) -> Self {
        Self {
            nameserver,
            timeout,
        }
    }

    /// Builds a resolver from `/etc/resolv.conf`, letting explicit values win.
    pub fn with_overrides(nameserver: Option<SocketAddr>, timeout: Option<Duration>) -> Self {
        let conf = match (nameserver, timeout) {
            (Some(_), Some(_)) => ResolvConf::default(),
            _ => ResolvConf::load_from(Path::new(RESOLV_CONF)),
        };

        let resolver = Self::new(
            nameserver.unwrap_or_else(|| conf.nameserver()),
            timeout.unwrap_or_else(|| conf.timeout()),
        );
        debug!(nameserver = %resolver.nameserver, timeout = ?resolver.timeout, "resolver ready");

        resolver
    }

    pub fn nameserver(&self) -> SocketAddr {
        self.nameserver
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Lookup for SystemResolver {
    fn lookup_ip(&self, host: &HostName) -> Result<Addresses, ResolveError> {
        lookup_ip(host)
    }

    fn lookup_ns(&self, host: &HostName) -> Result<Vec<String>, ResolveError> {
        lookup_ns(host, self.nameserver, self.timeout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_nameservers_in_order() {
        let conf = ResolvConf::parse(
            "# generated\nsearch example.com\nnameserver 10.0.0.2\nnameserver 2001:db8::53\n",
        );
        assert_eq!(
            conf.nameservers,
            vec![
                "10.0.0.2:53".parse::<SocketAddr>().unwrap(),
                "[2001:db8::53]:53".parse::<SocketAddr>().unwrap(),
            ]
        );
        assert_eq!(conf.nameserver(), "10.0.0.2:53".parse().unwrap());
    }

    #[test]
    fn test_parse_skips_comments_and_garbage() {
        let conf = ResolvConf::parse(concat!(
            "; nameserver 1.1.1.1\n",
            "#nameserver 8.8.8.8\n",
            "nameserver fe80::1%eth0\n",
            "nameserver\n",
            "nameserver dns.example\n",
        ));
        assert!(conf.nameservers.is_empty());
    }

    #[test]
    fn test_parse_timeout_option() {
        let conf = ResolvConf::parse("options ndots:2 timeout:2 attempts:3\n");
        assert_eq!(conf.timeout(), Duration::from_secs(2));
    }

    #[test]
    fn test_parse_timeout_is_clamped() {
        assert_eq!(
            ResolvConf::parse("options timeout:0").timeout(),
            Duration::from_secs(1)
        );
        assert_eq!(
            ResolvConf::parse("options timeout:600").timeout(),
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_empty_conf_defaults() {
        let conf = ResolvConf::parse("");
        assert_eq!(conf.nameserver(), "127.0.0.1:53".parse().unwrap());
        assert_eq!(conf.timeout(), DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolv.conf");
        fs::write(&path, "nameserver 192.0.2.53\noptions timeout:3\n").unwrap();

        let conf = ResolvConf::load_from(&path);
        assert_eq!(conf.nameserver(), "192.0.2.53:53".parse().unwrap());
        assert_eq!(conf.timeout(), Duration::from_secs(3));
    }

    #[test]
    fn test_load_from_missing_file() {
        let conf = ResolvConf::load_from(Path::new("/nonexistent/resolv.conf"));
        assert_eq!(conf, ResolvConf::default());
    }

    #[test]
    fn test_overrides_win() {
        let server: SocketAddr = "192.0.2.1:5353".parse().unwrap();
        let resolver =
            SystemResolver::with_overrides(Some(server), Some(Duration::from_millis(50)));
        assert_eq!(resolver.nameserver(), server);
        assert_eq!(resolver.timeout(), Duration::from_millis(50));
    }
}
