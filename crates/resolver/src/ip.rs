use crate::error::ResolveError;
use crate::host::HostName;
use std::collections::HashSet;
use std::net::IpAddr;
use std::vec;
use tracing::debug;

/// Addresses returned by a lookup, in resolver order.
///
/// `getaddrinfo` reports an address once per socket type, so repeats are
/// dropped as the iterator is consumed.
#[derive(Debug, Clone)]
pub struct Addresses {
    inner: vec::IntoIter<IpAddr>,
    seen: HashSet<IpAddr>,
}

impl From<Vec<IpAddr>> for Addresses {
    fn from(addrs: Vec<IpAddr>) -> Self {
        Self {
            inner: addrs.into_iter(),
            seen: HashSet::new(),
        }
    }
}

impl Iterator for Addresses {
    type Item = IpAddr;

    fn next(&mut self) -> Option<IpAddr> {
        self.inner.by_ref().find(|ip| self.seen.insert(*ip))
    }
}

/// Resolves `host` to its IPv4 and IPv6 addresses through the system resolver.
///
/// # Errors
///
/// Returns `ResolveError::Lookup` when the system resolver fails and
/// `ResolveError::NoRecords` when it succeeds without any address.
pub fn lookup_ip(host: &HostName) -> Result<Addresses, ResolveError> {
    let addrs = dns_lookup::lookup_host(host.as_str()).map_err(|source| ResolveError::Lookup {
        host: host.to_string(),
        source,
    })?;

    debug!(%host, count = addrs.len(), "system resolver answered");

    if addrs.is_empty() {
        return Err(ResolveError::NoRecords {
            host: host.to_string(),
            kind: "address",
        });
    }

    Ok(Addresses::from(addrs))
}
