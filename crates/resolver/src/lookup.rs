use crate::error::ResolveError;
use crate::host::HostName;
use crate::ip::Addresses;

/// The two lookups the command line offers.
pub trait Lookup {
    /// Resolves `host` to its IP addresses.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails.
    fn lookup_ip(&self, host: &HostName) -> Result<Addresses, ResolveError>;

    /// Resolves the authoritative name servers of `host`.
    ///
    /// # Errors
    ///
    /// Returns an error if resolution fails or no NS records exist.
    fn lookup_ns(&self, host: &HostName) -> Result<Vec<String>, ResolveError>;
}
