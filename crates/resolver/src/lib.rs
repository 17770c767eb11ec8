mod error;
mod host;
mod ip;
mod lookup;
mod ns;
mod system;
mod transport;
pub mod wire;

pub use error::{HostNameError, ResolveError};
pub use host::HostName;
pub use ip::{Addresses, lookup_ip};
pub use lookup::Lookup;
pub use ns::lookup_ns;
pub use system::{RESOLV_CONF, ResolvConf, SystemResolver};
pub use wire::WireError;
