use crate::wire::WireError;
use std::io;
use std::net::SocketAddr;
use thiserror::Error;

// ============================================================================
// Host Name Errors
// ============================================================================

/// Reasons a string is not a usable host name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostNameError {
    #[error("host name is empty")]
    Empty,

    #[error("host name is {0} characters long, the limit is 253")]
    TooLong(usize),

    #[error("host name {0:?} contains an empty label")]
    EmptyLabel(String),

    #[error("label {0:?} is longer than 63 bytes")]
    LabelTooLong(String),
}

// ============================================================================
// Resolution Errors
// ============================================================================

/// A failed lookup. Every variant is fatal to the command that issued it.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The system resolver (`getaddrinfo`) failed.
    #[error("lookup {host} failed: {source}")]
    Lookup {
        host: String,
        #[source]
        source: io::Error,
    },

    #[error("lookup {host} on {server}: no such host")]
    NotFound { host: String, server: SocketAddr },

    #[error("lookup {host}: no {kind} records")]
    NoRecords { host: String, kind: &'static str },

    #[error("lookup {host} on {server}: server failure")]
    ServerFailure { host: String, server: SocketAddr },

    #[error("lookup {host} on {server}: query refused")]
    Refused { host: String, server: SocketAddr },

    #[error("lookup {host} on {server}: unexpected response code {code}")]
    ResponseCode {
        host: String,
        server: SocketAddr,
        code: u8,
    },

    #[error("lookup {host} on {server}: i/o timeout")]
    Timeout { host: String, server: SocketAddr },

    #[error("lookup {host} on {server}: {source}")]
    Transport {
        host: String,
        server: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("lookup {host} on {server}: malformed response: {source}")]
    Malformed {
        host: String,
        server: SocketAddr,
        #[source]
        source: WireError,
    },

    /// A TCP answer carried another id or question than the query.
    #[error("lookup {host} on {server}: response does not match the query")]
    Mismatch { host: String, server: SocketAddr },

    #[error("cannot query {host}: {source}")]
    InvalidQuery {
        host: String,
        #[source]
        source: WireError,
    },
}
