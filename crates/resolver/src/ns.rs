use crate::error::ResolveError;
use crate::host::HostName;
use crate::transport::{ExchangeError, Expected, exchange};
use crate::wire::{Rcode, RecordData, RecordType, encode_query};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::debug;

/// Asks `server` for the NS records of `host`.
///
/// Returns the name servers in absolute form (`ns1.example.com.`) in the
/// order the server listed them.
///
/// # Errors
///
/// Returns an error on timeout, transport failure, a malformed response,
/// a non-zero response code, or an answer without NS records.
pub fn lookup_ns(
    host: &HostName,
    server: SocketAddr,
    timeout: Duration,
) -> Result<Vec<String>, ResolveError> {
    let id: u16 = rand::random();
    let name = host.to_absolute();
    let query = encode_query(id, host.as_str(), RecordType::Ns).map_err(|source| {
        ResolveError::InvalidQuery {
            host: host.to_string(),
            source,
        }
    })?;

    debug!(%host, %server, id, "sending NS query");

    let expected = Expected {
        id,
        name: &name,
        qtype: RecordType::Ns,
    };

    let response = exchange(server, expected, &query, timeout).map_err(|e| {
        let host = host.to_string();
        match e {
            ExchangeError::Timeout => ResolveError::Timeout { host, server },
            ExchangeError::Io(source) => ResolveError::Transport {
                host,
                server,
                source,
            },
            ExchangeError::Wire(source) => ResolveError::Malformed {
                host,
                server,
                source,
            },
            ExchangeError::Mismatch => ResolveError::Mismatch { host, server },
        }
    })?;

    let rcode = response.header.rcode();
    debug!(%host, ?rcode, answers = response.answers.len(), "NS response received");

    match rcode {
        Rcode::NoError => {}
        Rcode::NxDomain => {
            return Err(ResolveError::NotFound {
                host: host.to_string(),
                server,
            });
        }
        Rcode::ServFail => {
            return Err(ResolveError::ServerFailure {
                host: host.to_string(),
                server,
            });
        }
        Rcode::Refused => {
            return Err(ResolveError::Refused {
                host: host.to_string(),
                server,
            });
        }
        other => {
            return Err(ResolveError::ResponseCode {
                host: host.to_string(),
                server,
                code: u8::from(other),
            });
        }
    }

    let servers: Vec<String> = response
        .answers
        .into_iter()
        .filter_map(|record| match record.data {
            RecordData::Ns(name) => Some(name),
            _ => None,
        })
        .collect();

    if servers.is_empty() {
        return Err(ResolveError::NoRecords {
            host: host.to_string(),
            kind: "NS",
        });
    }

    Ok(servers)
}
