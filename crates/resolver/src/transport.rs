use crate::wire::{CLASS_IN, Message, RecordType, WireError};
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream, UdpSocket};
use std::time::{Duration, Instant};
use thiserror::Error;
use tracing::{debug, trace};

const MAX_UDP_PAYLOAD: usize = 4096;

#[derive(Error, Debug)]
pub(crate) enum ExchangeError {
    #[error("i/o timeout")]
    Timeout,

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Wire(#[from] WireError),

    #[error("response does not match the query")]
    Mismatch,
}

/// The single question a query carries; answers must echo it.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Expected<'a> {
    pub id: u16,
    /// Absolute name, compared without regard to ASCII case.
    pub name: &'a str,
    pub qtype: RecordType,
}

impl Expected<'_> {
    fn matches(&self, message: &Message) -> bool {
        message.header.id == self.id
            && matches!(
                message.questions.as_slice(),
                [q] if q.qtype == self.qtype
                    && q.qclass == CLASS_IN
                    && q.name.eq_ignore_ascii_case(self.name)
            )
    }
}

fn timeout_or_io(e: io::Error) -> ExchangeError {
    match e.kind() {
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut => ExchangeError::Timeout,
        _ => ExchangeError::Io(e),
    }
}

/// Sends `query` to `server` and waits for the matching response.
///
/// UDP first; a truncated answer is fetched again over TCP.
pub(crate) fn exchange(
    server: SocketAddr,
    expected: Expected<'_>,
    query: &[u8],
    timeout: Duration,
) -> Result<Message, ExchangeError> {
    let response = exchange_udp(server, expected, query, timeout)?;

    if response.header.is_truncated() {
        debug!(%server, id = expected.id, "response truncated, switching to TCP");
        return exchange_tcp(server, expected, query, timeout);
    }

    Ok(response)
}

fn exchange_udp(
    server: SocketAddr,
    expected: Expected<'_>,
    query: &[u8],
    timeout: Duration,
) -> Result<Message, ExchangeError> {
    let local = if server.is_ipv4() {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0))
    } else {
        SocketAddr::from((Ipv6Addr::UNSPECIFIED, 0))
    };

    let socket = UdpSocket::bind(local)?;
    socket.connect(server)?;
    socket.send(query)?;

    let deadline = Instant::now() + timeout;
    let mut buf = [0u8; MAX_UDP_PAYLOAD];

    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return Err(ExchangeError::Timeout);
        }
        socket.set_read_timeout(Some(remaining))?;

        let len = socket.recv(&mut buf).map_err(timeout_or_io)?;
        let datagram = &buf[..len];

        // Datagrams with a foreign id are skipped undecoded.
        if datagram.len() < 2 || u16::from_be_bytes([datagram[0], datagram[1]]) != expected.id {
            trace!(%server, len, "ignoring datagram with foreign id");
            continue;
        }

        let message = match Message::decode(datagram) {
            Ok(message) => message,
            Err(e) => {
                debug!(%server, len, error = %e, "ignoring undecodable datagram");
                continue;
            }
        };
        if !message.header.is_response() {
            trace!(%server, "ignoring datagram without QR flag");
            continue;
        }
        if !expected.matches(&message) {
            debug!(
                %server,
                questions = ?message.questions,
                "ignoring answer to another question"
            );
            continue;
        }

        return Ok(message);
    }
}

fn exchange_tcp(
    server: SocketAddr,
    expected: Expected<'_>,
    query: &[u8],
    timeout: Duration,
) -> Result<Message, ExchangeError> {
    let len = u16::try_from(query.len())
        .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "query exceeds 65535 bytes"))?;

    let mut stream = TcpStream::connect_timeout(&server, timeout).map_err(timeout_or_io)?;
    stream.set_read_timeout(Some(timeout))?;
    stream.set_write_timeout(Some(timeout))?;

    let mut framed = Vec::with_capacity(query.len() + 2);
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(query);
    stream.write_all(&framed).map_err(timeout_or_io)?;

    let mut len_buf = [0u8; 2];
    stream.read_exact(&mut len_buf).map_err(timeout_or_io)?;

    let mut buf = vec![0u8; usize::from(u16::from_be_bytes(len_buf))];
    stream.read_exact(&mut buf).map_err(timeout_or_io)?;

    let message = Message::decode(&buf)?;
    if !expected.matches(&message) {
        debug!(
            %server,
            id = message.header.id,
            questions = ?message.questions,
            "TCP response does not match query"
        );
        return Err(ExchangeError::Mismatch);
    }

    Ok(message)
}
