//! DNS message encoding and decoding (RFC 1035, section 4).
//!
//! Only what a stub resolver needs: building a single-question query and
//! reading any response, including compressed names.

use std::fmt::Write as _;
use std::net::{Ipv4Addr, Ipv6Addr};
use thiserror::Error;

pub const HEADER_LEN: usize = 12;
pub const CLASS_IN: u16 = 1;

const MAX_NAME_LEN: usize = 255;
const MAX_LABEL_LEN: usize = 63;
const MAX_POINTER_JUMPS: usize = 64;

const POINTER_MASK: u8 = 0xC0;

/// Errors raised while encoding or decoding a DNS message.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WireError {
    #[error("message truncated")]
    Truncated,

    #[error("label {0:?} exceeds 63 bytes")]
    LabelTooLong(String),

    #[error("empty label in {0:?}")]
    EmptyLabel(String),

    #[error("name exceeds 255 bytes")]
    NameTooLong,

    #[error("compression pointer to offset {0} is out of bounds")]
    BadPointer(usize),

    #[error("too many compression pointers")]
    PointerLoop,

    #[error("unsupported label type {0:#04x}")]
    BadLabelType(u8),

    #[error("{rtype:?} record data has invalid length {len}")]
    BadRdata { rtype: RecordType, len: usize },
}

// ============================================================================
// Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    Ns,
    Cname,
    Soa,
    Aaaa,
    Other(u16),
}

impl From<u16> for RecordType {
    fn from(value: u16) -> Self {
        match value {
            1 => Self::A,
            2 => Self::Ns,
            5 => Self::Cname,
            6 => Self::Soa,
            28 => Self::Aaaa,
            other => Self::Other(other),
        }
    }
}

impl From<RecordType> for u16 {
    fn from(value: RecordType) -> Self {
        match value {
            RecordType::A => 1,
            RecordType::Ns => 2,
            RecordType::Cname => 5,
            RecordType::Soa => 6,
            RecordType::Aaaa => 28,
            RecordType::Other(other) => other,
        }
    }
}

/// Response code carried in the low four bits of the header flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rcode {
    NoError,
    FormErr,
    ServFail,
    NxDomain,
    NotImp,
    Refused,
    Other(u8),
}

impl From<u8> for Rcode {
    fn from(value: u8) -> Self {
        match value {
            0 => Self::NoError,
            1 => Self::FormErr,
            2 => Self::ServFail,
            3 => Self::NxDomain,
            4 => Self::NotImp,
            5 => Self::Refused,
            other => Self::Other(other),
        }
    }
}

impl From<Rcode> for u8 {
    fn from(value: Rcode) -> Self {
        match value {
            Rcode::NoError => 0,
            Rcode::FormErr => 1,
            Rcode::ServFail => 2,
            Rcode::NxDomain => 3,
            Rcode::NotImp => 4,
            Rcode::Refused => 5,
            Rcode::Other(other) => other,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Header {
    pub id: u16,
    pub flags: u16,
    pub qdcount: u16,
    pub ancount: u16,
    pub nscount: u16,
    pub arcount: u16,
}

impl Header {
    pub const QR: u16 = 0x8000;
    pub const TC: u16 = 0x0200;
    pub const RD: u16 = 0x0100;
    pub const RA: u16 = 0x0080;

    pub fn is_response(&self) -> bool {
        self.flags & Self::QR != 0
    }

    pub fn is_truncated(&self) -> bool {
        self.flags & Self::TC != 0
    }

    pub fn rcode(&self) -> Rcode {
        let [_, low] = self.flags.to_be_bytes();
        Rcode::from(low & 0x0F)
    }

    fn write(&self, buf: &mut Vec<u8>) {
        for field in [
            self.id,
            self.flags,
            self.qdcount,
            self.ancount,
            self.nscount,
            self.arcount,
        ] {
            buf.extend_from_slice(&field.to_be_bytes());
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub name: String,
    pub qtype: RecordType,
    pub qclass: u16,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordData {
    A(Ipv4Addr),
    Aaaa(Ipv6Addr),
    Ns(String),
    Cname(String),
    Other(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    pub name: String,
    pub rtype: RecordType,
    pub class: u16,
    pub ttl: u32,
    pub data: RecordData,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub header: Header,
    pub questions: Vec<Question>,
    pub answers: Vec<Record>,
    pub authorities: Vec<Record>,
    pub additionals: Vec<Record>,
}

// ============================================================================
// Encoding
// ============================================================================

/// Builds a recursive query for one `(name, qtype, IN)` question.
///
/// # Errors
///
/// Returns an error if `name` is not encodable as a DNS name.
pub fn encode_query(id: u16, name: &str, qtype: RecordType) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(HEADER_LEN + name.len() + 6);

    Header {
        id,
        flags: Header::RD,
        qdcount: 1,
        ..Header::default()
    }
    .write(&mut buf);

    write_name(name, &mut buf)?;
    buf.extend_from_slice(&u16::from(qtype).to_be_bytes());
    buf.extend_from_slice(&CLASS_IN.to_be_bytes());

    Ok(buf)
}

/// Appends `name` as uncompressed labels. A trailing dot is optional.
pub(crate) fn write_name(name: &str, buf: &mut Vec<u8>) -> Result<(), WireError> {
    let start = buf.len();
    let relative = name.strip_suffix('.').unwrap_or(name);

    if !relative.is_empty() {
        for label in relative.split('.') {
            if label.is_empty() {
                return Err(WireError::EmptyLabel(name.to_string()));
            }
            let len = u8::try_from(label.len())
                .ok()
                .filter(|&len| usize::from(len) <= MAX_LABEL_LEN)
                .ok_or_else(|| WireError::LabelTooLong(label.to_string()))?;
            buf.push(len);
            buf.extend_from_slice(label.as_bytes());
        }
    }
    buf.push(0);

    if buf.len() - start > MAX_NAME_LEN {
        return Err(WireError::NameTooLong);
    }

    Ok(())
}

// ============================================================================
// Decoding
// ============================================================================

impl Message {
    /// Decodes a complete message.
    ///
    /// # Errors
    ///
    /// Returns an error if the buffer ends early or holds malformed names
    /// or record data.
    pub fn decode(buf: &[u8]) -> Result<Self, WireError> {
        let mut reader = Reader { buf, pos: 0 };

        let header = Header {
            id: reader.u16()?,
            flags: reader.u16()?,
            qdcount: reader.u16()?,
            ancount: reader.u16()?,
            nscount: reader.u16()?,
            arcount: reader.u16()?,
        };

        let questions = (0..header.qdcount)
            .map(|_| reader.question())
            .collect::<Result<_, _>>()?;
        let answers = reader.records(header.ancount)?;
        let authorities = reader.records(header.nscount)?;
        let additionals = reader.records(header.arcount)?;

        Ok(Message {
            header,
            questions,
            answers,
            authorities,
            additionals,
        })
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn bytes(&mut self, len: usize) -> Result<&'a [u8], WireError> {
        let end = self.pos.checked_add(len).ok_or(WireError::Truncated)?;
        let bytes = self.buf.get(self.pos..end).ok_or(WireError::Truncated)?;
        self.pos = end;
        Ok(bytes)
    }

    fn u16(&mut self) -> Result<u16, WireError> {
        let bytes = self.bytes(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn u32(&mut self) -> Result<u32, WireError> {
        let bytes = self.bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn name(&mut self) -> Result<String, WireError> {
        let (name, next) = read_name(self.buf, self.pos)?;
        self.pos = next;
        Ok(name)
    }

    fn question(&mut self) -> Result<Question, WireError> {
        Ok(Question {
            name: self.name()?,
            qtype: RecordType::from(self.u16()?),
            qclass: self.u16()?,
        })
    }

    fn records(&mut self, count: u16) -> Result<Vec<Record>, WireError> {
        (0..count).map(|_| self.record()).collect()
    }

    fn record(&mut self) -> Result<Record, WireError> {
        let name = self.name()?;
        let rtype = RecordType::from(self.u16()?);
        let class = self.u16()?;
        let ttl = self.u32()?;
        let len = usize::from(self.u16()?);
        let start = self.pos;
        let rdata = self.bytes(len)?;

        let bad_rdata = || WireError::BadRdata { rtype, len };

        let data = match rtype {
            RecordType::A => {
                let octets: [u8; 4] = rdata.try_into().map_err(|_| bad_rdata())?;
                RecordData::A(Ipv4Addr::from(octets))
            }
            RecordType::Aaaa => {
                let octets: [u8; 16] = rdata.try_into().map_err(|_| bad_rdata())?;
                RecordData::Aaaa(Ipv6Addr::from(octets))
            }
            RecordType::Ns | RecordType::Cname => {
                let (target, end) = read_name(self.buf, start)?;
                if end != start + len {
                    return Err(bad_rdata());
                }
                if rtype == RecordType::Ns {
                    RecordData::Ns(target)
                } else {
                    RecordData::Cname(target)
                }
            }
            RecordType::Soa | RecordType::Other(_) => RecordData::Other(rdata.to_vec()),
        };

        Ok(Record {
            name,
            rtype,
            class,
            ttl,
            data,
        })
    }
}

/// Reads a possibly compressed name starting at `start`.
///
/// Returns the name in absolute dotted form and the offset just past the
/// name in the original byte stream (after the first pointer, if any).
fn read_name(buf: &[u8], start: usize) -> Result<(String, usize), WireError> {
    let mut name = String::new();
    let mut pos = start;
    let mut resume = None;
    let mut jumps = 0;
    let mut wire_len = 1;

    loop {
        let len = *buf.get(pos).ok_or(WireError::Truncated)?;

        match len & POINTER_MASK {
            0x00 if len == 0 => {
                if name.is_empty() {
                    name.push('.');
                }
                return Ok((name, resume.unwrap_or(pos + 1)));
            }
            0x00 => {
                let len = usize::from(len);
                let label = buf.get(pos + 1..pos + 1 + len).ok_or(WireError::Truncated)?;

                wire_len += len + 1;
                if wire_len > MAX_NAME_LEN {
                    return Err(WireError::NameTooLong);
                }

                push_label(&mut name, label);
                pos += len + 1;
            }
            POINTER_MASK => {
                let low = *buf.get(pos + 1).ok_or(WireError::Truncated)?;
                let target = usize::from(u16::from_be_bytes([len & !POINTER_MASK, low]));

                resume.get_or_insert(pos + 2);
                jumps += 1;
                if jumps > MAX_POINTER_JUMPS {
                    return Err(WireError::PointerLoop);
                }
                if target >= buf.len() {
                    return Err(WireError::BadPointer(target));
                }
                pos = target;
            }
            _ => return Err(WireError::BadLabelType(len)),
        }
    }
}

/// Appends one label and its dot, escaping bytes that would be ambiguous
/// in presentation format.
fn push_label(name: &mut String, label: &[u8]) {
    for &byte in label {
        match byte {
            b'.' | b'\\' => {
                name.push('\\');
                name.push(char::from(byte));
            }
            b if b.is_ascii_graphic() => name.push(char::from(b)),
            b => {
                let _ = write!(name, "\\{b:03}");
            }
        }
    }
    name.push('.');
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE_QUERY: &[u8] = &[
        0xBE, 0xEF, // id
        0x01, 0x00, // flags: RD
        0x00, 0x01, // qdcount
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // an, ns, ar
        7, b'e', b'x', b'a', b'm', b'p', b'l', b'e', 3, b'c', b'o', b'm', 0, // name
        0x00, 0x02, // NS
        0x00, 0x01, // IN
    ];

    #[test]
    fn test_encode_query() {
        let query = encode_query(0xBEEF, "example.com", RecordType::Ns).unwrap();
        assert_eq!(query, EXAMPLE_QUERY);
    }

    #[test]
    fn test_encode_query_absolute_name() {
        let query = encode_query(0xBEEF, "example.com.", RecordType::Ns).unwrap();
        assert_eq!(query, EXAMPLE_QUERY);
    }

    #[test]
    fn test_encode_root() {
        let mut buf = Vec::new();
        write_name(".", &mut buf).unwrap();
        assert_eq!(buf, [0]);
    }

    #[test]
    fn test_encode_rejects_empty_label() {
        assert_eq!(
            encode_query(1, "a..b", RecordType::A),
            Err(WireError::EmptyLabel("a..b".into()))
        );
    }

    #[test]
    fn test_encode_rejects_long_label() {
        let name = format!("{}.com", "x".repeat(64));
        assert!(matches!(
            encode_query(1, &name, RecordType::A),
            Err(WireError::LabelTooLong(_))
        ));
    }

    #[test]
    fn test_encode_rejects_long_name() {
        let name = vec!["a".repeat(63); 5].join(".");
        assert_eq!(
            encode_query(1, &name, RecordType::A),
            Err(WireError::NameTooLong)
        );
    }

    #[test]
    fn test_decode_query_echo() {
        let message = Message::decode(EXAMPLE_QUERY).unwrap();
        assert_eq!(message.header.id, 0xBEEF);
        assert!(!message.header.is_response());
        assert_eq!(
            message.questions,
            vec![Question {
                name: "example.com.".into(),
                qtype: RecordType::Ns,
                qclass: CLASS_IN,
            }]
        );
        assert!(message.answers.is_empty());
    }

    fn response_with_answers(answers: &[u8], ancount: u16) -> Vec<u8> {
        let mut buf = EXAMPLE_QUERY.to_vec();
        buf[2..4].copy_from_slice(&(Header::QR | Header::RD | Header::RA).to_be_bytes());
        buf[6..8].copy_from_slice(&ancount.to_be_bytes());
        buf.extend_from_slice(answers);
        buf
    }

    #[test]
    fn test_decode_compressed_ns_records() {
        #[rustfmt::skip]
        let answers = [
            // example.com. NS ns1.example.com. (owner and suffix compressed)
            0xC0, 0x0C, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0E, 0x10, 0x00, 0x06,
            3, b'n', b's', b'1', 0xC0, 0x0C,
            // example.com. NS b.iana-servers.net.
            0xC0, 0x0C, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0x0E, 0x10, 0x00, 0x14,
            1, b'b', 12, b'i', b'a', b'n', b'a', b'-', b's', b'e', b'r', b'v', b'e', b'r', b's',
            3, b'n', b'e', b't', 0,
        ];
        let message = Message::decode(&response_with_answers(&answers, 2)).unwrap();

        assert!(message.header.is_response());
        assert_eq!(message.header.rcode(), Rcode::NoError);
        assert_eq!(message.answers.len(), 2);
        assert_eq!(message.answers[0].name, "example.com.");
        assert_eq!(message.answers[0].ttl, 3600);
        assert_eq!(
            message.answers[0].data,
            RecordData::Ns("ns1.example.com.".into())
        );
        assert_eq!(
            message.answers[1].data,
            RecordData::Ns("b.iana-servers.net.".into())
        );
    }

    #[test]
    fn test_decode_address_records() {
        #[rustfmt::skip]
        let answers = [
            0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x04,
            93, 184, 215, 14,
            0xC0, 0x0C, 0x00, 0x1C, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x10,
            0x20, 0x01, 0x0D, 0xB8, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0x01,
        ];
        let message = Message::decode(&response_with_answers(&answers, 2)).unwrap();

        assert_eq!(
            message.answers[0].data,
            RecordData::A(Ipv4Addr::new(93, 184, 215, 14))
        );
        assert_eq!(
            message.answers[1].data,
            RecordData::Aaaa("2001:db8::1".parse().unwrap())
        );
    }

    #[test]
    fn test_decode_unknown_type_kept_raw() {
        #[rustfmt::skip]
        let answers = [
            0xC0, 0x0C, 0x00, 0x10, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x03,
            2, b'h', b'i',
        ];
        let message = Message::decode(&response_with_answers(&answers, 1)).unwrap();
        assert_eq!(message.answers[0].rtype, RecordType::Other(16));
        assert_eq!(message.answers[0].data, RecordData::Other(vec![2, b'h', b'i']));
    }

    #[test]
    fn test_decode_bad_a_length() {
        #[rustfmt::skip]
        let answers = [
            0xC0, 0x0C, 0x00, 0x01, 0x00, 0x01, 0x00, 0x00, 0x00, 0x3C, 0x00, 0x03,
            10, 0, 0,
        ];
        assert_eq!(
            Message::decode(&response_with_answers(&answers, 1)),
            Err(WireError::BadRdata {
                rtype: RecordType::A,
                len: 3
            })
        );
    }

    #[test]
    fn test_decode_pointer_loop() {
        // The answer owner points at itself.
        let offset = u8::try_from(EXAMPLE_QUERY.len()).unwrap();
        let answers = [0xC0, offset];
        assert_eq!(
            Message::decode(&response_with_answers(&answers, 1)),
            Err(WireError::PointerLoop)
        );
    }

    #[test]
    fn test_decode_pointer_out_of_bounds() {
        let answers = [0xC0, 0xFF];
        assert_eq!(
            Message::decode(&response_with_answers(&answers, 1)),
            Err(WireError::BadPointer(0xFF))
        );
    }

    #[test]
    fn test_decode_reserved_label_type() {
        let answers = [0x80, 0x00];
        assert_eq!(
            Message::decode(&response_with_answers(&answers, 1)),
            Err(WireError::BadLabelType(0x80))
        );
    }

    #[test]
    fn test_decode_truncated() {
        assert_eq!(Message::decode(&EXAMPLE_QUERY[..5]), Err(WireError::Truncated));
        assert_eq!(
            Message::decode(&EXAMPLE_QUERY[..EXAMPLE_QUERY.len() - 1]),
            Err(WireError::Truncated)
        );
        // Claims one answer but carries none.
        assert_eq!(
            Message::decode(&response_with_answers(&[], 1)),
            Err(WireError::Truncated)
        );
    }

    #[test]
    fn test_header_flags() {
        let header = Header {
            flags: Header::QR | Header::TC | 0x0003,
            ..Header::default()
        };
        assert!(header.is_response());
        assert!(header.is_truncated());
        assert_eq!(header.rcode(), Rcode::NxDomain);
        assert_eq!(u8::from(Rcode::from(9)), 9);
    }

    #[test]
    fn test_label_escaping() {
        let mut name = String::new();
        push_label(&mut name, b"a.b\\c d");
        assert_eq!(name, "a\\.b\\\\c\\032d.");
    }
}
