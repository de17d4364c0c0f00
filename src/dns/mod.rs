//! DNS wire codec and resolver (RFC 1035 header + question + answer, A and
//! AAAA records only, class IN).

mod parser;
mod resolver;

pub use resolver::{Resolver, DEFAULT_DNS_SERVER};

use crate::error::DnsError;
use crate::wire;

/// Record types the resolver asks for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordType {
    A,
    Aaaa,
}

impl RecordType {
    /// QTYPE value on the wire.
    pub fn qtype(self) -> u16 {
        match self {
            Self::A => 1,
            Self::Aaaa => 28,
        }
    }

    /// Expected RDATA length of an address record of this type.
    pub fn data_len(self) -> u16 {
        match self {
            Self::A => 4,
            Self::Aaaa => 16,
        }
    }
}

/// QCLASS IN.
const CLASS_IN: u16 = 1;

/// Header byte 3: recursion desired, everything else zero (standard query).
const FLAG_RECURSION_DESIRED: u8 = 0x01;

/// One standard query: 12-byte header plus a single question.
pub struct Query {
    pub id: u16,
    labels: Vec<String>,
    rtype: RecordType,
}

impl Query {
    /// Builds a query for the given domain labels. Labels are trimmed;
    /// an empty label makes the whole domain invalid.
    pub fn new(labels: &[String], rtype: RecordType) -> Result<Self, DnsError> {
        let mut clean = Vec::with_capacity(labels.len());
        for label in labels {
            let label = label.trim();
            if label.is_empty() {
                return Err(DnsError::InvalidDomain("empty label".into()));
            }
            if label.len() > 63 {
                return Err(DnsError::InvalidDomain(format!("label too long: {label}")));
            }
            clean.push(label.to_string());
        }
        if clean.is_empty() {
            return Err(DnsError::InvalidDomain("no labels".into()));
        }
        Ok(Self {
            id: rand::random::<u16>(),
            labels: clean,
            rtype,
        })
    }

    /// Serializes header and question section.
    pub fn encode(&self) -> Vec<u8> {
        // header 12 + qtype 2 + qclass 2, labels on top
        let mut query = Vec::with_capacity(16);
        wire::put_u16_be(&mut query, self.id);
        query.push(FLAG_RECURSION_DESIRED);
        query.push(0x00);
        wire::put_u16_be(&mut query, 1); // QDCOUNT
        wire::put_u16_be(&mut query, 0); // ANCOUNT
        wire::put_u16_be(&mut query, 0); // NSCOUNT
        wire::put_u16_be(&mut query, 0); // ARCOUNT

        for label in &self.labels {
            query.push(label.len() as u8);
            query.extend_from_slice(label.as_bytes());
        }
        query.push(0x00); // end of name

        wire::put_u16_be(&mut query, self.rtype.qtype());
        wire::put_u16_be(&mut query, CLASS_IN);
        query
    }
}
