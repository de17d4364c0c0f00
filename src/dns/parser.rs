//! Parses a DNS response down to the address in its first answer record.

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use crate::error::DnsError;
use crate::wire::WireReader;

use super::RecordType;

/// Top two bits set on a length byte mark a compression pointer.
const POINTER_MASK: u8 = 0xC0;

fn truncated(_: crate::wire::Truncated) -> DnsError {
    DnsError::MalformedResponse("response shorter than its declared layout")
}

/// Extracts the address from the first answer record.
///
/// Verifies the echoed transaction id, skips the question section, accepts
/// the answer name as either a compression pointer or a literal label run,
/// and validates RDLENGTH against the record type.
pub fn parse_answer(
    response: &[u8],
    expect_id: u16,
    rtype: RecordType,
) -> Result<IpAddr, DnsError> {
    let mut r = WireReader::new(response);

    let id = r.read_u16_be().map_err(truncated)?;
    if id != expect_id {
        return Err(DnsError::MalformedResponse("transaction id mismatch"));
    }
    r.skip(2).map_err(truncated)?; // flags
    r.skip(2).map_err(truncated)?; // QDCOUNT
    let ancount = r.read_u16_be().map_err(truncated)?;
    if ancount == 0 {
        return Err(DnsError::NoAnswer);
    }
    r.skip(4).map_err(truncated)?; // NSCOUNT + ARCOUNT

    skip_name(&mut r)?; // echoed question name
    r.skip(4).map_err(truncated)?; // QTYPE + QCLASS

    skip_name(&mut r)?; // answer name (pointer or literal)
    r.skip(8).map_err(truncated)?; // TYPE 2 + CLASS 2 + TTL 4
    let data_len = r.read_u16_be().map_err(truncated)?;
    if data_len != rtype.data_len() {
        return Err(DnsError::MalformedResponse(
            "answer data length does not match the record type",
        ));
    }
    let data = r.read_bytes(data_len as usize).map_err(truncated)?;

    Ok(match rtype {
        RecordType::A => IpAddr::V4(Ipv4Addr::new(data[0], data[1], data[2], data[3])),
        RecordType::Aaaa => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(data);
            IpAddr::V6(Ipv6Addr::from(octets))
        }
    })
}

/// Walks a name: label-length-prefixed runs terminated by a zero byte, where
/// any length byte may instead be a 2-byte compression pointer ending the run.
fn skip_name(r: &mut WireReader<'_>) -> Result<(), DnsError> {
    loop {
        let len = r.read_u8().map_err(truncated)?;
        if len == 0 {
            return Ok(());
        }
        if len & POINTER_MASK == POINTER_MASK {
            // second pointer byte
            r.skip(1).map_err(truncated)?;
            return Ok(());
        }
        r.skip(len as usize).map_err(truncated)?;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Query;
    use crate::wire;

    /// Builds a response echoing `query`'s question, with one answer record.
    fn synthetic_response(
        query: &Query,
        domain: &str,
        qtype: u16,
        literal_name: bool,
        rdata: &[u8],
    ) -> Vec<u8> {
        let mut resp = Vec::new();
        wire::put_u16_be(&mut resp, query.id);
        resp.extend_from_slice(&[0x81, 0x80]); // standard response, RA
        wire::put_u16_be(&mut resp, 1); // QDCOUNT
        wire::put_u16_be(&mut resp, 1); // ANCOUNT
        wire::put_u16_be(&mut resp, 0);
        wire::put_u16_be(&mut resp, 0);

        let name_at = resp.len() as u16;
        for label in domain.split('.') {
            resp.push(label.len() as u8);
            resp.extend_from_slice(label.as_bytes());
        }
        resp.push(0);
        wire::put_u16_be(&mut resp, qtype);
        wire::put_u16_be(&mut resp, 1);

        if literal_name {
            for label in domain.split('.') {
                resp.push(label.len() as u8);
                resp.extend_from_slice(label.as_bytes());
            }
            resp.push(0);
        } else {
            wire::put_u16_be(&mut resp, 0xC000 | name_at);
        }
        wire::put_u16_be(&mut resp, qtype);
        wire::put_u16_be(&mut resp, 1);
        resp.extend_from_slice(&[0, 0, 0, 60]); // TTL
        wire::put_u16_be(&mut resp, rdata.len() as u16);
        resp.extend_from_slice(rdata);
        resp
    }

    fn query(domain: &str, rtype: RecordType) -> Query {
        let labels: Vec<String> = domain.split('.').map(str::to_string).collect();
        Query::new(&labels, rtype).unwrap()
    }

    #[test]
    fn a_record_roundtrip() {
        let q = query("example.com", RecordType::A);
        let resp = synthetic_response(&q, "example.com", 1, false, &[93, 184, 216, 34]);
        let ip = parse_answer(&resp, q.id, RecordType::A).unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn literal_answer_name_accepted() {
        let q = query("example.com", RecordType::A);
        let resp = synthetic_response(&q, "example.com", 1, true, &[93, 184, 216, 34]);
        let ip = parse_answer(&resp, q.id, RecordType::A).unwrap();
        assert_eq!(ip, IpAddr::V4(Ipv4Addr::new(93, 184, 216, 34)));
    }

    #[test]
    fn aaaa_record_roundtrip() {
        let q = query("example.com", RecordType::Aaaa);
        let mut addr = [0u8; 16];
        addr[15] = 1;
        let resp = synthetic_response(&q, "example.com", 28, false, &addr);
        let ip = parse_answer(&resp, q.id, RecordType::Aaaa).unwrap();
        assert_eq!(ip, IpAddr::V6(Ipv6Addr::from(addr)));
    }

    #[test]
    fn zero_answers() {
        let q = query("example.com", RecordType::A);
        let mut resp = synthetic_response(&q, "example.com", 1, false, &[1, 2, 3, 4]);
        resp[6] = 0;
        resp[7] = 0; // ANCOUNT = 0
        assert!(matches!(
            parse_answer(&resp, q.id, RecordType::A),
            Err(DnsError::NoAnswer)
        ));
    }

    #[test]
    fn wrong_data_length_rejected() {
        let q = query("example.com", RecordType::A);
        let resp = synthetic_response(&q, "example.com", 1, false, &[1, 2, 3, 4, 5]);
        assert!(matches!(
            parse_answer(&resp, q.id, RecordType::A),
            Err(DnsError::MalformedResponse(_))
        ));
    }

    #[test]
    fn transaction_id_mismatch_rejected() {
        let q = query("example.com", RecordType::A);
        let resp = synthetic_response(&q, "example.com", 1, false, &[1, 2, 3, 4]);
        assert!(matches!(
            parse_answer(&resp, q.id.wrapping_add(1), RecordType::A),
            Err(DnsError::MalformedResponse(_))
        ));
    }

    #[test]
    fn truncated_responses_never_panic() {
        let q = query("example.com", RecordType::A);
        let resp = synthetic_response(&q, "example.com", 1, false, &[93, 184, 216, 34]);
        for len in 0..resp.len() {
            // every prefix must fail cleanly
            assert!(parse_answer(&resp[..len], q.id, RecordType::A).is_err());
        }
    }
}
