//! Turns the command-line target string into protocol, TLS mode, host, port
//! and path.

use std::net::IpAddr;

use crate::error::{DnsError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Http,
    Ws,
}

/// A parsed target string. `host` never contains the port or path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedTarget {
    pub protocol: Protocol,
    pub use_tls: bool,
    pub host: String,
    pub port: Option<u16>,
    pub path: String,
}

impl ParsedTarget {
    /// Explicit port if one was given, otherwise the scheme default.
    pub fn port(&self) -> u16 {
        self.port
            .unwrap_or(if self.use_tls { 443 } else { 80 })
    }

    /// The host as an IP literal, when it is one. Literals skip resolution.
    pub fn ip_literal(&self) -> Option<IpAddr> {
        self.host.parse().ok()
    }

    /// Value for the Host header: the bare host, with the port appended
    /// when one was given explicitly.
    pub fn host_header(&self) -> String {
        match self.port {
            Some(port) => format!("{}:{port}", self.host),
            None => self.host.clone(),
        }
    }

    pub fn is_localhost(&self) -> bool {
        self.host == "localhost" || self.host == "127.0.0.1"
    }

    /// Domain labels for the DNS question section.
    pub fn labels(&self) -> Vec<String> {
        self.host.split('.').map(str::to_string).collect()
    }
}

/// Parses `scheme://host[:port][/path]`. Bare targets with no scheme default
/// to https. Non-localhost, non-literal hosts must look like a domain
/// (contain a dot); localhost targets must carry an explicit port and never
/// use TLS.
pub fn parse_target(raw: &str) -> Result<ParsedTarget> {
    let raw = raw.trim();

    let (protocol, use_tls, rest) = if let Some(rest) = raw.strip_prefix("https://") {
        (Protocol::Http, true, rest)
    } else if let Some(rest) = raw.strip_prefix("http://") {
        (Protocol::Http, false, rest)
    } else if let Some(rest) = raw.strip_prefix("wss://") {
        (Protocol::Ws, true, rest)
    } else if let Some(rest) = raw.strip_prefix("ws://") {
        (Protocol::Ws, false, rest)
    } else {
        (Protocol::Http, true, raw)
    };

    let (authority, path) = match rest.find('/') {
        Some(pos) => (&rest[..pos], rest[pos..].to_string()),
        None => (rest, "/".to_string()),
    };

    let (host, port) = match authority.rsplit_once(':') {
        Some((host, port)) => {
            let port: u16 = port
                .parse()
                .map_err(|_| DnsError::InvalidDomain(format!("bad port in {authority:?}")))?;
            (host.to_string(), Some(port))
        }
        None => (authority.to_string(), None),
    };

    if host.is_empty() {
        return Err(DnsError::InvalidDomain("empty host".to_string()).into());
    }

    let is_localhost = host == "localhost" || host == "127.0.0.1";
    let is_literal = host.parse::<IpAddr>().is_ok();

    if is_localhost {
        if port.is_none() {
            return Err(
                DnsError::InvalidDomain(format!("{host}: localhost targets need a port")).into(),
            );
        }
        return Ok(ParsedTarget {
            protocol,
            use_tls: false,
            host,
            port,
            path,
        });
    }

    if !is_literal && !host.contains('.') {
        return Err(DnsError::InvalidDomain(host).into());
    }

    Ok(ParsedTarget {
        protocol,
        use_tls,
        host,
        port,
        path,
    })
}
