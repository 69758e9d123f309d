//! Per-port knock transport.
//!
//! A [`Transport`] knows how to resolve a host for its address family, open a
//! locally bound connection to one remote port, push an empty payload through
//! it and release it again. TCP and UDP each implement the four steps; the
//! session loop only ever talks to the trait.
mod tcp;
mod udp;

pub use tcp::Tcp;
pub use udp::Udp;

use crate::errors::{ConfigError, KnockError, ResolveError};
use crate::resolve::{lookup, AddressTemplate};
use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
    Udp,
}

/// Which IP versions a transport kind may resolve to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IpFamily {
    Any,
    V4,
    V6,
}

impl IpFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "IP",
            Self::V4 => "IPv4",
            Self::V6 => "IPv6",
        }
    }
}

/// One of `tcp`, `tcp4`, `tcp6`, `udp`, `udp4`, `udp6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransportKind {
    pub protocol: Protocol,
    pub family: IpFamily,
}

impl FromStr for TransportKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (protocol, family) = match s {
            "tcp" => (Protocol::Tcp, IpFamily::Any),
            "tcp4" => (Protocol::Tcp, IpFamily::V4),
            "tcp6" => (Protocol::Tcp, IpFamily::V6),
            "udp" => (Protocol::Udp, IpFamily::Any),
            "udp4" => (Protocol::Udp, IpFamily::V4),
            "udp6" => (Protocol::Udp, IpFamily::V6),
            other => return Err(ConfigError::InvalidProtocol(other.to_owned())),
        };
        Ok(TransportKind { protocol, family })
    }
}

impl fmt::Display for TransportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let proto = match self.protocol {
            Protocol::Tcp => "tcp",
            Protocol::Udp => "udp",
        };
        let suffix = match self.family {
            IpFamily::Any => "",
            IpFamily::V4 => "4",
            IpFamily::V6 => "6",
        };
        write!(f, "{}{}", proto, suffix)
    }
}

pub trait Transport {
    type Connection;

    fn family(&self) -> IpFamily;

    /// Resolve `host` with port 0. An empty host resolves to no address.
    fn resolve(&self, host: &str) -> Result<AddressTemplate, ResolveError> {
        lookup(host, self.family())
    }

    /// Open a connection from `local` to `remote`. For TCP this is a full
    /// handshake attempt, for UDP it only fixes the peer address.
    fn bind_dial(
        &self,
        local: SocketAddr,
        remote: SocketAddr,
    ) -> Result<Self::Connection, KnockError>;

    fn send_empty(&self, conn: &mut Self::Connection) -> Result<(), KnockError>;

    fn close(&self, conn: Self::Connection) -> Result<(), KnockError>;
}
