use crate::errors::{KnockError, ResolveError};
use crate::transport::{IpFamily, Transport};
use std::io;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr, SocketAddr, ToSocketAddrs};

/// A resolved host with its port left open. `None` stands for "no address",
/// which is the wildcard for a local endpoint and an error for a remote one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddressTemplate {
    ip: Option<IpAddr>,
}

impl AddressTemplate {
    pub fn new(ip: Option<IpAddr>) -> Self {
        AddressTemplate { ip }
    }

    pub fn ip(&self) -> Option<IpAddr> {
        self.ip
    }
}

/// Local and remote templates shared by every knock of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedEndpoints {
    local: Option<IpAddr>,
    remote: IpAddr,
}

impl ResolvedEndpoints {
    pub fn new(local: AddressTemplate, remote: AddressTemplate) -> Result<Self, ResolveError> {
        let remote = remote.ip().ok_or(ResolveError::RemoteUnresolved)?;
        Ok(ResolvedEndpoints {
            local: local.ip(),
            remote,
        })
    }

    pub fn remote_ip(&self) -> IpAddr {
        self.remote
    }

    /// Local bind address, port 0. Without an explicit local host this is the
    /// wildcard of the remote's IP version.
    pub fn local(&self) -> SocketAddr {
        let ip = self.local.unwrap_or(match self.remote {
            IpAddr::V4(_) => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            IpAddr::V6(_) => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        });
        SocketAddr::new(ip, 0)
    }

    /// The remote template with its port set. Ports outside the u16 range can
    /// only come from a literal sequence and fail like an unroutable dial.
    pub fn remote_at(&self, port: i64) -> Result<SocketAddr, KnockError> {
        let port = u16::try_from(port).map_err(|_| {
            KnockError::Dial(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid port {}", port),
            ))
        })?;
        Ok(SocketAddr::new(self.remote, port))
    }
}

/// Resolve both hosts once for the whole session.
pub fn resolve_endpoints<T: Transport>(
    transport: &T,
    local: &str,
    remote: &str,
) -> Result<ResolvedEndpoints, ResolveError> {
    let local = transport.resolve(local)?;
    let remote = transport.resolve(remote)?;
    let endpoints = ResolvedEndpoints::new(local, remote)?;
    debug!(
        "resolved local {:?} remote {}",
        endpoints.local,
        endpoints.remote
    );
    Ok(endpoints)
}

/// Name/IP resolution of `host` with port 0, filtered by `family`.
///
/// IPv6 literals may come bracketed (`[::1]`). For [`IpFamily::Any`] the first
/// IPv4 result is preferred.
pub fn lookup(host: &str, family: IpFamily) -> Result<AddressTemplate, ResolveError> {
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() {
        return Ok(AddressTemplate::new(None));
    }
    let candidates: Vec<IpAddr> = match host.parse::<IpAddr>() {
        Ok(ip) => vec![ip],
        Err(_) => (host, 0)
            .to_socket_addrs()
            .map_err(|source| ResolveError::Lookup {
                host: host.to_owned(),
                source,
            })?
            .map(|addr| addr.ip())
            .collect(),
    };
    let picked = match family {
        IpFamily::Any => candidates
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| candidates.first()),
        IpFamily::V4 => candidates.iter().find(|ip| ip.is_ipv4()),
        IpFamily::V6 => candidates.iter().find(|ip| ip.is_ipv6()),
    };
    match picked {
        Some(ip) => Ok(AddressTemplate::new(Some(*ip))),
        None => Err(ResolveError::NoAddress {
            host: host.to_owned(),
            family: family.as_str(),
        }),
    }
}
