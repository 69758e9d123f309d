use super::{IpFamily, Transport};
use crate::errors::KnockError;
use std::net::{SocketAddr, UdpSocket};

/// Connectionless knock: one empty datagram per port, no delivery check.
#[derive(Debug, Clone, Copy)]
pub struct Udp {
    family: IpFamily,
}

impl Udp {
    pub fn new(family: IpFamily) -> Self {
        Udp { family }
    }
}

impl Transport for Udp {
    type Connection = UdpSocket;

    fn family(&self) -> IpFamily {
        self.family
    }

    fn bind_dial(&self, local: SocketAddr, remote: SocketAddr) -> Result<UdpSocket, KnockError> {
        let socket = UdpSocket::bind(local).map_err(KnockError::Dial)?;
        socket.connect(remote).map_err(KnockError::Dial)?;
        debug!("udp bound {:?} -> {}", socket.local_addr().ok(), remote);
        Ok(socket)
    }

    fn send_empty(&self, conn: &mut UdpSocket) -> Result<(), KnockError> {
        conn.send(&[]).map_err(KnockError::Transmit)?;
        Ok(())
    }

    fn close(&self, conn: UdpSocket) -> Result<(), KnockError> {
        drop(conn);
        Ok(())
    }
}
