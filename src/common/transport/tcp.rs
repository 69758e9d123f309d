use super::{IpFamily, Transport};
use crate::errors::KnockError;
use socket2::{Domain, Protocol, SockAddr, Socket, Type};
use std::io::{ErrorKind, Write};
use std::net::{Shutdown, SocketAddr, TcpStream};

/// Connection-oriented knock: every port gets a full connect attempt.
#[derive(Debug, Clone, Copy)]
pub struct Tcp {
    family: IpFamily,
}

impl Tcp {
    pub fn new(family: IpFamily) -> Self {
        Tcp { family }
    }
}

impl Transport for Tcp {
    type Connection = TcpStream;

    fn family(&self) -> IpFamily {
        self.family
    }

    fn bind_dial(&self, local: SocketAddr, remote: SocketAddr) -> Result<TcpStream, KnockError> {
        let socket = Socket::new(Domain::for_address(remote), Type::STREAM, Some(Protocol::TCP))
            .map_err(KnockError::Dial)?;
        // std's connect can't bind first, so go through socket2 when a local
        // address was asked for. A wildcard local is left to the kernel.
        if !local.ip().is_unspecified() {
            socket
                .bind(&SockAddr::from(local))
                .map_err(KnockError::Dial)?;
        }
        socket
            .connect(&SockAddr::from(remote))
            .map_err(KnockError::Dial)?;
        debug!("tcp connected {} -> {}", local, remote);
        Ok(socket.into())
    }

    fn send_empty(&self, conn: &mut TcpStream) -> Result<(), KnockError> {
        // always 0, the connect was the knock
        let written = conn.write(&[]).map_err(KnockError::Transmit)?;
        debug!("tcp sent {} bytes", written);
        Ok(())
    }

    fn close(&self, conn: TcpStream) -> Result<(), KnockError> {
        match conn.shutdown(Shutdown::Both) {
            Ok(()) => Ok(()),
            // peer already reset the connection, it is closed either way
            Err(e) if e.kind() == ErrorKind::NotConnected => Ok(()),
            Err(e) => Err(KnockError::Close(e)),
        }
    }
}
