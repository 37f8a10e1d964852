use log::{debug, warn};
use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::os::fd::{AsRawFd, RawFd};

use super::config::is_loopback_name;

const LOOPBACK_LITERAL: &str = "127.0.0.1";

/// The set of non-blocking listening sockets the accept loop waits on.
#[derive(Debug)]
pub struct Endpoint {
    listeners: Vec<TcpListener>,
}

/// Host forms to bind for a configured address: the loopback name and the
/// loopback literal always travel together.
pub fn bind_hosts(address: &str) -> Vec<&str> {
    if is_loopback_name(address) || address == LOOPBACK_LITERAL {
        vec!["localhost", LOOPBACK_LITERAL]
    } else {
        vec![address]
    }
}

impl Endpoint {
    pub fn bind(address: &str, port: u16) -> io::Result<Self> {
        let mut port = port;
        let mut listeners: Vec<TcpListener> = Vec::new();
        let mut bound: Vec<SocketAddr> = Vec::new();
        let mut last_error = None;

        for host in bind_hosts(address) {
            let addrs = match (host, port).to_socket_addrs() {
                Ok(addrs) => addrs,
                Err(e) => {
                    warn!("Failed to resolve {}: {}", host, e);
                    last_error = Some(e);
                    continue;
                }
            };

            for mut addr in addrs {
                addr.set_port(port);
                if bound.contains(&addr) {
                    continue;
                }

                match TcpListener::bind(addr) {
                    Ok(listener) => {
                        listener.set_nonblocking(true)?;
                        let local = listener.local_addr()?;
                        port = local.port();
                        debug!("Bound {} for {}", local, host);
                        bound.push(local);
                        listeners.push(listener);
                    }
                    Err(e) => {
                        warn!("Failed to bind {} for {}: {}", addr, host, e);
                        last_error = Some(e);
                    }
                }
            }
        }

        if listeners.is_empty() {
            return Err(last_error.unwrap_or_else(|| {
                io::Error::new(
                    io::ErrorKind::AddrNotAvailable,
                    format!("'{}' did not resolve to any address", address),
                )
            }));
        }

        Ok(Self { listeners })
    }

    pub fn local_addrs(&self) -> Vec<SocketAddr> {
        self.listeners
            .iter()
            .filter_map(|listener| listener.local_addr().ok())
            .collect()
    }

    /// The port shared by every listener.
    pub fn port(&self) -> u16 {
        self.local_addrs().first().map_or(0, |addr| addr.port())
    }

    pub fn raw_fds(&self) -> Vec<RawFd> {
        self.listeners.iter().map(|listener| listener.as_raw_fd()).collect()
    }

    /// Accepts one pending connection on the listener at `index`, if any.
    pub fn accept(&self, index: usize) -> io::Result<Option<(TcpStream, SocketAddr)>> {
        match self.listeners[index].accept() {
            Ok((stream, addr)) => {
                stream.set_nonblocking(false)?;
                Ok(Some((stream, addr)))
            }
            Err(e) if e.kind() == io::ErrorKind::WouldBlock => Ok(None),
            Err(e) => Err(e),
        }
    }
}
