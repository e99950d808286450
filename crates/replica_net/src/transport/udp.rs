//! Plain UDP between two fixed peers.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::UdpSocket;
use tracing::{info, trace, warn};

use super::{DatagramHandler, Transport};
use crate::error::NetError;

/// Largest payload a single IPv4 UDP datagram can carry.
pub const MAX_DATAGRAM_SIZE: usize = 65_507;

/// A UDP socket that sends to one peer and accepts datagrams from anyone.
#[derive(Debug, Clone)]
pub struct UdpTransport {
    socket: Arc<UdpSocket>,
    peer: SocketAddr,
}

impl UdpTransport {
    /// Bind `local` and send to `peer`.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Io`] if the socket cannot be bound.
    pub async fn bind(local: SocketAddr, peer: SocketAddr) -> Result<Self, NetError> {
        let socket = UdpSocket::bind(local).await?;
        info!(local = %socket.local_addr()?, %peer, "UDP transport bound");
        Ok(Self {
            socket: Arc::new(socket),
            peer,
        })
    }

    /// The address actually bound, useful after binding port 0.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Io`] if the socket has no local address.
    pub fn local_addr(&self) -> Result<SocketAddr, NetError> {
        Ok(self.socket.local_addr()?)
    }

    #[must_use]
    pub fn peer(&self) -> SocketAddr {
        self.peer
    }
}

impl Transport for UdpTransport {
    async fn send_datagram(&self, datagram: Vec<u8>) -> Result<(), NetError> {
        if datagram.len() > MAX_DATAGRAM_SIZE {
            return Err(NetError::DatagramTooLarge {
                size: datagram.len(),
                max: MAX_DATAGRAM_SIZE,
            });
        }
        self.socket.send_to(&datagram, self.peer).await?;
        Ok(())
    }

    async fn on_datagram_received(&self, handler: DatagramHandler) -> Result<(), NetError> {
        let socket = Arc::clone(&self.socket);
        tokio::spawn(async move {
            let mut buf = vec![0u8; MAX_DATAGRAM_SIZE];
            loop {
                match socket.recv_from(&mut buf).await {
                    Ok((len, from)) => {
                        trace!(%from, len, "datagram received");
                        handler(buf[..len].to_vec());
                    }
                    Err(e) => {
                        warn!(error = %e, "UDP receive failed, stopping listener");
                        break;
                    }
                }
            }
        });
        Ok(())
    }
}
