//! Datagram transports.
//!
//! A [`Transport`] moves opaque byte datagrams between peers with
//! best-effort, unordered, unacknowledged semantics. Datagrams may be lost,
//! duplicated or reordered; replication tolerates all three because every
//! packet is a full snapshot.
//!
//! Delivery is callback based. [`Transport::on_datagram_received`] installs a
//! handler that the transport invokes from its own receive task, which is
//! generally not the simulation thread. Handlers must hand the datagram off
//! (for instance into a channel) rather than touch the entity store.

use std::future::Future;

use crate::error::NetError;

mod loopback;
mod nats;
mod udp;

pub use loopback::LoopbackTransport;
pub use nats::NatsTransport;
pub use udp::{MAX_DATAGRAM_SIZE, UdpTransport};

/// Callback invoked once per received datagram.
pub type DatagramHandler = Box<dyn Fn(Vec<u8>) + Send + Sync + 'static>;

/// A best-effort datagram transport.
pub trait Transport: Send + Sync {
    /// Send one datagram. Returning `Ok` means the datagram was handed to the
    /// network, not that it arrived.
    fn send_datagram(&self, datagram: Vec<u8>) -> impl Future<Output = Result<(), NetError>> + Send;

    /// Start delivering received datagrams to `handler`.
    ///
    /// Installing a second handler replaces the first for transports that
    /// keep one, and adds a second listener for transports that subscribe.
    fn on_datagram_received(
        &self,
        handler: DatagramHandler,
    ) -> impl Future<Output = Result<(), NetError>> + Send;
}
