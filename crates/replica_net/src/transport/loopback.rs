//! In-process transport for tests and single-process demos.

use std::future::{Future, ready};
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{DatagramHandler, Transport};
use crate::error::NetError;

type Slot = Arc<Mutex<Option<DatagramHandler>>>;

/// One end of an in-memory link. Sending delivers synchronously to the
/// other end's handler; with no handler installed the datagram is dropped,
/// like a packet sent to a closed port.
#[derive(Clone)]
pub struct LoopbackTransport {
    inbound: Slot,
    outbound: Slot,
}

impl LoopbackTransport {
    /// Create two connected ends.
    #[must_use]
    pub fn pair() -> (Self, Self) {
        let left: Slot = Arc::new(Mutex::new(None));
        let right: Slot = Arc::new(Mutex::new(None));
        (
            Self {
                inbound: Arc::clone(&left),
                outbound: Arc::clone(&right),
            },
            Self {
                inbound: right,
                outbound: left,
            },
        )
    }

    /// An end whose datagrams come straight back to itself.
    #[must_use]
    pub fn echo() -> Self {
        let slot: Slot = Arc::new(Mutex::new(None));
        Self {
            inbound: Arc::clone(&slot),
            outbound: slot,
        }
    }
}

impl std::fmt::Debug for LoopbackTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoopbackTransport").finish_non_exhaustive()
    }
}

impl Transport for LoopbackTransport {
    fn send_datagram(
        &self,
        datagram: Vec<u8>,
    ) -> impl Future<Output = Result<(), NetError>> + Send {
        let Ok(slot) = self.outbound.lock() else {
            return ready(Err(NetError::Closed));
        };
        match slot.as_ref() {
            Some(handler) => handler(datagram),
            None => debug!(len = datagram.len(), "no loopback listener, datagram dropped"),
        }
        ready(Ok(()))
    }

    fn on_datagram_received(
        &self,
        handler: DatagramHandler,
    ) -> impl Future<Output = Result<(), NetError>> + Send {
        let Ok(mut slot) = self.inbound.lock() else {
            return ready(Err(NetError::Closed));
        };
        *slot = Some(handler);
        ready(Ok(()))
    }
}
