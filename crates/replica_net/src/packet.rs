//! The replication packet.
//!
//! A [`Packet`] is a snapshot of one entity's replicated components: a map
//! from component kind tag to that component's encoded payload. Packets are
//! self-contained and idempotent; a receiver never needs an earlier packet to
//! make sense of a later one.
//!
//! Packets are built once through [`PacketBuilder`] and are immutable
//! afterwards. Components are kept in a sorted map so that equal inputs always
//! serialise to identical bytes.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::NetError;

/// Wire protocol version carried by every packet. Bump it whenever a kind
/// tag, payload shape or enum tag table changes incompatibly.
pub const PROTOCOL_VERSION: u16 = 1;

/// An encoded component payload (itself a MessagePack document). Carried
/// as MessagePack `bin` inside the envelope.
pub type Payload = Bytes;

/// A snapshot of one entity's replicated components.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Packet {
    version: u16,
    components: BTreeMap<String, Payload>,
}

impl Packet {
    /// The protocol version this packet was built with.
    #[must_use]
    pub fn version(&self) -> u16 {
        self.version
    }

    /// The payload stored under `tag`.
    #[must_use]
    pub fn get(&self, tag: &str) -> Option<&[u8]> {
        self.components.get(tag).map(Bytes::as_ref)
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.components.contains_key(tag)
    }

    /// Iterate `(tag, payload)` pairs in tag order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.components
            .iter()
            .map(|(tag, payload)| (tag.as_str(), payload.as_ref()))
    }

    /// Iterate tags in order.
    pub fn tags(&self) -> impl Iterator<Item = &str> {
        self.components.keys().map(String::as_str)
    }

    /// Number of components carried.
    #[must_use]
    pub fn len(&self) -> usize {
        self.components.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Serialise the packet for the transport.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Encode`] if serialisation fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>, NetError> {
        codec::encode_envelope(self)
    }

    /// Parse a datagram into a packet, rejecting other protocol versions.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Decode`] for bytes that are not a packet and
    /// [`NetError::VersionMismatch`] for a packet from an incompatible peer.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, NetError> {
        let packet: Packet = codec::decode_envelope(bytes)?;
        if packet.version != PROTOCOL_VERSION {
            return Err(NetError::VersionMismatch {
                expected: PROTOCOL_VERSION,
                found: packet.version,
            });
        }
        Ok(packet)
    }
}

/// Builds a [`Packet`].
#[derive(Debug, Clone)]
pub struct PacketBuilder {
    version: u16,
    components: BTreeMap<String, Payload>,
}

impl PacketBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            version: PROTOCOL_VERSION,
            components: BTreeMap::new(),
        }
    }

    /// Override the protocol version. Only useful to simulate an old or new
    /// peer.
    #[must_use]
    pub fn version(mut self, version: u16) -> Self {
        self.version = version;
        self
    }

    /// Store `payload` under `tag`, returning the payload it replaced.
    pub fn insert(
        &mut self,
        tag: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Option<Payload> {
        self.components.insert(tag.into(), payload.into())
    }

    /// Builder-style [`PacketBuilder::insert`].
    #[must_use]
    pub fn with(mut self, tag: impl Into<String>, payload: impl Into<Payload>) -> Self {
        self.insert(tag, payload);
        self
    }

    #[must_use]
    pub fn build(self) -> Packet {
        Packet {
            version: self.version,
            components: self.components,
        }
    }
}

impl Default for PacketBuilder {
    fn default() -> Self {
        Self::new()
    }
}
