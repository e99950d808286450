//! Network-layer error types.

use replica_component::{ComponentKind, SpriteHandle};

/// Errors raised while moving packets between peers.
#[derive(Debug, thiserror::Error)]
pub enum NetError {
    /// Failed to encode a packet to MessagePack.
    #[error("failed to encode packet: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// Failed to decode a packet from MessagePack.
    #[error("failed to decode packet: {0}")]
    Decode(#[from] rmp_serde::decode::Error),

    /// The peer speaks a different protocol version.
    #[error("protocol version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u16, found: u16 },

    /// The datagram does not fit in a single transport frame.
    #[error("datagram of {size} bytes exceeds the {max} byte limit")]
    DatagramTooLarge { size: usize, max: usize },

    /// NATS subscription error.
    #[error("NATS subscribe error: {0}")]
    Subscribe(#[from] async_nats::SubscribeError),

    /// NATS publish error.
    #[error("NATS publish error: {0}")]
    Publish(#[from] async_nats::PublishError),

    /// NATS connection error.
    #[error("NATS connection error: {0}")]
    Connect(#[from] async_nats::ConnectError),

    /// Socket I/O error.
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    /// The transport has shut down.
    #[error("transport closed")]
    Closed,
}

/// A single component could not be mapped to or from its wire payload.
///
/// These never escape the encoder or decoder: the offending component is
/// logged and left out, the rest of the packet is unaffected.
#[derive(Debug, thiserror::Error)]
pub enum PayloadError {
    /// Failed to serialise the wire form.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] rmp_serde::encode::Error),

    /// The payload does not have the shape its kind requires.
    #[error("malformed payload: {0}")]
    Malformed(#[from] rmp_serde::decode::Error),

    /// A sprite index outside the asset table.
    #[error("unknown sprite index {0}")]
    UnknownSprite(u32),

    /// A sprite handle the asset table does not list.
    #[error("sprite {0} is not in the asset table")]
    UnregisteredSprite(SpriteHandle),

    /// An enum wire tag this build does not define.
    #[error("unknown {kind} tag {tag}")]
    UnknownTag { kind: ComponentKind, tag: u8 },

    /// A packed boolean that is neither 0 nor 1.
    #[error("invalid flag value {0}, expected 0 or 1")]
    InvalidFlag(u8),

    /// A rule was handed a component of another kind.
    #[error("expected a {expected} component, got {found}")]
    WrongKind {
        expected: ComponentKind,
        found: ComponentKind,
    },
}
