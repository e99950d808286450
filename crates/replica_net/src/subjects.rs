//! NATS subject naming.
//!
//! Every replica subject is prefixed with `replica.` so several applications
//! can share one NATS cluster. Peers exchange packets on a per-channel
//! subject; all peers on the same channel see each other's entities.

/// Root prefix for all replica NATS subjects.
pub const PREFIX: &str = "replica";

/// Channel used when none is configured.
pub const DEFAULT_CHANNEL: &str = "default";

/// Build the subject packets for `channel` are published on.
///
/// `replica.packet.<channel>`
#[must_use]
pub fn packets(channel: &str) -> String {
    format!("{PREFIX}.packet.{channel}")
}

/// NATS header keys carrying routing metadata outside the packet.
pub mod headers {
    /// The instance id of the transport that published the packet.
    pub const INSTANCE_ID: &str = "instance-id";
}
