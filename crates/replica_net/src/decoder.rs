//! [`Packet`] → component set.

use std::sync::Arc;

use replica_component::{AssetTable, Component};
use tracing::{debug, warn};

use crate::packet::Packet;
use crate::registry::{ComponentRegistry, Rule};

/// Decodes packets back into components.
///
/// Every key is handled in isolation. A key yields exactly one complete
/// component or nothing: unknown tags and local-only kinds are ignored,
/// malformed payloads are logged and dropped, and none of these stop the
/// remaining keys from decoding.
#[derive(Clone)]
pub struct Decoder {
    registry: Arc<ComponentRegistry>,
    assets: Arc<dyn AssetTable>,
}

impl Decoder {
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>, assets: Arc<dyn AssetTable>) -> Self {
        Self { registry, assets }
    }

    /// Decode every component in `packet`, in tag order.
    #[must_use]
    pub fn decode(&self, packet: &Packet) -> Vec<Component> {
        let mut components = Vec::with_capacity(packet.len());
        for (tag, payload) in packet.iter() {
            let decode = match self.registry.rule(tag) {
                Some(Rule::Replicated { decode, .. }) => decode,
                Some(Rule::LocalOnly) => {
                    debug!(tag, "peer sent a local-only component, ignored");
                    continue;
                }
                None => {
                    debug!(tag, "unknown component tag, ignored");
                    continue;
                }
            };
            match decode(payload, self.assets.as_ref()) {
                Ok(component) => components.push(component),
                Err(err) => warn!(tag, error = %err, "failed to decode component, skipped"),
            }
        }
        components
    }
}

impl std::fmt::Debug for Decoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decoder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
