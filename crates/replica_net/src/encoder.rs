//! Component set → [`Packet`].

use std::sync::Arc;

use replica_component::{AssetTable, Component};
use tracing::{debug, trace, warn};

use crate::packet::{Packet, PacketBuilder};
use crate::registry::{ComponentRegistry, Rule};

/// Encodes entity snapshots into packets.
///
/// Encoding never fails as a whole. Components whose kind is unknown to the
/// registry or registered as local-only are left out silently; a component
/// whose rule fails is logged and left out.
#[derive(Clone)]
pub struct Encoder {
    registry: Arc<ComponentRegistry>,
    assets: Arc<dyn AssetTable>,
}

impl Encoder {
    #[must_use]
    pub fn new(registry: Arc<ComponentRegistry>, assets: Arc<dyn AssetTable>) -> Self {
        Self { registry, assets }
    }

    /// Build a fresh packet from one entity's components.
    ///
    /// If the input holds two components of the same kind, the later one
    /// wins.
    #[must_use]
    pub fn encode<'a, I>(&self, components: I) -> Packet
    where
        I: IntoIterator<Item = &'a Component>,
    {
        let mut builder = PacketBuilder::new();
        for component in components {
            let kind = component.kind();
            let encode = match self.registry.rule_for(kind) {
                Some(Rule::Replicated { encode, .. }) => encode,
                Some(Rule::LocalOnly) => {
                    trace!(%kind, "local-only component not replicated");
                    continue;
                }
                None => {
                    debug!(%kind, "component kind not registered, skipped");
                    continue;
                }
            };
            match encode(component, self.assets.as_ref()) {
                Ok(payload) => {
                    if builder.insert(kind.tag(), payload).is_some() {
                        debug!(%kind, "duplicate component kind, keeping the last one");
                    }
                }
                Err(err) => warn!(%kind, error = %err, "failed to encode component, skipped"),
            }
        }
        builder.build()
    }
}

impl std::fmt::Debug for Encoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encoder")
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
