//! The component registry.
//!
//! The registry maps each component kind tag to its replication [`Rule`]:
//! either a pair of encode/decode functions, or [`Rule::LocalOnly`] for kinds
//! that never leave the peer that owns them. Kinds with no entry at all are
//! unknown; the encoder and decoder skip them.
//!
//! Adding a replicated kind means implementing [`Replicate`] for its payload
//! struct and calling [`ComponentRegistry::register`].

use std::collections::BTreeMap;

use replica_component::{AssetTable, Component, ComponentData, ComponentKind};
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::codec;
use crate::error::PayloadError;
use crate::packet::Payload;

/// A component that can be replicated.
///
/// `Wire` is the exact shape that goes into the packet; the conversion to and
/// from it may consult the asset table and may apply defaulting rules.
pub trait Replicate: ComponentData {
    /// The serialised payload shape.
    type Wire: Serialize + DeserializeOwned;

    /// Map the component to its wire form.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] if the component references something the
    /// wire cannot express (for instance an unregistered sprite).
    fn to_wire(&self, assets: &dyn AssetTable) -> Result<Self::Wire, PayloadError>;

    /// Rebuild the component from its wire form.
    ///
    /// # Errors
    ///
    /// Returns a [`PayloadError`] if the wire value is out of range.
    fn from_wire(wire: Self::Wire, assets: &dyn AssetTable) -> Result<Self, PayloadError>;
}

/// Type-erased encode function stored in the registry.
pub type EncodeFn = fn(&Component, &dyn AssetTable) -> Result<Payload, PayloadError>;

/// Type-erased decode function stored in the registry.
pub type DecodeFn = fn(&[u8], &dyn AssetTable) -> Result<Component, PayloadError>;

/// How a registered kind is replicated.
#[derive(Debug, Clone, Copy)]
pub enum Rule {
    /// Sent and received with these functions.
    Replicated { encode: EncodeFn, decode: DecodeFn },
    /// Known, but deliberately never sent or accepted.
    LocalOnly,
}

/// Table of replication rules keyed by kind tag.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    rules: BTreeMap<&'static str, Rule>,
}

impl ComponentRegistry {
    /// An empty registry: every kind is unknown.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The standard registry with every built-in replicated kind and every
    /// local-only kind registered.
    #[must_use]
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        crate::rules::register_defaults(&mut registry);
        registry
    }

    /// Register `T` as a replicated kind, replacing any existing rule for it.
    pub fn register<T: Replicate>(&mut self) -> &mut Self {
        self.insert(
            T::KIND,
            Rule::Replicated {
                encode: encode_with::<T>,
                decode: decode_with::<T>,
            },
        )
    }

    /// Register `kind` as local-only.
    pub fn exclude(&mut self, kind: ComponentKind) -> &mut Self {
        self.insert(kind, Rule::LocalOnly)
    }

    fn insert(&mut self, kind: ComponentKind, rule: Rule) -> &mut Self {
        if self.rules.insert(kind.tag(), rule).is_some() {
            tracing::debug!(%kind, "replication rule replaced");
        }
        self
    }

    /// The rule for a wire tag, or `None` if the tag is unknown.
    #[must_use]
    pub fn rule(&self, tag: &str) -> Option<Rule> {
        self.rules.get(tag).copied()
    }

    /// The rule for a kind, or `None` if the kind is not registered.
    #[must_use]
    pub fn rule_for(&self, kind: ComponentKind) -> Option<Rule> {
        self.rule(kind.tag())
    }

    /// Returns `true` if `kind` is registered and replicated.
    #[must_use]
    pub fn is_replicated(&self, kind: ComponentKind) -> bool {
        matches!(self.rule_for(kind), Some(Rule::Replicated { .. }))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

fn encode_with<T: Replicate>(
    component: &Component,
    assets: &dyn AssetTable,
) -> Result<Payload, PayloadError> {
    let data = T::from_component(component).ok_or(PayloadError::WrongKind {
        expected: T::KIND,
        found: component.kind(),
    })?;
    let wire = data.to_wire(assets)?;
    codec::encode_payload(&wire)
}

fn decode_with<T: Replicate>(
    payload: &[u8],
    assets: &dyn AssetTable,
) -> Result<Component, PayloadError> {
    let wire: T::Wire = codec::decode_payload(payload)?;
    Ok(T::from_wire(wire, assets)?.into())
}

#[cfg(test)]
mod tests {
    use replica_component::{Position, Size, SpriteAtlas};

    use super::*;

    #[test]
    fn test_empty_registry_knows_nothing() {
        let registry = ComponentRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.rule("Position").is_none());
    }

    #[test]
    fn test_defaults_cover_every_kind() {
        let registry = ComponentRegistry::with_defaults();
        assert_eq!(registry.len(), ComponentKind::ALL.len());
        for kind in ComponentKind::ALL {
            assert!(registry.rule_for(kind).is_some(), "{kind} not registered");
        }
    }

    #[test]
    fn test_local_only_kinds() {
        let registry = ComponentRegistry::with_defaults();
        for kind in [
            ComponentKind::RelativeSpeed,
            ComponentKind::Launchable,
            ComponentKind::Dispatchable,
            ComponentKind::Coupled,
            ComponentKind::Controllable,
        ] {
            assert!(matches!(registry.rule_for(kind), Some(Rule::LocalOnly)));
            assert!(!registry.is_replicated(kind));
        }
        assert!(registry.is_replicated(ComponentKind::Position));
    }

    #[test]
    fn test_exclude_overrides_register() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Size>().exclude(ComponentKind::Size);
        assert!(!registry.is_replicated(ComponentKind::Size));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_encode_fn_rejects_wrong_kind() {
        let mut registry = ComponentRegistry::new();
        registry.register::<Size>();
        let Some(Rule::Replicated { encode, .. }) = registry.rule("Size") else {
            panic!("Size should be replicated");
        };
        let atlas = SpriteAtlas::default();
        let err = encode(&Position::new(0.0, 0.0).into(), &atlas).unwrap_err();
        assert!(matches!(
            err,
            PayloadError::WrongKind {
                expected: ComponentKind::Size,
                found: ComponentKind::Position
            }
        ));
    }
}
