//! Entity handles.
//!
//! An [`Entity`] only means something inside the store that allocated it.
//! Entity ids never cross the network: a replicated entity gets a fresh id
//! from the receiving peer's allocator.

use std::num::NonZeroU64;

use serde::{Deserialize, Serialize};

/// A store-local entity handle. Never zero, so `Option<Entity>` is free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Entity(NonZeroU64);

impl Entity {
    /// Rebuild a handle from its raw id. Zero is not a valid id.
    #[must_use]
    pub const fn from_raw(id: u64) -> Option<Self> {
        match NonZeroU64::new(id) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[must_use]
    pub const fn id(self) -> u64 {
        self.0.get()
    }
}

impl std::fmt::Display for Entity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Entity({})", self.0)
    }
}

/// Hands out entity handles in increasing order, starting at 1. Handles of
/// despawned entities are not reused.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    last: u64,
}

impl EntityAllocator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Entity {
        self.last += 1;
        Entity(NonZeroU64::MIN.saturating_add(self.last - 1))
    }

    /// Number of handles allocated so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.last
    }
}
