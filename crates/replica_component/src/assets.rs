//! Sprite asset table.
//!
//! Sprites travel as small integer indices. Both peers must resolve an index
//! to the same asset, so the table is an ordered list that both sides build
//! identically. Loading the actual textures is outside this crate; a
//! [`SpriteHandle`] is just the asset's name.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A reference to a sprite asset, by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpriteHandle(String);

impl SpriteHandle {
    #[must_use]
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(name.as_ref().to_owned())
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SpriteHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Resolves sprite handles to wire indices and back.
pub trait AssetTable: Send + Sync {
    /// The wire index of `sprite`, or `None` if the table does not know it.
    fn sprite_index_of(&self, sprite: &SpriteHandle) -> Option<u32>;

    /// The sprite at wire index `index`, or `None` if out of range.
    fn sprite_of(&self, index: u32) -> Option<SpriteHandle>;
}

/// An ordered, immutable sprite table. The position of a name in the list is
/// its wire index.
#[derive(Debug, Clone, Default)]
pub struct SpriteAtlas {
    sprites: Vec<SpriteHandle>,
    indices: HashMap<SpriteHandle, u32>,
}

impl SpriteAtlas {
    /// Build an atlas from sprite names. Duplicate names keep their first
    /// index.
    #[must_use]
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut atlas = Self::default();
        for name in names {
            let handle = SpriteHandle::new(name);
            if atlas.indices.contains_key(&handle) {
                tracing::debug!(sprite = %handle, "duplicate sprite name ignored");
                continue;
            }
            let index = atlas.sprites.len() as u32;
            atlas.indices.insert(handle.clone(), index);
            atlas.sprites.push(handle);
        }
        atlas
    }

    /// Returns the handle for `name`, if present.
    #[must_use]
    pub fn handle(&self, name: &str) -> Option<SpriteHandle> {
        let handle = SpriteHandle::new(name);
        self.indices.contains_key(&handle).then_some(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sprites.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sprites.is_empty()
    }
}

impl AssetTable for SpriteAtlas {
    fn sprite_index_of(&self, sprite: &SpriteHandle) -> Option<u32> {
        self.indices.get(sprite).copied()
    }

    fn sprite_of(&self, index: u32) -> Option<SpriteHandle> {
        self.sprites.get(index as usize).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atlas_indices_follow_order() {
        let atlas = SpriteAtlas::from_names(["ship", "laser", "asteroid"]);
        assert_eq!(atlas.len(), 3);
        assert_eq!(atlas.sprite_index_of(&SpriteHandle::new("laser")), Some(1));
        assert_eq!(atlas.sprite_of(2), Some(SpriteHandle::new("asteroid")));
    }

    #[test]
    fn test_atlas_unknown_lookups() {
        let atlas = SpriteAtlas::from_names(["ship"]);
        assert_eq!(atlas.sprite_index_of(&SpriteHandle::new("ufo")), None);
        assert_eq!(atlas.sprite_of(5), None);
        assert!(atlas.handle("ufo").is_none());
    }

    #[test]
    fn test_atlas_duplicate_names_keep_first_index() {
        let atlas = SpriteAtlas::from_names(["ship", "laser", "ship"]);
        assert_eq!(atlas.len(), 2);
        assert_eq!(atlas.sprite_index_of(&SpriteHandle::new("ship")), Some(0));
    }
}
