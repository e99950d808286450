//! Payload structs for every component kind.
//!
//! These are plain data records. They know nothing about the wire format;
//! the mapping to and from packets lives in `replica_net::rules`.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::assets::SpriteHandle;
use crate::entity::Entity;

/// The sprite drawn for an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sprite {
    /// The sprite asset.
    pub sprite: SpriteHandle,
    /// Draw after the lighting pass so the sprite is not shaded.
    pub after_light: bool,
}

impl Sprite {
    #[must_use]
    pub fn new(sprite: SpriteHandle) -> Self {
        Self {
            sprite,
            after_light: false,
        }
    }
}

/// Linear speed in world units per second.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Speed {
    pub x: f32,
    pub y: f32,
    /// Whether the movement system applies this speed.
    pub active: bool,
}

impl Speed {
    /// Create an active speed.
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y, active: true }
    }
}

/// Axis-aligned extent of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Marker: the entity is drawn.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Renderable;

/// Speed expressed relative to the scrolling camera. Local to the peer that
/// owns the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RelativeSpeed {
    pub x: f32,
    pub y: f32,
}

/// World-space position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    /// The physics body drives this position; the movement system leaves it
    /// alone.
    pub overridden_by_body: bool,
}

impl Position {
    #[must_use]
    pub fn new(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            overridden_by_body: false,
        }
    }

    #[must_use]
    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }
}

/// The kind of particle effect an entity emits.
///
/// Each variant carries an explicit wire tag. Tags are never reused or
/// renumbered; new variants take the next free tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum ParticleKind {
    Explosion = 0,
    Smoke = 1,
    Spark = 2,
    Thruster = 3,
    Debris = 4,
}

impl ParticleKind {
    /// The stable wire tag of this variant.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve a wire tag. Returns `None` for tags this build does not know.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Explosion),
            1 => Some(Self::Smoke),
            2 => Some(Self::Spark),
            3 => Some(Self::Thruster),
            4 => Some(Self::Debris),
            _ => None,
        }
    }
}

/// A particle emitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Particle {
    pub kind: ParticleKind,
}

/// What happens to an entity once it leaves the playfield.
///
/// Wire tags are explicit, see [`ParticleKind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OutOfBoundsAction {
    Remove = 0,
    Stop = 1,
    Bounce = 2,
    Wrap = 3,
}

impl OutOfBoundsAction {
    /// The stable wire tag of this variant.
    #[must_use]
    pub const fn tag(self) -> u8 {
        self as u8
    }

    /// Resolve a wire tag. Returns `None` for tags this build does not know.
    #[must_use]
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(Self::Remove),
            1 => Some(Self::Stop),
            2 => Some(Self::Bounce),
            3 => Some(Self::Wrap),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutOfBounds {
    pub action: OutOfBoundsAction,
}

/// Linear RGBA colour, each channel in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    #[must_use]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }

    #[must_use]
    pub const fn from_array([r, g, b, a]: [f32; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// A point light cast from an offset relative to the entity.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Light {
    pub color: Color,
    /// Reach of the light in world units.
    pub distance: f32,
    /// Number of rays used by the shadow caster.
    pub rays: u32,
    pub x: f32,
    pub y: f32,
}

/// Fires projectiles on a cooldown. Local to the owning peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Launchable {
    pub cooldown_secs: f32,
    pub elapsed_secs: f32,
}

/// The entity is queued to be handed to a remote peer. Local only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dispatchable {
    pub dispatched: bool,
}

/// Sprite swapped in while the entity is taking damage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DamageSprite {
    pub sprite: SpriteHandle,
}

/// Attaches this entity to a parent at a fixed offset.
///
/// Refers to a local [`Entity`] id, which is meaningless on another peer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coupled {
    pub parent: Entity,
    pub offset_x: f32,
    pub offset_y: f32,
}

/// Input from a local player drives this entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Controllable {
    pub player: u8,
}

/// Collision shape.
///
/// `vertices == None` is a body with no shape yet, which is distinct from an
/// entity without a `Body` at all.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Body {
    pub vertices: Option<Vec<Vec2>>,
}

impl Body {
    /// A body with the given polygon.
    #[must_use]
    pub fn polygon(vertices: impl IntoIterator<Item = Vec2>) -> Self {
        Self {
            vertices: Some(vertices.into_iter().collect()),
        }
    }

    /// A body without a shape.
    #[must_use]
    pub fn empty() -> Self {
        Self { vertices: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_particle_tags_roundtrip() {
        for kind in [
            ParticleKind::Explosion,
            ParticleKind::Smoke,
            ParticleKind::Spark,
            ParticleKind::Thruster,
            ParticleKind::Debris,
        ] {
            assert_eq!(ParticleKind::from_tag(kind.tag()), Some(kind));
        }
        assert_eq!(ParticleKind::from_tag(200), None);
    }

    #[test]
    fn test_out_of_bounds_tags_are_fixed() {
        // Wire tags are part of the protocol and must never move.
        assert_eq!(OutOfBoundsAction::Remove.tag(), 0);
        assert_eq!(OutOfBoundsAction::Wrap.tag(), 3);
        assert_eq!(OutOfBoundsAction::from_tag(4), None);
    }

    #[test]
    fn test_body_empty_vs_polygon() {
        assert!(Body::empty().vertices.is_none());
        let body = Body::polygon([Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(body.vertices.as_ref().map(Vec::len), Some(3));
    }

    #[test]
    fn test_color_array_roundtrip() {
        let c = Color::rgba(0.1, 0.2, 0.3, 0.4);
        assert_eq!(Color::from_array(c.to_array()), c);
    }

    #[test]
    fn test_position_serialization() {
        let p = Position::new(1.0, 2.0);
        let bytes = rmp_serde::to_vec(&p).unwrap();
        let restored: Position = rmp_serde::from_slice(&bytes).unwrap();
        assert_eq!(p, restored);
    }
}
