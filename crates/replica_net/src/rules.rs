//! Per-kind wire rules.
//!
//! | Kind         | Wire value                                   |
//! |--------------|----------------------------------------------|
//! | Sprite       | `[u32 index, bool after_light]`              |
//! | Speed        | `[f32 x, f32 y]`                             |
//! | Size         | `[f32 width, f32 height]`                    |
//! | Renderable   | `true`                                       |
//! | Position     | `[f32 x, f32 y, u8 overridden_by_body]`      |
//! | Particle     | `u8` tag                                     |
//! | OutOfBounds  | `u8` tag                                     |
//! | Light        | `[[f32; 4] color, f32, u32 rays, f32, f32]`  |
//! | DamageSprite | `u32 index`                                  |
//! | Body         | `nil` or `[[f32 x, f32 y], ...]`             |
//!
//! RelativeSpeed, Launchable, Dispatchable, Coupled and Controllable are
//! local-only.

use glam::Vec2;
use replica_component::{
    AssetTable, Body, Color, ComponentKind, DamageSprite, Light, OutOfBounds, OutOfBoundsAction,
    Particle, ParticleKind, Position, Renderable, Size, Speed, Sprite, SpriteHandle,
};

use crate::error::PayloadError;
use crate::registry::{ComponentRegistry, Replicate};

/// Register every built-in rule.
pub(crate) fn register_defaults(registry: &mut ComponentRegistry) {
    registry
        .register::<Sprite>()
        .register::<Speed>()
        .register::<Size>()
        .register::<Renderable>()
        .register::<Position>()
        .register::<Particle>()
        .register::<OutOfBounds>()
        .register::<Light>()
        .register::<DamageSprite>()
        .register::<Body>()
        .exclude(ComponentKind::RelativeSpeed)
        .exclude(ComponentKind::Launchable)
        .exclude(ComponentKind::Dispatchable)
        .exclude(ComponentKind::Coupled)
        .exclude(ComponentKind::Controllable);
}

fn sprite_index(assets: &dyn AssetTable, sprite: &SpriteHandle) -> Result<u32, PayloadError> {
    assets
        .sprite_index_of(sprite)
        .ok_or_else(|| PayloadError::UnregisteredSprite(sprite.clone()))
}

fn sprite_at(assets: &dyn AssetTable, index: u32) -> Result<SpriteHandle, PayloadError> {
    assets
        .sprite_of(index)
        .ok_or(PayloadError::UnknownSprite(index))
}

impl Replicate for Sprite {
    type Wire = (u32, bool);

    fn to_wire(&self, assets: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok((sprite_index(assets, &self.sprite)?, self.after_light))
    }

    fn from_wire(
        (index, after_light): Self::Wire,
        assets: &dyn AssetTable,
    ) -> Result<Self, PayloadError> {
        Ok(Self {
            sprite: sprite_at(assets, index)?,
            after_light,
        })
    }
}

impl Replicate for Speed {
    type Wire = (f32, f32);

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok((self.x, self.y))
    }

    // Received speeds are always active.
    fn from_wire((x, y): Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        Ok(Self { x, y, active: true })
    }
}

impl Replicate for Size {
    type Wire = (f32, f32);

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok((self.width, self.height))
    }

    fn from_wire((width, height): Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        Ok(Self { width, height })
    }
}

impl Replicate for Renderable {
    type Wire = bool;

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok(true)
    }

    fn from_wire(_: Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        Ok(Renderable)
    }
}

impl Replicate for Position {
    type Wire = (f32, f32, u8);

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok((self.x, self.y, u8::from(self.overridden_by_body)))
    }

    fn from_wire((x, y, flag): Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        let overridden_by_body = match flag {
            0 => false,
            1 => true,
            other => return Err(PayloadError::InvalidFlag(other)),
        };
        Ok(Self {
            x,
            y,
            overridden_by_body,
        })
    }
}

impl Replicate for Particle {
    type Wire = u8;

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok(self.kind.tag())
    }

    fn from_wire(tag: Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        let kind = ParticleKind::from_tag(tag).ok_or(PayloadError::UnknownTag {
            kind: ComponentKind::Particle,
            tag,
        })?;
        Ok(Self { kind })
    }
}

impl Replicate for OutOfBounds {
    type Wire = u8;

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok(self.action.tag())
    }

    fn from_wire(tag: Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        let action = OutOfBoundsAction::from_tag(tag).ok_or(PayloadError::UnknownTag {
            kind: ComponentKind::OutOfBounds,
            tag,
        })?;
        Ok(Self { action })
    }
}

impl Replicate for Light {
    type Wire = ([f32; 4], f32, u32, f32, f32);

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok((
            self.color.to_array(),
            self.distance,
            self.rays,
            self.x,
            self.y,
        ))
    }

    fn from_wire(
        (color, distance, rays, x, y): Self::Wire,
        _: &dyn AssetTable,
    ) -> Result<Self, PayloadError> {
        Ok(Self {
            color: Color::from_array(color),
            distance,
            rays,
            x,
            y,
        })
    }
}

impl Replicate for DamageSprite {
    type Wire = u32;

    fn to_wire(&self, assets: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        sprite_index(assets, &self.sprite)
    }

    fn from_wire(index: Self::Wire, assets: &dyn AssetTable) -> Result<Self, PayloadError> {
        Ok(Self {
            sprite: sprite_at(assets, index)?,
        })
    }
}

impl Replicate for Body {
    type Wire = Option<Vec<[f32; 2]>>;

    fn to_wire(&self, _: &dyn AssetTable) -> Result<Self::Wire, PayloadError> {
        Ok(self
            .vertices
            .as_ref()
            .map(|vertices| vertices.iter().map(|v| v.to_array()).collect()))
    }

    fn from_wire(wire: Self::Wire, _: &dyn AssetTable) -> Result<Self, PayloadError> {
        Ok(Self {
            vertices: wire.map(|pairs| pairs.into_iter().map(Vec2::from_array).collect()),
        })
    }
}
