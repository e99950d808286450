//! Demo content: the sprite atlas and a few asteroids and one ship.

use glam::Vec2;
use replica_component::{
    Body, Color, Component, Controllable, DamageSprite, Entity, Launchable, Light, OutOfBounds,
    OutOfBoundsAction, Particle, ParticleKind, Position, RelativeSpeed, Renderable, Size, Speed,
    Sprite, SpriteAtlas, World,
};

/// Sprite names in wire-index order. Every peer must use the same list.
pub const SPRITES: [&str; 5] = ["ship", "ship-damaged", "rock", "rock-damaged", "thruster"];

#[must_use]
pub fn atlas() -> SpriteAtlas {
    SpriteAtlas::from_names(SPRITES)
}

/// Spawn `count` local entities: a controllable ship first, then rocks
/// fanned out around the playfield centre.
pub fn spawn(world: &mut World, atlas: &SpriteAtlas, count: usize, bounds: Vec2) -> Vec<Entity> {
    let centre = bounds / 2.0;
    let mut spawned = Vec::with_capacity(count);
    for i in 0..count {
        let components = if i == 0 {
            ship(atlas, centre)
        } else {
            let angle = i as f32 * 2.4;
            let heading = Vec2::from_angle(angle);
            rock(atlas, centre + heading * 120.0, heading * (20.0 + i as f32 * 5.0))
        };
        spawned.push(world.spawn(components));
    }
    spawned
}

fn ship(atlas: &SpriteAtlas, at: Vec2) -> Vec<Component> {
    let mut components = vec![
        Component::from(Position::new(at.x, at.y)),
        Component::from(Speed::new(15.0, 0.0)),
        Component::from(Size {
            width: 32.0,
            height: 32.0,
        }),
        Component::from(Renderable),
        Component::from(OutOfBounds {
            action: OutOfBoundsAction::Wrap,
        }),
        Component::from(Particle {
            kind: ParticleKind::Thruster,
        }),
        Component::from(Light {
            color: Color::rgba(0.6, 0.8, 1.0, 1.0),
            distance: 200.0,
            rays: 64,
            x: 0.0,
            y: 0.0,
        }),
        Component::from(Launchable {
            cooldown_secs: 0.25,
            elapsed_secs: 0.0,
        }),
        Component::from(Controllable { player: 1 }),
    ];
    if let Some(sprite) = atlas.handle("ship") {
        components.push(Component::from(Sprite {
            sprite,
            after_light: true,
        }));
    }
    if let Some(sprite) = atlas.handle("ship-damaged") {
        components.push(Component::from(DamageSprite { sprite }));
    }
    components
}

fn rock(atlas: &SpriteAtlas, at: Vec2, velocity: Vec2) -> Vec<Component> {
    let mut components = vec![
        Component::from(Position::new(at.x, at.y)),
        Component::from(Speed::new(velocity.x, velocity.y)),
        Component::from(RelativeSpeed {
            x: velocity.x,
            y: velocity.y,
        }),
        Component::from(Size {
            width: 48.0,
            height: 48.0,
        }),
        Component::from(Renderable),
        Component::from(OutOfBounds {
            action: OutOfBoundsAction::Bounce,
        }),
        Component::from(Body::polygon([
            Vec2::new(-24.0, -20.0),
            Vec2::new(22.0, -24.0),
            Vec2::new(24.0, 18.0),
            Vec2::new(-18.0, 24.0),
        ])),
    ];
    if let Some(sprite) = atlas.handle("rock") {
        components.push(Component::from(Sprite::new(sprite)));
    }
    if let Some(sprite) = atlas.handle("rock-damaged") {
        components.push(Component::from(DamageSprite { sprite }));
    }
    components
}

#[cfg(test)]
mod tests {
    use replica_component::ComponentKind;

    use super::*;

    #[test]
    fn test_spawn_count_and_roles() {
        let atlas = atlas();
        let mut world = World::new();
        let spawned = spawn(&mut world, &atlas, 4, Vec2::new(800.0, 600.0));
        assert_eq!(spawned.len(), 4);
        assert_eq!(world.entity_count(), 4);

        let ship = spawned[0];
        assert!(world.has(ship, ComponentKind::Controllable));
        assert_eq!(world.get::<Sprite>(ship).unwrap().sprite.name(), "ship");

        for &rock in &spawned[1..] {
            assert!(world.has(rock, ComponentKind::Body));
            assert!(!world.has(rock, ComponentKind::Controllable));
        }
    }

    #[test]
    fn test_spawn_nothing() {
        let mut world = World::new();
        assert!(spawn(&mut world, &atlas(), 0, Vec2::ONE).is_empty());
    }
}
