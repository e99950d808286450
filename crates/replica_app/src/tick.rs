//! Peer tick loop.
//!
//! Each tick:
//!
//! 1. Materialize packets peers sent since the last tick.
//! 2. Move every entity with an active speed and apply its out-of-bounds
//!    action.
//! 3. Every `replicate_every` ticks, replicate the entities this peer owns.
//! 4. Advance the tick counter.

use std::time::{Duration, Instant};

use glam::Vec2;
use replica_component::{Entity, OutOfBounds, OutOfBoundsAction, Position, Speed, World};
use replica_net::Transport;
use replica_session::ReplicationSession;
use tracing::{debug, info, warn};

/// Configuration for the tick loop.
#[derive(Debug, Clone)]
pub struct TickConfig {
    /// Target ticks per second.
    pub tick_rate: f64,
    /// Replicate owned entities every this many ticks (0 = never).
    pub replicate_every: u64,
    /// Maximum number of ticks to run (0 = unlimited).
    pub max_ticks: u64,
}

impl Default for TickConfig {
    fn default() -> Self {
        Self {
            tick_rate: 30.0,
            replicate_every: 30,
            max_ticks: 0,
        }
    }
}

/// The peer's simulation state.
#[derive(Debug)]
pub struct TickLoop<T> {
    tick_id: u64,
    config: TickConfig,
    world: World,
    /// Entities this peer created and replicates. Remote copies are not
    /// replicated back.
    owned: Vec<Entity>,
    bounds: Vec2,
    session: ReplicationSession<T>,
}

impl<T: Transport> TickLoop<T> {
    #[must_use]
    pub fn new(config: TickConfig, session: ReplicationSession<T>, bounds: Vec2) -> Self {
        Self {
            tick_id: 0,
            config,
            world: World::new(),
            owned: Vec::new(),
            bounds,
            session,
        }
    }

    #[must_use]
    pub fn tick_id(&self) -> u64 {
        self.tick_id
    }

    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    #[must_use]
    pub fn session(&self) -> &ReplicationSession<T> {
        &self.session
    }

    /// Mark `entities` as owned by this peer.
    pub fn own(&mut self, entities: impl IntoIterator<Item = Entity>) {
        self.owned.extend(entities);
    }

    #[must_use]
    pub fn owned(&self) -> &[Entity] {
        &self.owned
    }

    /// Run one tick.
    pub async fn tick(&mut self, dt: f32) {
        self.tick_id += 1;

        match self.session.drain_inbox(&mut self.world) {
            Ok(created) if !created.is_empty() => {
                info!(tick_id = self.tick_id, count = created.len(), "remote entities arrived");
            }
            Ok(_) => {}
            Err(e) => warn!(tick_id = self.tick_id, error = %e, "failed to materialize packet"),
        }

        self.integrate(dt);

        if self.config.replicate_every > 0 && self.tick_id % self.config.replicate_every == 0 {
            self.replicate().await;
        }
    }

    /// Send a snapshot of every owned entity.
    pub async fn replicate(&self) {
        let mut sent = 0usize;
        for &entity in &self.owned {
            match self.session.observe_and_send(&self.world, entity).await {
                Ok(0) => {}
                Ok(_) => sent += 1,
                Err(e) => warn!(%entity, error = %e, "failed to replicate entity"),
            }
        }
        debug!(tick_id = self.tick_id, sent, "replication pass");
    }

    fn integrate(&mut self, dt: f32) {
        let mut removed = Vec::new();
        for entity in self.world.entities() {
            let Some(speed) = self.world.get::<Speed>(entity).copied() else {
                continue;
            };
            if !speed.active {
                continue;
            }
            let action = self.world.get::<OutOfBounds>(entity).map(|oob| oob.action);
            let Some(position) = self.world.get_mut::<Position>(entity) else {
                continue;
            };
            if position.overridden_by_body {
                continue;
            }
            position.x += speed.x * dt;
            position.y += speed.y * dt;

            match confine(position, speed, action, self.bounds) {
                Confined::Inside => {}
                Confined::Remove => removed.push(entity),
                Confined::Speed(new_speed) => {
                    if let Some(speed) = self.world.get_mut::<Speed>(entity) {
                        *speed = new_speed;
                    }
                }
            }
        }
        for entity in removed {
            self.world.despawn(entity);
            self.owned.retain(|&owned| owned != entity);
            debug!(%entity, "entity left the playfield");
        }
    }

    /// Run the loop for the configured number of ticks, or indefinitely.
    ///
    /// # Errors
    ///
    /// Returns an error if the tick rate is not a positive finite number.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        let tick_duration = tick_duration(self.config.tick_rate)?;
        let dt = tick_duration.as_secs_f32();
        let mut tick_count = 0u64;

        info!(
            tick_rate = self.config.tick_rate,
            max_ticks = self.config.max_ticks,
            owned = self.owned.len(),
            "starting tick loop"
        );

        loop {
            let start = Instant::now();
            self.tick(dt).await;

            tick_count += 1;
            if self.config.max_ticks > 0 && tick_count >= self.config.max_ticks {
                let stats = self.session.stats();
                info!(
                    ticks = tick_count,
                    sent = stats.sent,
                    received = stats.received,
                    materialized = stats.materialized,
                    dropped = stats.dropped,
                    "tick loop complete"
                );
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < tick_duration {
                tokio::time::sleep(tick_duration - elapsed).await;
            } else {
                warn!(
                    tick_id = self.tick_id,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = tick_duration.as_millis() as u64,
                    "tick exceeded time budget"
                );
            }
        }
        Ok(())
    }
}

fn tick_duration(tick_rate: f64) -> anyhow::Result<Duration> {
    if !(tick_rate.is_finite() && tick_rate > 0.0) {
        anyhow::bail!("invalid tick rate {tick_rate}");
    }
    Ok(Duration::try_from_secs_f64(1.0 / tick_rate)?)
}

#[derive(Debug, PartialEq)]
enum Confined {
    Inside,
    Remove,
    Speed(Speed),
}

/// Apply the out-of-bounds action to a position that has just moved.
fn confine(
    position: &mut Position,
    speed: Speed,
    action: Option<OutOfBoundsAction>,
    bounds: Vec2,
) -> Confined {
    let outside_x = position.x < 0.0 || position.x > bounds.x;
    let outside_y = position.y < 0.0 || position.y > bounds.y;
    if !outside_x && !outside_y {
        return Confined::Inside;
    }
    match action {
        None => Confined::Inside,
        Some(OutOfBoundsAction::Remove) => Confined::Remove,
        Some(OutOfBoundsAction::Wrap) => {
            position.x = position.x.rem_euclid(bounds.x);
            position.y = position.y.rem_euclid(bounds.y);
            Confined::Inside
        }
        Some(OutOfBoundsAction::Stop) => {
            position.x = position.x.clamp(0.0, bounds.x);
            position.y = position.y.clamp(0.0, bounds.y);
            Confined::Speed(Speed {
                active: false,
                ..speed
            })
        }
        Some(OutOfBoundsAction::Bounce) => {
            position.x = position.x.clamp(0.0, bounds.x);
            position.y = position.y.clamp(0.0, bounds.y);
            Confined::Speed(Speed {
                x: if outside_x { -speed.x } else { speed.x },
                y: if outside_y { -speed.y } else { speed.y },
                active: speed.active,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use replica_component::{Component, ComponentKind, RelativeSpeed};
    use replica_net::{ComponentRegistry, LoopbackTransport};
    use replica_session::SessionConfig;

    use super::*;
    use crate::demo;

    const BOUNDS: Vec2 = Vec2::new(100.0, 100.0);

    fn echo_loop(config: TickConfig) -> TickLoop<LoopbackTransport> {
        let session = ReplicationSession::new(
            SessionConfig::new("test"),
            LoopbackTransport::echo(),
            Arc::new(ComponentRegistry::with_defaults()),
            Arc::new(demo::atlas()),
        );
        TickLoop::new(config, session, BOUNDS)
    }

    fn moving(world: &mut World, x: f32, speed: Speed, action: OutOfBoundsAction) -> Entity {
        world.spawn([
            Component::from(Position::new(x, 50.0)),
            Component::from(speed),
            Component::from(OutOfBounds { action }),
        ])
    }

    #[tokio::test]
    async fn test_tick_advances_counter_and_moves() {
        let mut tick_loop = echo_loop(TickConfig {
            replicate_every: 0,
            ..TickConfig::default()
        });
        let e = moving(
            tick_loop.world_mut(),
            10.0,
            Speed::new(10.0, 0.0),
            OutOfBoundsAction::Wrap,
        );
        tick_loop.tick(0.5).await;
        tick_loop.tick(0.5).await;
        assert_eq!(tick_loop.tick_id(), 2);
        assert_eq!(tick_loop.world().get::<Position>(e).unwrap().x, 20.0);
    }

    #[tokio::test]
    async fn test_run_rejects_zero_tick_rate() {
        let mut tick_loop = echo_loop(TickConfig {
            tick_rate: 0.0,
            max_ticks: 1,
            ..TickConfig::default()
        });
        assert!(tick_loop.run().await.is_err());
        assert_eq!(tick_loop.tick_id(), 0);
        assert!(tick_duration(f64::NAN).is_err());
        assert_eq!(tick_duration(50.0).unwrap(), Duration::from_millis(20));
    }

    #[tokio::test]
    async fn test_inactive_speed_does_not_move() {
        let mut tick_loop = echo_loop(TickConfig::default());
        let mut speed = Speed::new(10.0, 0.0);
        speed.active = false;
        let e = moving(tick_loop.world_mut(), 10.0, speed, OutOfBoundsAction::Wrap);
        tick_loop.tick(1.0).await;
        assert_eq!(tick_loop.world().get::<Position>(e).unwrap().x, 10.0);
    }

    #[tokio::test]
    async fn test_out_of_bounds_actions() {
        let mut tick_loop = echo_loop(TickConfig {
            replicate_every: 0,
            ..TickConfig::default()
        });
        let world = tick_loop.world_mut();
        let wrap = moving(world, 95.0, Speed::new(10.0, 0.0), OutOfBoundsAction::Wrap);
        let bounce = moving(world, 95.0, Speed::new(10.0, 0.0), OutOfBoundsAction::Bounce);
        let stop = moving(world, 95.0, Speed::new(10.0, 0.0), OutOfBoundsAction::Stop);
        let remove = moving(world, 95.0, Speed::new(10.0, 0.0), OutOfBoundsAction::Remove);
        tick_loop.own([remove]);

        tick_loop.tick(1.0).await;

        let world = tick_loop.world();
        assert_eq!(world.get::<Position>(wrap).unwrap().x, 5.0);
        assert_eq!(world.get::<Position>(bounce).unwrap().x, 100.0);
        assert_eq!(world.get::<Speed>(bounce).unwrap().x, -10.0);
        assert_eq!(world.get::<Position>(stop).unwrap().x, 100.0);
        assert!(!world.get::<Speed>(stop).unwrap().active);
        assert!(!world.contains(remove));
        assert!(tick_loop.owned().is_empty());
    }

    #[tokio::test]
    async fn test_replication_echoes_owned_entities() {
        let mut tick_loop = echo_loop(TickConfig {
            replicate_every: 1,
            ..TickConfig::default()
        });
        let atlas = demo::atlas();
        let spawned = demo::spawn(tick_loop.world_mut(), &atlas, 2, Vec2::new(800.0, 600.0));
        tick_loop.own(spawned.clone());

        // Tick 1 sends, tick 2 materializes the echoes.
        tick_loop.tick(0.0).await;
        tick_loop.tick(0.0).await;

        let world = tick_loop.world();
        let copies: Vec<Entity> = world
            .entities()
            .into_iter()
            .filter(|e| !spawned.contains(e))
            .collect();
        assert!(copies.len() >= 2);
        for copy in copies {
            assert!(world.has(copy, ComponentKind::Position));
            assert!(!world.has(copy, ComponentKind::Controllable));
            assert!(world.get::<RelativeSpeed>(copy).is_none());
        }
        assert_eq!(tick_loop.owned().len(), 2);
        assert!(tick_loop.session().stats().materialized >= 2);
    }
}
