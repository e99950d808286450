//! # replica_component
//!
//! The data side of replication: what a component is, where entities live and
//! how sprite assets are named.
//!
//! This crate provides:
//!
//! - [`Component`] / [`ComponentKind`] — the closed set of component kinds.
//! - [`ComponentData`] — the capability trait shared by every payload struct.
//! - [`kinds`] — the payload structs themselves.
//! - [`Entity`] / [`EntityAllocator`] — store-local entity ids.
//! - [`EntityStore`] / [`World`] — the entity store seam and its in-memory
//!   implementation.
//! - [`AssetTable`] / [`SpriteAtlas`] — sprite handle ⇄ wire index lookup.

pub mod assets;
pub mod component;
pub mod entity;
pub mod kinds;
pub mod store;

pub use assets::{AssetTable, SpriteAtlas, SpriteHandle};
pub use component::{Component, ComponentData, ComponentKind};
pub use entity::{Entity, EntityAllocator};
pub use kinds::{
    Body, Color, Controllable, Coupled, DamageSprite, Dispatchable, Launchable, Light,
    OutOfBounds, OutOfBoundsAction, Particle, ParticleKind, Position, RelativeSpeed, Renderable,
    Size, Speed, Sprite,
};
pub use store::{EntityStore, StoreError, World};
