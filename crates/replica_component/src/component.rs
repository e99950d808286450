//! Core [`Component`] enum, [`ComponentKind`] tags and the [`ComponentData`]
//! capability trait.
//!
//! The set of component kinds is closed: every piece of data an entity can
//! carry is one of the variants of [`Component`]. Each variant wraps a plain
//! payload struct from [`crate::kinds`], and each payload struct implements
//! [`ComponentData`] so generic code (the replication registry, the entity
//! store) can move between the concrete type and the enum.
//!
//! ## Kind tags
//!
//! [`ComponentKind::tag`] is the string used to identify a kind on the wire.
//! Tags are part of the protocol: renaming one is a breaking change.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::kinds::{
    Body, Controllable, Coupled, DamageSprite, Dispatchable, Launchable, Light, OutOfBounds,
    Particle, Position, RelativeSpeed, Renderable, Size, Speed, Sprite,
};

/// Identifies one of the closed set of component kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ComponentKind {
    Sprite,
    Speed,
    Size,
    Renderable,
    RelativeSpeed,
    Position,
    Particle,
    OutOfBounds,
    Light,
    Launchable,
    Dispatchable,
    DamageSprite,
    Coupled,
    Controllable,
    Body,
}

impl ComponentKind {
    /// Every kind, in declaration order.
    pub const ALL: [ComponentKind; 15] = [
        ComponentKind::Sprite,
        ComponentKind::Speed,
        ComponentKind::Size,
        ComponentKind::Renderable,
        ComponentKind::RelativeSpeed,
        ComponentKind::Position,
        ComponentKind::Particle,
        ComponentKind::OutOfBounds,
        ComponentKind::Light,
        ComponentKind::Launchable,
        ComponentKind::Dispatchable,
        ComponentKind::DamageSprite,
        ComponentKind::Coupled,
        ComponentKind::Controllable,
        ComponentKind::Body,
    ];

    /// The wire tag for this kind.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            ComponentKind::Sprite => "Sprite",
            ComponentKind::Speed => "Speed",
            ComponentKind::Size => "Size",
            ComponentKind::Renderable => "Renderable",
            ComponentKind::RelativeSpeed => "RelativeSpeed",
            ComponentKind::Position => "Position",
            ComponentKind::Particle => "Particle",
            ComponentKind::OutOfBounds => "OutOfBounds",
            ComponentKind::Light => "Light",
            ComponentKind::Launchable => "Launchable",
            ComponentKind::Dispatchable => "Dispatchable",
            ComponentKind::DamageSprite => "DamageSprite",
            ComponentKind::Coupled => "Coupled",
            ComponentKind::Controllable => "Controllable",
            ComponentKind::Body => "Body",
        }
    }

    /// Look up a kind by its wire tag. Returns `None` for tags this build
    /// does not know about.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.tag() == tag)
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A single component value of any kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Component {
    Sprite(Sprite),
    Speed(Speed),
    Size(Size),
    Renderable(Renderable),
    RelativeSpeed(RelativeSpeed),
    Position(Position),
    Particle(Particle),
    OutOfBounds(OutOfBounds),
    Light(Light),
    Launchable(Launchable),
    Dispatchable(Dispatchable),
    DamageSprite(DamageSprite),
    Coupled(Coupled),
    Controllable(Controllable),
    Body(Body),
}

impl Component {
    /// Returns the kind of this component.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        match self {
            Component::Sprite(_) => ComponentKind::Sprite,
            Component::Speed(_) => ComponentKind::Speed,
            Component::Size(_) => ComponentKind::Size,
            Component::Renderable(_) => ComponentKind::Renderable,
            Component::RelativeSpeed(_) => ComponentKind::RelativeSpeed,
            Component::Position(_) => ComponentKind::Position,
            Component::Particle(_) => ComponentKind::Particle,
            Component::OutOfBounds(_) => ComponentKind::OutOfBounds,
            Component::Light(_) => ComponentKind::Light,
            Component::Launchable(_) => ComponentKind::Launchable,
            Component::Dispatchable(_) => ComponentKind::Dispatchable,
            Component::DamageSprite(_) => ComponentKind::DamageSprite,
            Component::Coupled(_) => ComponentKind::Coupled,
            Component::Controllable(_) => ComponentKind::Controllable,
            Component::Body(_) => ComponentKind::Body,
        }
    }

    /// Borrow the payload as a concrete component type, if the kinds match.
    #[must_use]
    pub fn downcast_ref<T: ComponentData>(&self) -> Option<&T> {
        T::from_component(self)
    }

    /// Mutably borrow the payload as a concrete component type.
    #[must_use]
    pub fn downcast_mut<T: ComponentData>(&mut self) -> Option<&mut T> {
        T::from_component_mut(self)
    }
}

/// The capability every component payload type shares.
///
/// Implemented for every payload struct by the `component_data!` macro.
pub trait ComponentData: Clone + Send + Sync + 'static + Into<Component> {
    /// The kind this payload type belongs to.
    const KIND: ComponentKind;

    /// Borrow `Self` out of a [`Component`] of the matching kind.
    fn from_component(component: &Component) -> Option<&Self>;

    /// Mutably borrow `Self` out of a [`Component`] of the matching kind.
    fn from_component_mut(component: &mut Component) -> Option<&mut Self>;

    /// Move `Self` out of a [`Component`] of the matching kind.
    fn into_data(component: Component) -> Option<Self>;
}

macro_rules! component_data {
    ($($ty:ident),* $(,)?) => {
        $(
            impl From<$ty> for Component {
                fn from(value: $ty) -> Self {
                    Component::$ty(value)
                }
            }

            impl ComponentData for $ty {
                const KIND: ComponentKind = ComponentKind::$ty;

                fn from_component(component: &Component) -> Option<&Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn from_component_mut(component: &mut Component) -> Option<&mut Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }

                fn into_data(component: Component) -> Option<Self> {
                    match component {
                        Component::$ty(value) => Some(value),
                        _ => None,
                    }
                }
            }
        )*
    };
}

component_data!(
    Sprite,
    Speed,
    Size,
    Renderable,
    RelativeSpeed,
    Position,
    Particle,
    OutOfBounds,
    Light,
    Launchable,
    Dispatchable,
    DamageSprite,
    Coupled,
    Controllable,
    Body,
);
