//! # replica_session
//!
//! Ties the encoder, decoder and a transport together into a replication
//! session. A peer:
//!
//! 1. Builds a [`ReplicationSession`] over some [`replica_net::Transport`].
//! 2. Calls [`ReplicationSession::listen`] once to start queueing packets.
//! 3. Each replication tick: [`ReplicationSession::observe_and_send`] for the
//!    entities it owns.
//! 4. Each simulation tick: [`ReplicationSession::drain_inbox`] to spawn the
//!    entities peers sent.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use replica_component::{Component, Position, SpriteAtlas, World};
//! use replica_net::ComponentRegistry;
//! use replica_session::{ReplicationSession, SessionConfig};
//!
//! #[tokio::main]
//! async fn main() {
//!     let session = ReplicationSession::connect(
//!         SessionConfig::new("arena"),
//!         Arc::new(ComponentRegistry::with_defaults()),
//!         Arc::new(SpriteAtlas::from_names(["ship"])),
//!     )
//!     .await
//!     .unwrap();
//!
//!     let mut world = World::new();
//!     let ship = world.spawn([Component::from(Position::new(0.0, 0.0))]);
//!     session.observe_and_send(&world, ship).await.unwrap();
//! }
//! ```

pub mod config;
pub mod session;

pub use config::SessionConfig;
pub use session::{ReplicationSession, SessionError, SessionStats};
