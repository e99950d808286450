//! # replica_net
//!
//! Wire side of entity-component replication.
//!
//! This crate provides:
//!
//! - [`packet`] — the [`Packet`] envelope and its builder.
//! - [`registry`] — the [`ComponentRegistry`] mapping kind tags to rules.
//! - [`rules`] — the default wire rule for every replicated kind.
//! - [`encoder`] / [`decoder`] — component set ⇄ packet.
//! - [`transport`] — the [`Transport`] trait with NATS, UDP and loopback
//!   implementations.
//! - [`codec`] — MessagePack envelope and payload serialisation.
//! - [`connection`] — NATS connection management.
//! - [`subjects`] — NATS subject builders.
//! - [`error`] — network-layer error types.

pub mod codec;
pub mod connection;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod packet;
pub mod registry;
pub mod rules;
pub mod subjects;
pub mod transport;

pub use connection::NatsConnection;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use error::{NetError, PayloadError};
pub use packet::{PROTOCOL_VERSION, Packet, PacketBuilder, Payload};
pub use registry::{ComponentRegistry, Replicate, Rule};
pub use transport::{DatagramHandler, LoopbackTransport, NatsTransport, Transport, UdpTransport};
