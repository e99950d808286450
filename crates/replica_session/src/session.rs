//! The replication session.
//!
//! A session owns an encoder, a decoder and a transport, and moves entity
//! snapshots between them. It has no knowledge of individual component kinds.
//!
//! Sending happens on the simulation task: [`ReplicationSession::observe_and_send`]
//! snapshots one entity, encodes it and hands the bytes to the transport.
//! Receiving is split in two. The transport callback installed by
//! [`ReplicationSession::listen`] only parses the envelope and queues the
//! packet; [`ReplicationSession::drain_inbox`] later materializes queued
//! packets on the simulation task, so the store is never touched from the
//! transport's thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use replica_component::{AssetTable, Entity, EntityStore, StoreError};
use replica_net::{
    ComponentRegistry, Decoder, Encoder, NatsConnection, NatsTransport, NetError, Packet,
    Transport,
};
use tokio::sync::mpsc;
use tracing::{debug, info, trace, warn};

use crate::config::SessionConfig;

/// Errors surfaced by a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Net(#[from] NetError),
}

/// Packet counters since the session was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Packets handed to the transport.
    pub sent: u64,
    /// Well-formed packets accepted from the transport.
    pub received: u64,
    /// Remote entities created in the local store.
    pub materialized: u64,
    /// Datagrams discarded: bad envelope, version mismatch or full inbox.
    pub dropped: u64,
}

#[derive(Debug, Default)]
struct Counters {
    sent: AtomicU64,
    received: AtomicU64,
    materialized: AtomicU64,
    dropped: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> SessionStats {
        SessionStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            materialized: self.materialized.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
        }
    }
}

/// Replicates entities between this peer and others over `T`.
#[derive(Debug)]
pub struct ReplicationSession<T> {
    config: SessionConfig,
    transport: T,
    encoder: Encoder,
    decoder: Decoder,
    inbox_tx: mpsc::Sender<Packet>,
    inbox_rx: mpsc::Receiver<Packet>,
    counters: Arc<Counters>,
}

impl ReplicationSession<NatsTransport> {
    /// Connect to NATS and build a session on the configured channel.
    ///
    /// # Errors
    ///
    /// Returns [`NetError::Connect`] if NATS is unreachable.
    pub async fn connect(
        config: SessionConfig,
        registry: Arc<ComponentRegistry>,
        assets: Arc<dyn AssetTable>,
    ) -> Result<Self, SessionError> {
        let conn = NatsConnection::connect_to(&config.resolved_nats_url()).await?;
        let transport = NatsTransport::new(conn, &config.channel);
        Ok(Self::new(config, transport, registry, assets))
    }
}

impl<T: Transport> ReplicationSession<T> {
    #[must_use]
    pub fn new(
        config: SessionConfig,
        transport: T,
        registry: Arc<ComponentRegistry>,
        assets: Arc<dyn AssetTable>,
    ) -> Self {
        let (inbox_tx, inbox_rx) = mpsc::channel(config.inbox_capacity.max(1));
        Self {
            encoder: Encoder::new(Arc::clone(&registry), Arc::clone(&assets)),
            decoder: Decoder::new(registry, assets),
            config,
            transport,
            inbox_tx,
            inbox_rx,
            counters: Arc::new(Counters::default()),
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    #[must_use]
    pub fn transport(&self) -> &T {
        &self.transport
    }

    #[must_use]
    pub fn stats(&self) -> SessionStats {
        self.counters.snapshot()
    }

    /// Encode the current state of `entity` without sending it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NoSuchEntity`] if `entity` is not in `store`.
    pub fn snapshot<S>(&self, store: &S, entity: Entity) -> Result<Packet, StoreError>
    where
        S: EntityStore + ?Sized,
    {
        let components = store.components(entity)?;
        Ok(self.encoder.encode(&components))
    }

    /// Snapshot `entity`, encode it and send it to peers.
    ///
    /// Returns the number of components sent. An entity with nothing to
    /// replicate sends no packet and returns zero.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] if `entity` is not in `store`, and
    /// [`SessionError::Net`] if the packet could not be serialised or handed
    /// to the transport.
    pub async fn observe_and_send<S>(&self, store: &S, entity: Entity) -> Result<usize, SessionError>
    where
        S: EntityStore + ?Sized,
    {
        let packet = self.snapshot(store, entity)?;
        if packet.is_empty() {
            debug!(%entity, "nothing to replicate, packet not sent");
            return Ok(0);
        }
        self.send_packet(&packet).await?;
        trace!(%entity, components = packet.len(), "entity replicated");
        Ok(packet.len())
    }

    /// Serialise and send an already-built packet.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if serialisation or the transport fails.
    pub async fn send_packet(&self, packet: &Packet) -> Result<(), NetError> {
        let bytes = packet.to_bytes()?;
        self.transport.send_datagram(bytes).await?;
        Counters::bump(&self.counters.sent);
        Ok(())
    }

    /// Start accepting packets from peers into the inbox.
    ///
    /// # Errors
    ///
    /// Returns [`NetError`] if the transport cannot start receiving.
    pub async fn listen(&self) -> Result<(), NetError> {
        let inbox = self.inbox_tx.clone();
        let counters = Arc::clone(&self.counters);
        self.transport
            .on_datagram_received(Box::new(move |bytes| {
                enqueue(&inbox, &counters, &bytes);
            }))
            .await?;
        info!(channel = self.config.channel, "listening for packets");
        Ok(())
    }

    /// Decode `packet` and materialize it as a brand-new entity in `store`.
    ///
    /// Every component the decoder produces is attached; keys it skips leave
    /// no trace. An empty packet still creates an (empty) entity.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store rejects an attach.
    pub fn receive_and_materialize<S>(
        &self,
        store: &mut S,
        packet: &Packet,
    ) -> Result<Entity, StoreError>
    where
        S: EntityStore + ?Sized,
    {
        let components = self.decoder.decode(packet);
        let count = components.len();
        let entity = store.create_entity();
        for component in components {
            store.attach(entity, component)?;
        }
        Counters::bump(&self.counters.materialized);
        debug!(%entity, components = count, "remote entity materialized");
        Ok(entity)
    }

    /// Materialize every packet waiting in the inbox, in arrival order.
    ///
    /// Returns the entities created.
    ///
    /// # Errors
    ///
    /// Stops at the first [`StoreError`]; packets after it stay queued.
    pub fn drain_inbox<S>(&mut self, store: &mut S) -> Result<Vec<Entity>, StoreError>
    where
        S: EntityStore + ?Sized,
    {
        let mut created = Vec::new();
        while let Ok(packet) = self.inbox_rx.try_recv() {
            created.push(self.receive_and_materialize(store, &packet)?);
        }
        Ok(created)
    }
}

/// Transport callback body: parse the envelope and queue the packet.
fn enqueue(inbox: &mpsc::Sender<Packet>, counters: &Counters, bytes: &[u8]) {
    let packet = match Packet::from_bytes(bytes) {
        Ok(packet) => packet,
        Err(err @ NetError::VersionMismatch { .. }) => {
            warn!(error = %err, "packet from incompatible peer dropped");
            Counters::bump(&counters.dropped);
            return;
        }
        Err(err) => {
            warn!(error = %err, len = bytes.len(), "malformed datagram dropped");
            Counters::bump(&counters.dropped);
            return;
        }
    };
    Counters::bump(&counters.received);
    match inbox.try_send(packet) {
        Ok(()) => {}
        Err(mpsc::error::TrySendError::Full(_)) => {
            warn!("inbox full, packet dropped");
            Counters::bump(&counters.dropped);
        }
        Err(mpsc::error::TrySendError::Closed(_)) => {
            debug!("session gone, packet dropped");
            Counters::bump(&counters.dropped);
        }
    }
}

#[cfg(test)]
mod tests {
    use replica_component::{
        Component, ComponentKind, Entity, Position, RelativeSpeed, Renderable, Size, Speed, Sprite,
        SpriteAtlas, World,
    };
    use replica_net::codec::encode_payload;
    use replica_net::{LoopbackTransport, PROTOCOL_VERSION, PacketBuilder};

    use super::*;

    fn atlas() -> Arc<SpriteAtlas> {
        Arc::new(SpriteAtlas::from_names(["ship", "rock"]))
    }

    fn session(transport: LoopbackTransport, capacity: usize) -> ReplicationSession<LoopbackTransport> {
        ReplicationSession::new(
            SessionConfig::new("test").with_inbox_capacity(capacity),
            transport,
            Arc::new(ComponentRegistry::with_defaults()),
            atlas(),
        )
    }

    fn pair(capacity: usize) -> (
        ReplicationSession<LoopbackTransport>,
        ReplicationSession<LoopbackTransport>,
    ) {
        let (a, b) = LoopbackTransport::pair();
        (session(a, capacity), session(b, capacity))
    }

    #[tokio::test]
    async fn test_entity_replicates_to_peer() {
        let (sender, mut receiver) = pair(8);
        receiver.listen().await.unwrap();

        let atlas = atlas();
        let mut local = World::new();
        let ship = local.spawn([
            Component::from(Position::new(1.0, 2.0)),
            Component::from(Speed {
                x: 3.0,
                y: 4.0,
                active: false,
            }),
            Component::from(Sprite::new(atlas.handle("rock").unwrap())),
            Component::from(RelativeSpeed { x: 9.0, y: 9.0 }),
            Component::from(Renderable),
        ]);

        let sent = sender.observe_and_send(&local, ship).await.unwrap();
        assert_eq!(sent, 4);

        let mut remote = World::new();
        let created = receiver.drain_inbox(&mut remote).unwrap();
        assert_eq!(created.len(), 1);
        let copy = created[0];

        assert_eq!(remote.get::<Position>(copy), local.get::<Position>(ship));
        let speed = remote.get::<Speed>(copy).unwrap();
        assert_eq!((speed.x, speed.y, speed.active), (3.0, 4.0, true));
        assert_eq!(remote.get::<Sprite>(copy).unwrap().sprite.name(), "rock");
        assert!(remote.has(copy, ComponentKind::Renderable));
        assert!(!remote.has(copy, ComponentKind::RelativeSpeed));

        assert_eq!(sender.stats().sent, 1);
        let stats = receiver.stats();
        assert_eq!((stats.received, stats.materialized, stats.dropped), (1, 1, 0));
    }

    #[tokio::test]
    async fn test_every_packet_spawns_a_new_entity() {
        let (sender, mut receiver) = pair(8);
        receiver.listen().await.unwrap();

        let mut local = World::new();
        let e = local.spawn([Component::from(Size {
            width: 1.0,
            height: 1.0,
        })]);
        sender.observe_and_send(&local, e).await.unwrap();
        sender.observe_and_send(&local, e).await.unwrap();

        let mut remote = World::new();
        let created = receiver.drain_inbox(&mut remote).unwrap();
        assert_eq!(created.len(), 2);
        assert_ne!(created[0], created[1]);
        assert_eq!(remote.entity_count(), 2);
    }

    #[tokio::test]
    async fn test_local_only_entity_sends_nothing() {
        let (sender, mut receiver) = pair(8);
        receiver.listen().await.unwrap();

        let mut local = World::new();
        let e = local.spawn([Component::from(RelativeSpeed { x: 1.0, y: 1.0 })]);
        assert_eq!(sender.observe_and_send(&local, e).await.unwrap(), 0);
        assert_eq!(sender.stats().sent, 0);

        let mut remote = World::new();
        assert!(receiver.drain_inbox(&mut remote).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_entity_is_an_error() {
        let (sender, _receiver) = pair(8);
        let world = World::new();
        let err = sender
            .observe_and_send(&world, Entity::from_raw(42).unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Store(StoreError::NoSuchEntity(_))));
    }

    #[tokio::test]
    async fn test_full_inbox_drops_packets() {
        let (sender, mut receiver) = pair(1);
        receiver.listen().await.unwrap();

        let mut local = World::new();
        let e = local.spawn([Component::from(Renderable)]);
        sender.observe_and_send(&local, e).await.unwrap();
        sender.observe_and_send(&local, e).await.unwrap();

        let stats = receiver.stats();
        assert_eq!((stats.received, stats.dropped), (2, 1));

        let mut remote = World::new();
        assert_eq!(receiver.drain_inbox(&mut remote).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_bad_envelopes_are_dropped() {
        let (raw, peer) = LoopbackTransport::pair();
        let mut receiver = session(peer, 8);
        receiver.listen().await.unwrap();

        raw.send_datagram(b"garbage".to_vec()).await.unwrap();
        let future = PacketBuilder::new().version(PROTOCOL_VERSION + 1).build();
        raw.send_datagram(future.to_bytes().unwrap()).await.unwrap();

        let stats = receiver.stats();
        assert_eq!((stats.received, stats.dropped), (0, 2));
        let mut remote = World::new();
        assert!(receiver.drain_inbox(&mut remote).unwrap().is_empty());
    }

    #[test]
    fn test_empty_packet_materializes_empty_entity() {
        let (_, receiver) = pair(8);
        let mut world = World::new();
        let entity = receiver
            .receive_and_materialize(&mut world, &PacketBuilder::new().build())
            .unwrap();
        assert!(world.contains(entity));
        assert!(world.components(entity).unwrap().is_empty());
    }

    #[test]
    fn test_missing_keys_attach_nothing() {
        let (_, receiver) = pair(8);
        let mut world = World::new();
        let packet = PacketBuilder::new()
            .with("Position", encode_payload(&(4.0f32, 5.0f32, 0u8)).unwrap())
            .with("Size", encode_payload(&(10u8, 20u8)).unwrap())
            .build();
        let entity = receiver.receive_and_materialize(&mut world, &packet).unwrap();

        assert!(world.has(entity, ComponentKind::Position));
        assert_eq!(
            world.get::<Size>(entity),
            Some(&Size {
                width: 10.0,
                height: 20.0
            })
        );
        assert!(!world.has(entity, ComponentKind::Speed));
        assert!(!world.has(entity, ComponentKind::Body));
        assert_eq!(world.components(entity).unwrap().len(), 2);
    }

    #[test]
    fn test_snapshot_is_deterministic() {
        let (session, _) = pair(8);
        let mut world = World::new();
        let e = world.spawn([
            Component::from(Speed::new(1.0, 1.0)),
            Component::from(Position::new(0.5, 0.5)),
        ]);
        let a = session.snapshot(&world, e).unwrap().to_bytes().unwrap();
        let b = session.snapshot(&world, e).unwrap().to_bytes().unwrap();
        assert_eq!(a, b);
    }
}
