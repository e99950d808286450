//! # replica_app — demo peer
//!
//! Simulates a ship and a few rocks and replicates them to every other peer
//! on the same channel. Entities peers send back show up as new local
//! entities and move with the rest of the world.
//!
//! ## Startup Sequence
//!
//! 1. Parse arguments and initialise logging.
//! 2. Build the component registry and the shared sprite atlas.
//! 3. Open the selected transport and start listening.
//! 4. Spawn the demo entities and enter the fixed-timestep tick loop.
//!
//! Two peers over UDP:
//!
//! ```text
//! replica_app -t udp --bind 127.0.0.1:7400 --peer 127.0.0.1:7401
//! replica_app -t udp --bind 127.0.0.1:7401 --peer 127.0.0.1:7400
//! ```

mod cli;
mod demo;
mod tick;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Args, TransportKind};
use replica_net::{ComponentRegistry, LoopbackTransport, Transport, UdpTransport};
use replica_session::ReplicationSession;
use tick::TickLoop;

/// Size of the playfield in world units.
const PLAYFIELD: Vec2 = Vec2::new(800.0, 600.0);

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("replica_app=info".parse()?)
                .add_directive("replica_session=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(transport = ?args.transport, channel = args.channel, "replica peer starting");

    let registry = Arc::new(ComponentRegistry::with_defaults());
    let atlas = Arc::new(demo::atlas());
    let config = args.session_config();

    match args.transport {
        TransportKind::Nats => {
            let session = ReplicationSession::connect(config, registry, atlas.clone()).await?;
            run(&args, session, &atlas).await?;
        }
        TransportKind::Udp => {
            let transport = UdpTransport::bind(args.bind, args.peer).await?;
            let session = ReplicationSession::new(config, transport, registry, atlas.clone());
            run(&args, session, &atlas).await?;
        }
        TransportKind::Loopback => {
            let session =
                ReplicationSession::new(config, LoopbackTransport::echo(), registry, atlas.clone());
            run(&args, session, &atlas).await?;
        }
    }

    info!("replica peer shut down");
    Ok(())
}

async fn run<T: Transport>(
    args: &Args,
    session: ReplicationSession<T>,
    atlas: &replica_component::SpriteAtlas,
) -> Result<()> {
    session.listen().await?;

    let mut tick_loop = TickLoop::new(args.tick_config(), session, PLAYFIELD);
    let spawned = demo::spawn(tick_loop.world_mut(), atlas, args.spawn, PLAYFIELD);
    info!(count = spawned.len(), "demo entities spawned");
    tick_loop.own(spawned);

    tick_loop.run().await
}
