//! Command-line arguments.

use std::net::SocketAddr;

use clap::{Parser, ValueEnum};
use replica_net::subjects::DEFAULT_CHANNEL;
use replica_session::SessionConfig;
use replica_session::config::DEFAULT_INBOX_CAPACITY;

use crate::tick::TickConfig;

/// Which transport carries packets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TransportKind {
    /// Core NATS publish/subscribe on `replica.packet.<channel>`.
    Nats,
    /// Plain UDP to a single peer.
    Udp,
    /// In-process echo: the peer receives its own packets.
    Loopback,
}

#[derive(Parser, Debug)]
#[command(name = "replica_app", about = "Entity replication demo peer")]
pub struct Args {
    /// Transport to replicate over.
    #[arg(short, long, value_enum, default_value_t = TransportKind::Loopback)]
    pub transport: TransportKind,

    /// NATS server URL (defaults to `NATS_URL` env or localhost).
    #[arg(long)]
    pub nats_url: Option<String>,

    /// Replication channel.
    #[arg(short, long, default_value = DEFAULT_CHANNEL)]
    pub channel: String,

    /// Local UDP address.
    #[arg(long, default_value = "127.0.0.1:7400")]
    pub bind: SocketAddr,

    /// Remote UDP address.
    #[arg(long, default_value = "127.0.0.1:7401")]
    pub peer: SocketAddr,

    /// Simulation ticks per second.
    #[arg(long, default_value_t = 30.0, value_parser = parse_tick_rate)]
    pub tick_rate: f64,

    /// Replicate local entities every N ticks.
    #[arg(long, default_value_t = 30)]
    pub replicate_every: u64,

    /// Number of demo entities to spawn.
    #[arg(short, long, default_value_t = 3)]
    pub spawn: usize,

    /// Stop after this many ticks (0 = run forever).
    #[arg(long, default_value_t = 0)]
    pub max_ticks: u64,

    /// Received packets that may wait for the simulation.
    #[arg(long, default_value_t = DEFAULT_INBOX_CAPACITY)]
    pub inbox_capacity: usize,
}

fn parse_tick_rate(value: &str) -> Result<f64, String> {
    let rate: f64 = value.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive number, got {value}"))
    }
}

impl Args {
    #[must_use]
    pub fn session_config(&self) -> SessionConfig {
        let config = SessionConfig::new(&self.channel).with_inbox_capacity(self.inbox_capacity);
        match &self.nats_url {
            Some(url) => config.with_nats_url(url),
            None => config,
        }
    }

    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            replicate_every: self.replicate_every,
            max_ticks: self.max_ticks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::try_parse_from(["replica_app"]).unwrap();
        assert_eq!(args.transport, TransportKind::Loopback);
        assert_eq!(args.channel, "default");
        assert!(args.nats_url.is_none());
        assert_eq!(args.session_config().inbox_capacity, DEFAULT_INBOX_CAPACITY);
    }

    #[test]
    fn test_overrides() {
        let args = Args::try_parse_from([
            "replica_app",
            "--transport",
            "udp",
            "--peer",
            "10.0.0.2:9000",
            "--channel",
            "arena",
            "--nats-url",
            "nats://hub:4222",
            "--max-ticks",
            "10",
        ])
        .unwrap();
        assert_eq!(args.transport, TransportKind::Udp);
        assert_eq!(args.peer.port(), 9000);
        let config = args.session_config();
        assert_eq!(config.channel, "arena");
        assert_eq!(config.nats_url.as_deref(), Some("nats://hub:4222"));
        assert_eq!(args.tick_config().max_ticks, 10);
    }

    #[test]
    fn test_tick_rate_must_be_positive_and_finite() {
        for bad in ["0", "-5", "NaN", "inf", "fast"] {
            assert!(
                Args::try_parse_from(["replica_app", "--tick-rate", bad]).is_err(),
                "--tick-rate {bad} was accepted"
            );
        }
        let args = Args::try_parse_from(["replica_app", "--tick-rate", "120"]).unwrap();
        assert_eq!(args.tick_config().tick_rate, 120.0);
    }

    #[test]
    fn test_unknown_transport_rejected() {
        assert!(Args::try_parse_from(["replica_app", "--transport", "carrier-pigeon"]).is_err());
    }
}
