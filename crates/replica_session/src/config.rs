//! Session configuration.

use replica_net::connection;
use replica_net::subjects::DEFAULT_CHANNEL;

/// Inbox capacity used when none is configured.
pub const DEFAULT_INBOX_CAPACITY: usize = 256;

/// Configuration for a replication session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Channel peers exchange packets on (e.g. `"arena"`).
    pub channel: String,
    /// How many received packets may wait for the simulation thread before
    /// new ones are dropped.
    pub inbox_capacity: usize,
    /// Optional NATS URL override (defaults to `NATS_URL` env or localhost).
    pub nats_url: Option<String>,
}

impl SessionConfig {
    /// Create a config for `channel` with default settings.
    #[must_use]
    pub fn new(channel: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            inbox_capacity: DEFAULT_INBOX_CAPACITY,
            nats_url: None,
        }
    }

    /// Override the inbox capacity. Zero is raised to one.
    #[must_use]
    pub fn with_inbox_capacity(mut self, capacity: usize) -> Self {
        self.inbox_capacity = capacity.max(1);
        self
    }

    /// Override the NATS URL for this session.
    #[must_use]
    pub fn with_nats_url(mut self, url: impl Into<String>) -> Self {
        self.nats_url = Some(url.into());
        self
    }

    /// The NATS URL to connect to after applying the environment fallback.
    #[must_use]
    pub fn resolved_nats_url(&self) -> String {
        connection::resolve_url(self.nats_url.as_deref())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_CHANNEL)
    }
}
