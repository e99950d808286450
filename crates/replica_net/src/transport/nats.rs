//! Core NATS as a datagram transport.
//!
//! Core NATS publish/subscribe is at-most-once with no acknowledgement, which
//! is exactly datagram semantics. A peer publishes and subscribes on the same
//! channel subject, so it would receive its own packets back; each transport
//! stamps an `instance-id` header and drops messages carrying its own id.

use futures::StreamExt;
use tracing::{debug, info};
use uuid::Uuid;

use super::{DatagramHandler, Transport};
use crate::connection::NatsConnection;
use crate::error::NetError;
use crate::subjects;

#[derive(Debug, Clone)]
pub struct NatsTransport {
    conn: NatsConnection,
    subject: String,
    instance_id: String,
}

impl NatsTransport {
    /// Use `conn` to exchange packets on `channel`.
    #[must_use]
    pub fn new(conn: NatsConnection, channel: &str) -> Self {
        Self {
            conn,
            subject: subjects::packets(channel),
            instance_id: Uuid::new_v4().to_string(),
        }
    }
}

impl Transport for NatsTransport {
    async fn send_datagram(&self, datagram: Vec<u8>) -> Result<(), NetError> {
        let mut headers = async_nats::HeaderMap::new();
        headers.insert(subjects::headers::INSTANCE_ID, self.instance_id.as_str());
        self.conn
            .publish_bytes(&self.subject, headers, datagram)
            .await
    }

    async fn on_datagram_received(&self, handler: DatagramHandler) -> Result<(), NetError> {
        let mut sub = self.conn.subscribe(&self.subject).await?;
        info!(
            subject = self.subject,
            instance_id = self.instance_id,
            "subscribed to packets"
        );

        let own_id = self.instance_id.clone();
        let subject = self.subject.clone();
        tokio::spawn(async move {
            while let Some(msg) = sub.next().await {
                if sent_by(msg.headers.as_ref(), &own_id) {
                    continue;
                }
                handler(msg.payload.to_vec());
            }
            debug!(subject, "packet subscription closed");
        });
        Ok(())
    }
}

/// Returns `true` if `headers` carry the instance id `id`.
fn sent_by(headers: Option<&async_nats::HeaderMap>, id: &str) -> bool {
    headers
        .and_then(|headers| headers.get(subjects::headers::INSTANCE_ID))
        .is_some_and(|value| value.as_str() == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_own_packets_are_recognised() {
        let own = Uuid::new_v4().to_string();
        let mut headers = async_nats::HeaderMap::new();
        headers.insert(subjects::headers::INSTANCE_ID, own.as_str());

        assert!(sent_by(Some(&headers), &own));
        assert!(!sent_by(Some(&headers), &Uuid::new_v4().to_string()));
        assert!(!sent_by(Some(&async_nats::HeaderMap::new()), &own));
        assert!(!sent_by(None, &own));
    }
}
