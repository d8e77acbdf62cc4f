//! Bus subscriber.
//!
//! Holds a dedicated Redis pub/sub connection subscribed to a fixed set of
//! family channels, reconnecting with a delay on connection loss, and fans
//! received payloads out over a `tokio::sync::broadcast` channel. The
//! channel set never changes at runtime - a controller subscribes to its two
//! family channels at startup and keeps them for the process lifetime.

use futures_util::StreamExt;
use redis::Client;
use tokio::sync::broadcast;

/// Error type for subscriber operations
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Subscriber channel closed")]
    ChannelClosed,
}

/// Result type for subscriber operations
pub type SubscriberResult<T> = Result<T, SubscriberError>;

/// Raw message received from the bus
#[derive(Debug, Clone)]
pub struct ReceivedMessage {
    /// Channel the message was received on
    pub channel: String,
    /// Raw frame bytes
    pub payload: Vec<u8>,
}

/// Subscriber configuration
#[derive(Debug, Clone)]
pub struct SubscriberConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Channels to subscribe to
    pub channels: Vec<String>,
    /// Buffer size of the broadcast fan-out
    pub broadcast_buffer: usize,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            channels: Vec::new(),
            broadcast_buffer: 1024,
            reconnect_delay_ms: 1000,
        }
    }
}

/// Bus subscriber with a background listener task
pub struct Subscriber {
    broadcast_tx: broadcast::Sender<ReceivedMessage>,
}

impl Subscriber {
    /// Create a new subscriber and start the background listener
    #[must_use]
    pub fn spawn(config: SubscriberConfig) -> Self {
        let (broadcast_tx, _) = broadcast::channel(config.broadcast_buffer);
        let tx = broadcast_tx.clone();

        tokio::spawn(Self::listener_loop(config, tx));

        Self { broadcast_tx }
    }

    /// Get a receiver for incoming messages
    #[must_use]
    pub fn receiver(&self) -> broadcast::Receiver<ReceivedMessage> {
        self.broadcast_tx.subscribe()
    }

    /// Background listener loop; reconnects forever
    async fn listener_loop(
        config: SubscriberConfig,
        broadcast_tx: broadcast::Sender<ReceivedMessage>,
    ) {
        loop {
            if let Err(e) = Self::run_listener(&config, &broadcast_tx).await {
                tracing::error!(error = %e, "Subscriber error, reconnecting...");
            } else {
                tracing::warn!("Bus stream ended, reconnecting...");
            }
            tokio::time::sleep(tokio::time::Duration::from_millis(config.reconnect_delay_ms))
                .await;
        }
    }

    /// Run the listener until the connection drops
    async fn run_listener(
        config: &SubscriberConfig,
        broadcast_tx: &broadcast::Sender<ReceivedMessage>,
    ) -> SubscriberResult<()> {
        let client = Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;

        for channel in &config.channels {
            pubsub.subscribe(channel).await?;
        }

        tracing::info!(channels = ?config.channels, "Subscriber connected to bus");

        let mut stream = pubsub.on_message();

        while let Some(msg) = stream.next().await {
            let channel = msg.get_channel_name().to_string();
            let payload: Vec<u8> = msg.get_payload().unwrap_or_default();

            tracing::trace!(channel = %channel, bytes = payload.len(), "Received bus message");

            // Send errors only mean there are no receivers right now.
            let _ = broadcast_tx.send(ReceivedMessage { channel, payload });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriber_config_default() {
        let config = SubscriberConfig::default();
        assert_eq!(config.redis_url, "redis://127.0.0.1:6379");
        assert_eq!(config.broadcast_buffer, 1024);
        assert_eq!(config.reconnect_delay_ms, 1000);
        assert!(config.channels.is_empty());
    }
}
