//! Bus publisher.
//!
//! Publishes encoded command frames to a family channel. Fire-and-forget:
//! there is no acknowledgement and no retry; a controller that is offline at
//! publish time misses the command and is healed by the next resync.

use redis::AsyncCommands;

use crate::channels::SyncChannel;
use crate::codec::Frame;
use crate::pool::{RedisPool, RedisPoolError};

/// Bus publisher backed by the shared Redis pool
#[derive(Clone)]
pub struct Publisher {
    pool: RedisPool,
}

impl Publisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    /// Publish a frame to a family channel, returning the number of
    /// subscribers that received it.
    ///
    /// Frames with an empty server mask are skipped entirely - no controller
    /// would act on them.
    pub async fn publish(
        &self,
        channel: SyncChannel,
        frame: &Frame,
    ) -> Result<u32, RedisPoolError> {
        if frame.server_mask.is_empty() {
            tracing::debug!(
                channel = %channel,
                command_id = frame.command_id,
                "Skipping publish with empty server mask"
            );
            return Ok(0);
        }

        let mut conn = self.pool.get().await?;
        let receivers: u32 = conn.publish(channel.name(), frame.encode()).await?;

        tracing::debug!(
            channel = %channel,
            command_id = frame.command_id,
            mask = %frame.server_mask,
            receivers,
            "Published command"
        );

        Ok(receivers)
    }
}
