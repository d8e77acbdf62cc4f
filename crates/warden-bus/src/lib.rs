//! # warden-bus
//!
//! The command bus: Redis pub/sub plumbing and the fixed-header wire codec
//! used to fan list mutations out to every controller in a deployment.

pub mod channels;
pub mod codec;
pub mod pool;
pub mod publisher;
pub mod subscriber;

pub use channels::{SyncChannel, BAN_CHANNEL, VIP_CHANNEL};
pub use codec::{CodecError, Frame, HEADER_LEN};
pub use pool::{create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, SharedRedisPool};
pub use publisher::Publisher;
pub use subscriber::{
    ReceivedMessage, Subscriber, SubscriberConfig, SubscriberError, SubscriberResult,
};
