//! Controller wiring
//!
//! Builds the pools, repositories, game client, and context, then runs the
//! dispatch loops and the expiry sweeper for the process lifetime.

use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use warden_bus::{Publisher, RedisPool, Subscriber, SubscriberConfig, BAN_CHANNEL, VIP_CHANNEL};
use warden_common::AppConfig;
use warden_db::{PgBanListStore, PgVipListStore};
use warden_rcon::{CachedGameClient, RconClient, RconClientConfig};
use warden_sync::{spawn_dispatch_loops, ExpirySweeper, SyncContextBuilder};

/// Run the controller until process shutdown.
pub async fn run(config: AppConfig) -> anyhow::Result<()> {
    let pool = warden_db::create_pool_from_config(&config.database).await?;
    warden_db::MIGRATOR.run(&pool).await?;
    info!("Database ready");

    let redis_pool = RedisPool::from_config(&config.redis)?;
    redis_pool.health_check().await?;
    let publisher = Publisher::new(redis_pool);

    let rcon = RconClient::new(RconClientConfig::from(&config.rcon));
    let game = CachedGameClient::new(
        rcon,
        Duration::from_secs(config.rcon.online_cache_ttl_secs),
    );

    let ctx = Arc::new(
        SyncContextBuilder::new()
            .server_number(config.controller.server_number)
            .ban_store(Arc::new(PgBanListStore::new(pool.clone())))
            .vip_store(Arc::new(PgVipListStore::new(pool)))
            .game(Arc::new(game))
            .bus(Arc::new(publisher))
            .build()?,
    );

    let subscriber = Subscriber::spawn(SubscriberConfig {
        redis_url: config.redis.url.clone(),
        channels: vec![BAN_CHANNEL.to_string(), VIP_CHANNEL.to_string()],
        ..SubscriberConfig::default()
    });

    let _loops = spawn_dispatch_loops(ctx.clone(), &subscriber);
    let _sweeper =
        ExpirySweeper::new(ctx, Duration::from_secs(config.sweeper.interval_secs)).start();

    info!(
        server_number = config.controller.server_number,
        "Controller running; press Ctrl-C to stop"
    );

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");

    Ok(())
}
