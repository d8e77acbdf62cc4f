//! Command dispatch loops
//!
//! One long-lived loop per list family. Each loop blocks on the next bus
//! message, decodes it, discards frames not addressed to this controller's
//! server, and routes the typed command to its handler. The loop is the
//! outermost failure boundary of the pipeline: a decode failure or a handler
//! error is logged and the loop moves on to the next message - it never
//! terminates on a bad message. Handling is strictly sequential within one
//! loop; the two family loops run concurrently.

use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use warden_bus::{Frame, ReceivedMessage, Subscriber, SyncChannel};

use crate::commands::{BanCommand, VipCommand};
use crate::context::SyncContext;
use crate::handlers::{BanCommandHandler, VipCommandHandler};

/// Spawn one dispatch loop per family; the handles live for the process
/// lifetime.
pub fn spawn_dispatch_loops(
    ctx: Arc<SyncContext>,
    subscriber: &Subscriber,
) -> Vec<JoinHandle<()>> {
    vec![
        tokio::spawn(ban_loop(ctx.clone(), subscriber.receiver())),
        tokio::spawn(vip_loop(ctx, subscriber.receiver())),
    ]
}

async fn ban_loop(ctx: Arc<SyncContext>, mut rx: broadcast::Receiver<ReceivedMessage>) {
    info!(server = ctx.server_number(), "Ban command loop started");

    loop {
        let Some(frame) = next_frame(&mut rx, SyncChannel::Ban, &ctx).await else {
            break;
        };

        let command = match BanCommand::from_frame(&frame) {
            Ok(command) => command,
            Err(e) => {
                warn!(
                    command_id = frame.command_id,
                    error = %e,
                    "Dropping undecodable ban command"
                );
                continue;
            }
        };

        let name = command.name();
        if let Err(e) = BanCommandHandler::new(&ctx).handle(command).await {
            error!(
                command = name,
                command_id = frame.command_id,
                payload = %String::from_utf8_lossy(&frame.body),
                error = %e,
                "Ban command handler failed; state heals on next resync"
            );
        }
    }

    warn!("Ban command loop ended");
}

async fn vip_loop(ctx: Arc<SyncContext>, mut rx: broadcast::Receiver<ReceivedMessage>) {
    info!(server = ctx.server_number(), "VIP command loop started");

    loop {
        let Some(frame) = next_frame(&mut rx, SyncChannel::Vip, &ctx).await else {
            break;
        };

        let command = match VipCommand::from_frame(&frame) {
            Ok(command) => command,
            Err(e) => {
                warn!(
                    command_id = frame.command_id,
                    error = %e,
                    "Dropping undecodable VIP command"
                );
                continue;
            }
        };

        if let Err(e) = VipCommandHandler::new(&ctx).handle(command).await {
            error!(
                command = command.name(),
                command_id = frame.command_id,
                error = %e,
                "VIP command handler failed; state heals on next resync"
            );
        }
    }

    warn!("VIP command loop ended");
}

/// Block until the next decodable frame addressed to this controller on the
/// given channel. Returns `None` only when the bus fan-out is closed.
async fn next_frame(
    rx: &mut broadcast::Receiver<ReceivedMessage>,
    channel: SyncChannel,
    ctx: &SyncContext,
) -> Option<Frame> {
    loop {
        let msg = match rx.recv().await {
            Ok(msg) => msg,
            Err(broadcast::error::RecvError::Lagged(n)) => {
                warn!(channel = %channel, lagged = n, "Dispatch loop lagged; messages dropped");
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        };

        if msg.channel != channel.name() {
            continue;
        }

        let frame = match Frame::decode(&msg.payload) {
            Ok(frame) => frame,
            Err(e) => {
                warn!(channel = %channel, error = %e, "Dropping undecodable bus message");
                continue;
            }
        };

        // Not addressed to this server: silent discard.
        if !frame.targets(ctx.server_number()) {
            continue;
        }

        return Some(frame);
    }
}
