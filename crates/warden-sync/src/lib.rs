//! # warden-sync
//!
//! The list-synchronization engine: typed bus commands per list family, the
//! per-controller dispatch loops, the ban enforcement and VIP reconciliation
//! engines, the expiry sweeper, and the admin services that mutate the store
//! and fan changes out over the bus.

pub mod commands;
pub mod context;
pub mod dispatch;
pub mod enforce;
pub mod error;
pub mod handlers;
pub mod reconcile;
pub mod services;
pub mod sweeper;

pub use commands::{BanCommand, VipCommand};
pub use context::{CommandBus, SyncContext, SyncContextBuilder};
pub use dispatch::spawn_dispatch_loops;
pub use enforce::BanEnforcer;
pub use error::{SyncError, SyncResult};
pub use handlers::{BanCommandHandler, VipCommandHandler};
pub use reconcile::{compute_diff, VipDiff, VipReconciler};
pub use services::{BanListService, VipListService};
pub use sweeper::ExpirySweeper;
