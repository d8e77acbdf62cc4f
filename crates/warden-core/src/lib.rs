//! # warden-core
//!
//! Domain layer containing list/record entities, value objects, the priority
//! resolver, and the ports (repository and game-client traits) the rest of the
//! workspace implements. This crate has zero dependencies on infrastructure
//! (database, Redis, game-server protocol).

pub mod ban_state;
pub mod entities;
pub mod error;
pub mod priority;
pub mod snapshot;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use ban_state::BanState;
pub use entities::{
    BanList, BanRecord, BanSyncMethod, NewBanList, NewBanRecord, NewVipList, NewVipRecord,
    VipList, VipRecord, VipSyncMethod, DEFAULT_LIST_ID,
};
pub use error::DomainError;
pub use priority::{higher, outranks, top_record, RecordPriority};
pub use snapshot::RecordSnapshot;
pub use traits::{
    BanListStore, GameClient, GameClientError, GameResult, Page, RecordSearch, RepoResult,
    VipEntry, VipListStore,
};
pub use value_objects::{notify_mask, ServerMask};
