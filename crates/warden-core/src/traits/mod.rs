//! Ports - traits the infrastructure layers implement

mod game_client;
mod repositories;

pub use game_client::{GameClient, GameClientError, GameResult, VipEntry};
pub use repositories::{BanListStore, Page, RecordSearch, RepoResult, VipListStore};
