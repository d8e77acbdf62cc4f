//! Admin services - the mutation surface exposed to callers
//!
//! Each operation is a thin wrapper: validate, mutate the store, then
//! publish the corresponding command with the mask of every server that must
//! hear about it. Invariant violations are returned synchronously and never
//! published; publish failures after a committed write are logged and left
//! to the periodic resync.

mod ban;
mod vip;

pub use ban::BanListService;
pub use vip::VipListService;
