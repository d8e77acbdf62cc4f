//! Command handlers, one module per list family

mod ban;
mod vip;

pub use ban::BanCommandHandler;
pub use vip::VipCommandHandler;
