//! Typed bus commands, one closed enum per list family
//!
//! Each family owns a small sequential command-id space. Ids only need to be
//! consistent across the controllers of one deployment; adding a variant
//! without wiring it into the frame codecs and the dispatcher is a compile
//! error, which is the point of the closed enums.

mod ban;
mod vip;

pub use ban::BanCommand;
pub use vip::VipCommand;
