//! Database row models
//!
//! Plain `FromRow` structs mirroring table columns. Conversions into domain
//! entities live here too; they are fallible because the sync-method column
//! is free text to PostgreSQL.

mod ban;
mod vip;

pub use ban::{BanListModel, BanRecordModel, BanRecordWithListModel};
pub use vip::{VipListModel, VipRecordModel, VipRecordWithListModel};

use warden_core::ServerMask;

/// Convert a nullable mask column (stored as BIGINT) into the domain type.
pub(crate) fn mask_from_column(value: Option<i64>) -> Option<ServerMask> {
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    value.map(|bits| ServerMask::from_bits(bits as u32))
}

/// Convert a domain mask into its nullable column representation.
pub(crate) fn mask_to_column(mask: Option<ServerMask>) -> Option<i64> {
    mask.map(|m| i64::from(m.bits()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_column_round_trip() {
        let mask = Some(ServerMask::from_servers([1, 17, 32]));
        assert_eq!(mask_from_column(mask_to_column(mask)), mask);
        assert_eq!(mask_from_column(None), None);
        assert_eq!(mask_to_column(None), None);
    }

    #[test]
    fn test_high_bit_survives_column_type() {
        // Bit 31 (server 32) must not be mangled by the i64 round trip.
        let mask = Some(ServerMask::from_bits(u32::MAX));
        assert_eq!(mask_from_column(mask_to_column(mask)), mask);
    }
}
