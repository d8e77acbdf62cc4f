//! Server targeting bitmask
//!
//! A 32-bit set of game-server numbers. Server numbers are 1-based; server
//! `n` occupies bit `n - 1`. Lists store the mask as nullable, where a
//! missing mask means "applies to every server" - `effective` collapses that
//! convention into [`ServerMask::ALL`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::BitOr;

/// Set of game-server numbers a list or command applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServerMask(u32);

impl ServerMask {
    /// Mask targeting no server. Commands with this mask are never published.
    pub const EMPTY: Self = Self(0);

    /// Mask targeting every representable server.
    pub const ALL: Self = Self(u32::MAX);

    /// Highest valid server number.
    pub const MAX_SERVER: u8 = 32;

    /// Create a mask from raw bits.
    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get the raw bits.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Build a mask from a set of 1-based server numbers.
    ///
    /// Numbers outside `1..=32` are ignored.
    #[must_use]
    pub fn from_servers<I>(servers: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        let mut bits = 0u32;
        for n in servers {
            if (1..=Self::MAX_SERVER).contains(&n) {
                bits |= 1 << (n - 1);
            }
        }
        Self(bits)
    }

    /// Extract the set of 1-based server numbers, ascending.
    #[must_use]
    pub fn servers(self) -> Vec<u8> {
        (1..=Self::MAX_SERVER).filter(|&n| self.contains(n)).collect()
    }

    /// Whether server `n` is targeted by this mask.
    #[must_use]
    pub const fn contains(self, n: u8) -> bool {
        n >= 1 && n <= Self::MAX_SERVER && self.0 & (1 << (n - 1)) != 0
    }

    /// Whether no server is targeted.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Union of two masks.
    #[must_use]
    pub const fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    /// Collapse the nullable list-mask convention: `None` means all servers.
    #[must_use]
    pub fn effective(mask: Option<Self>) -> Self {
        mask.unwrap_or(Self::ALL)
    }
}

impl BitOr for ServerMask {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.union(rhs)
    }
}

impl fmt::Display for ServerMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if *self == Self::ALL {
            return write!(f, "all");
        }
        let servers: Vec<String> = self.servers().iter().map(u8::to_string).collect();
        write!(f, "[{}]", servers.join(","))
    }
}

/// Mask a list mutation must be announced with when the list's own mask
/// changes: controllers losing applicability and controllers gaining it both
/// need to hear about the edit. A `None` on either side widens to every
/// server.
#[must_use]
pub fn notify_mask(old: Option<ServerMask>, new: Option<ServerMask>) -> ServerMask {
    match (old, new) {
        (Some(old), Some(new)) => old | new,
        _ => ServerMask::ALL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_round_trip() {
        let servers = vec![1, 2, 7, 32];
        let mask = ServerMask::from_servers(servers.clone());
        assert_eq!(mask.servers(), servers);
    }

    #[test]
    fn test_bit_positions() {
        assert_eq!(ServerMask::from_servers([1]).bits(), 0b1);
        assert_eq!(ServerMask::from_servers([2]).bits(), 0b10);
        assert_eq!(ServerMask::from_servers([1, 3]).bits(), 0b101);
        assert_eq!(ServerMask::from_servers([32]).bits(), 1 << 31);
    }

    #[test]
    fn test_out_of_range_servers_ignored() {
        assert!(ServerMask::from_servers([0]).is_empty());
        assert!(ServerMask::from_servers([33]).is_empty());
        assert!(!ServerMask::from_servers([0, 5, 40]).is_empty());
        assert_eq!(ServerMask::from_servers([0, 5, 40]).servers(), vec![5]);
    }

    #[test]
    fn test_contains() {
        let mask = ServerMask::from_servers([2, 4]);
        assert!(mask.contains(2));
        assert!(mask.contains(4));
        assert!(!mask.contains(1));
        assert!(!mask.contains(3));
        assert!(!mask.contains(0));
        assert!(!mask.contains(33));
    }

    #[test]
    fn test_all_contains_every_server() {
        for n in 1..=32 {
            assert!(ServerMask::ALL.contains(n));
        }
    }

    #[test]
    fn test_effective() {
        assert_eq!(ServerMask::effective(None), ServerMask::ALL);
        let mask = ServerMask::from_servers([3]);
        assert_eq!(ServerMask::effective(Some(mask)), mask);
    }

    #[test]
    fn test_notify_mask_unions_old_and_new() {
        let old = ServerMask::from_servers([1, 2]);
        let new = ServerMask::from_servers([2, 3]);
        assert_eq!(notify_mask(Some(old), Some(new)), ServerMask::from_servers([1, 2, 3]));
    }

    #[test]
    fn test_notify_mask_widens_on_none() {
        let mask = ServerMask::from_servers([1]);
        assert_eq!(notify_mask(None, Some(mask)), ServerMask::ALL);
        assert_eq!(notify_mask(Some(mask), None), ServerMask::ALL);
        assert_eq!(notify_mask(None, None), ServerMask::ALL);
    }

    #[test]
    fn test_display() {
        assert_eq!(ServerMask::ALL.to_string(), "all");
        assert_eq!(ServerMask::from_servers([1, 4]).to_string(), "[1,4]");
        assert_eq!(ServerMask::EMPTY.to_string(), "[]");
    }
}
