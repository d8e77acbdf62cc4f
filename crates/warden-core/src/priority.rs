//! Priority resolution between records covering the same player
//!
//! A player may hold several records at once, on the same list or different
//! lists; exactly one governs enforcement on a given server. The comparator
//! here is the single source of truth for that choice - every handler and
//! both engines resolve through it, which is what lets independent
//! controllers converge on the same answer from the same database snapshot.
//!
//! Ordering: an indefinite record outranks any expiring one; between two
//! expiring records the later expiry wins; equal expiries fall back to the
//! later creation time (the most recent edit wins, including two indefinite
//! records).

use chrono::{DateTime, Utc};

use crate::entities::{BanRecord, VipRecord};
use crate::snapshot::RecordSnapshot;

/// The two fields priority is decided on. Implemented by both record
/// families and by [`RecordSnapshot`], so historical snapshots can be ranked
/// against live rows.
pub trait RecordPriority {
    fn created_at(&self) -> DateTime<Utc>;
    fn expires_at(&self) -> Option<DateTime<Utc>>;
}

impl RecordPriority for BanRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl RecordPriority for VipRecord {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl RecordPriority for RecordSnapshot {
    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }
}

impl<T: RecordPriority> RecordPriority for &T {
    fn created_at(&self) -> DateTime<Utc> {
        (*self).created_at()
    }

    fn expires_at(&self) -> Option<DateTime<Utc>> {
        (*self).expires_at()
    }
}

/// Whether `a` strictly outranks `b`. With row-unique creation times exactly
/// one of `outranks(a, b)` / `outranks(b, a)` holds for distinct records.
pub fn outranks<A, B>(a: &A, b: &B) -> bool
where
    A: RecordPriority + ?Sized,
    B: RecordPriority + ?Sized,
{
    match (a.expires_at(), b.expires_at()) {
        (ea, eb) if ea == eb => a.created_at() > b.created_at(),
        (None, _) => true,
        (_, None) => false,
        (Some(ea), Some(eb)) => ea > eb,
    }
}

/// The higher-priority of two records. Ties (identical key fields) keep the
/// first argument, which only pins the fold's determinism.
pub fn higher<'a, R: RecordPriority + ?Sized>(a: &'a R, b: &'a R) -> &'a R {
    if outranks(b, a) {
        b
    } else {
        a
    }
}

/// Fold a set of records down to the one that governs enforcement.
pub fn top_record<R, I>(records: I) -> Option<R>
where
    R: RecordPriority,
    I: IntoIterator<Item = R>,
{
    records
        .into_iter()
        .reduce(|best, candidate| if outranks(&candidate, &best) { candidate } else { best })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[derive(Debug, Clone, PartialEq)]
    struct Key {
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    }

    impl RecordPriority for Key {
        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn expires_at(&self) -> Option<DateTime<Utc>> {
            self.expires_at
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn key(created_offset_secs: i64, expires_offset_days: Option<i64>) -> Key {
        Key {
            created_at: t0() + Duration::seconds(created_offset_secs),
            expires_at: expires_offset_days.map(|d| t0() + Duration::days(d)),
        }
    }

    #[test]
    fn test_indefinite_beats_any_expiring() {
        let indefinite = key(0, None);
        // Later expiry, later creation - still loses to indefinite.
        let expiring = key(100, Some(365_000));
        assert!(outranks(&indefinite, &expiring));
        assert!(!outranks(&expiring, &indefinite));
    }

    #[test]
    fn test_later_expiry_wins() {
        let short = key(50, Some(1));
        let long = key(0, Some(10));
        assert!(outranks(&long, &short));
        assert_eq!(higher(&long, &short), &long);
    }

    #[test]
    fn test_equal_expiry_later_creation_wins() {
        let early = key(0, Some(5));
        let late = key(10, Some(5));
        assert!(outranks(&late, &early));

        // Both indefinite: same rule.
        let early = key(0, None);
        let late = key(10, None);
        assert!(outranks(&late, &early));
    }

    #[test]
    fn test_totality() {
        let keys = [key(0, None), key(1, None), key(2, Some(5)), key(3, Some(5)), key(4, Some(9))];
        for (i, a) in keys.iter().enumerate() {
            for (j, b) in keys.iter().enumerate() {
                if i == j {
                    continue;
                }
                // Exactly one direction holds for distinct records.
                assert_ne!(outranks(a, b), outranks(b, a), "keys {i} and {j}");
            }
        }
    }

    #[test]
    fn test_transitivity() {
        let keys = [key(0, Some(1)), key(5, Some(3)), key(3, Some(3)), key(1, None), key(9, None)];
        for a in &keys {
            for b in &keys {
                for c in &keys {
                    if outranks(a, b) && outranks(b, c) {
                        assert!(outranks(a, c));
                    }
                }
            }
        }
    }

    #[test]
    fn test_top_record_fold() {
        let records = vec![key(0, Some(2)), key(1, None), key(2, Some(30))];
        let top = top_record(records.clone()).unwrap();
        assert_eq!(top, records[1]);

        assert!(top_record(Vec::<Key>::new()).is_none());
    }
}
