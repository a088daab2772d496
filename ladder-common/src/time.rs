//! Timestamp utilities
//!
//! SQLite's `CURRENT_TIMESTAMP` stores UTC as `YYYY-MM-DD HH:MM:SS`; the
//! helpers here format cutoffs the same way so lexical comparison in SQL is
//! also chronological comparison.

use chrono::{DateTime, Duration, Utc};

/// Get current UTC timestamp
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Format a timestamp the way SQLite's `CURRENT_TIMESTAMP` does
pub fn sql_timestamp(t: DateTime<Utc>) -> String {
    t.format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Cutoff timestamp for pending-report reads: rows created before this are
/// treated as absent even if not yet physically purged.
pub fn ttl_cutoff(ttl_minutes: i64) -> String {
    sql_timestamp(now() - Duration::minutes(ttl_minutes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_timestamp_matches_sqlite_shape() {
        let s = sql_timestamp(now());
        // "2026-01-02 03:04:05"
        assert_eq!(s.len(), 19);
        assert_eq!(&s[4..5], "-");
        assert_eq!(&s[10..11], " ");
        assert_eq!(&s[13..14], ":");
    }

    #[test]
    fn cutoff_is_in_the_past() {
        let cutoff = ttl_cutoff(30);
        let current = sql_timestamp(now());
        assert!(cutoff < current);
    }

    #[test]
    fn zero_ttl_cutoff_is_now() {
        let cutoff = ttl_cutoff(0);
        let current = sql_timestamp(now());
        assert!(cutoff <= current);
    }
}
