//! Participation timeline: submissions grouped into hourly buckets.

use chrono::DateTime;
use log::debug;
use std::collections::BTreeMap;

use crate::config::{TimelineBucket, VoteRecord};

/// Groups the vote records by the start of their submission hour.
///
/// The representation is sparse: hours with no submissions get no bucket, so
/// consumers must tolerate gaps. Buckets come out sorted ascending by start
/// time. Truncation happens in UTC epoch seconds, which keeps the bucket key
/// total-ordered and independent of any local calendar.
pub(crate) fn bucket_by_hour(records: &[VoteRecord]) -> Vec<TimelineBucket> {
    let mut buckets: BTreeMap<i64, (u64, u64)> = BTreeMap::new();
    for record in records.iter() {
        let secs = record.submitted_at.timestamp();
        let start = secs - secs.rem_euclid(3600);
        let entry = buckets.entry(start).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += record.total_credits_used;
    }

    let mut res: Vec<TimelineBucket> = Vec::with_capacity(buckets.len());
    for (start, (vote_count, total_credits)) in buckets {
        match DateTime::from_timestamp(start, 0) {
            Some(bucket_start) => res.push(TimelineBucket {
                bucket_start,
                vote_count,
                total_credits,
            }),
            None => {
                debug!("bucket_by_hour: dropping unrepresentable bucket start {}", start);
            }
        }
    }
    res
}

#[cfg(test)]
mod tests {
    use super::bucket_by_hour;
    use crate::config::VoteRecord;
    use chrono::{TimeZone, Utc};
    use std::collections::BTreeMap;

    fn record(id: &str, total: u64, ts: chrono::DateTime<Utc>) -> VoteRecord {
        VoteRecord {
            id: id.to_string(),
            event_id: "ev1".to_string(),
            invite_code: format!("code-{}", id),
            allocations: BTreeMap::new(),
            total_credits_used: total,
            submitted_at: ts,
            ip_address: None,
        }
    }

    #[test]
    fn empty_input_yields_no_buckets() {
        assert!(bucket_by_hour(&[]).is_empty());
    }

    #[test]
    fn groups_by_hour_and_sums_credits() {
        let records = vec![
            record("v1", 100, Utc.with_ymd_and_hms(2024, 5, 1, 10, 5, 0).unwrap()),
            record("v2", 80, Utc.with_ymd_and_hms(2024, 5, 1, 10, 59, 59).unwrap()),
            record("v3", 20, Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()),
        ];
        let buckets = bucket_by_hour(&records);
        assert_eq!(buckets.len(), 2);
        assert_eq!(
            buckets[0].bucket_start,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );
        assert_eq!(buckets[0].vote_count, 2);
        assert_eq!(buckets[0].total_credits, 180);
        assert_eq!(
            buckets[1].bucket_start,
            Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(buckets[1].vote_count, 1);
        assert_eq!(buckets[1].total_credits, 20);
    }

    #[test]
    fn gaps_stay_implicit_and_order_is_ascending() {
        let records = vec![
            record("v1", 10, Utc.with_ymd_and_hms(2024, 5, 1, 23, 30, 0).unwrap()),
            record("v2", 10, Utc.with_ymd_and_hms(2024, 5, 3, 1, 0, 1).unwrap()),
            record("v3", 10, Utc.with_ymd_and_hms(2024, 5, 2, 7, 45, 0).unwrap()),
        ];
        let buckets = bucket_by_hour(&records);
        assert_eq!(buckets.len(), 3);
        for pair in buckets.windows(2) {
            assert!(pair[0].bucket_start < pair[1].bucket_start);
        }
    }

    #[test]
    fn no_two_buckets_share_an_hour() {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let records: Vec<VoteRecord> = (0..10i64)
            .map(|i| {
                record(
                    &format!("v{}", i),
                    5,
                    base + chrono::Duration::minutes(7 * i),
                )
            })
            .collect();
        let buckets = bucket_by_hour(&records);
        let starts: std::collections::HashSet<_> =
            buckets.iter().map(|b| b.bucket_start).collect();
        assert_eq!(starts.len(), buckets.len());
        let total: u64 = buckets.iter().map(|b| b.vote_count).sum();
        assert_eq!(total, 10);
    }
}
