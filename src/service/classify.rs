use chrono::{DateTime, Utc};

use crate::model::{Bucket, FeedEntry};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub ongoing: Vec<FeedEntry>,
    pub scheduled: Vec<FeedEntry>,
}

impl Classified {
    pub fn truncate(&mut self, limit: usize) {
        self.ongoing.truncate(limit);
        self.scheduled.truncate(limit);
    }
}

/// Date-window rule, first match wins:
/// 1. inside `[published, maintenance_end]` is ongoing
/// 2. no end date and published on today's UTC date is ongoing
/// 3. both dates still in the future is scheduled
pub fn bucket_for(entry: &FeedEntry, now: DateTime<Utc>) -> Bucket {
    match (entry.published_at, entry.maintenance_end_at) {
        (Some(published), Some(end)) if published <= now && now <= end => Bucket::Ongoing,
        (Some(published), None) if published.date_naive() == now.date_naive() => Bucket::Ongoing,
        (Some(published), Some(end)) if now < published && now < end => Bucket::Scheduled,
        _ => Bucket::Unclassified,
    }
}

pub fn classify(entries: &[FeedEntry], now: DateTime<Utc>) -> Classified {
    let mut out = Classified::default();
    for entry in entries {
        match bucket_for(entry, now) {
            Bucket::Ongoing => out.ongoing.push(entry.clone()),
            Bucket::Scheduled => out.scheduled.push(entry.clone()),
            Bucket::Unclassified => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn entry(
        title: &str,
        published_at: Option<DateTime<Utc>>,
        maintenance_end_at: Option<DateTime<Utc>>,
    ) -> FeedEntry {
        FeedEntry {
            title: title.to_string(),
            published_raw: String::new(),
            published_at,
            maintenance_end_at,
            description: String::new(),
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn inside_maintenance_window_is_ongoing() {
        let now = now();
        let e = entry("w", Some(now - Duration::hours(1)), Some(now + Duration::hours(1)));
        assert_eq!(bucket_for(&e, now), Bucket::Ongoing);

        let edge = entry("edge", Some(now), Some(now));
        assert_eq!(bucket_for(&edge, now), Bucket::Ongoing);
    }

    #[test]
    fn same_utc_day_without_end_is_ongoing() {
        let now = now();
        let early = Utc.with_ymd_and_hms(2025, 1, 16, 0, 5, 0).unwrap();
        assert_eq!(bucket_for(&entry("a", Some(early), None), now), Bucket::Ongoing);

        let late_today = Utc.with_ymd_and_hms(2025, 1, 16, 23, 59, 0).unwrap();
        assert_eq!(bucket_for(&entry("b", Some(late_today), None), now), Bucket::Ongoing);

        let yesterday = Utc.with_ymd_and_hms(2025, 1, 15, 23, 59, 59).unwrap();
        assert_eq!(
            bucket_for(&entry("c", Some(yesterday), None), now),
            Bucket::Unclassified
        );
    }

    #[test]
    fn same_day_uses_utc_date_not_feed_offset() {
        use crate::fetcher::parse::parse_timestamp;

        let now = now();
        // 16 Jan locally, 17 Jan in UTC
        let next_utc_day = parse_timestamp("Thu, 16 Jan 2025 23:30:00 -0100");
        assert_eq!(
            bucket_for(&entry("late", next_utc_day, None), now),
            Bucket::Unclassified
        );

        // 17 Jan locally, 16 Jan in UTC
        let same_utc_day = parse_timestamp("Fri, 17 Jan 2025 00:30:00 +0100");
        assert_eq!(
            bucket_for(&entry("early", same_utc_day, None), now),
            Bucket::Ongoing
        );
    }

    #[test]
    fn future_window_is_scheduled() {
        let now = now();
        let e = entry("s", Some(now + Duration::days(2)), Some(now + Duration::days(3)));
        assert_eq!(bucket_for(&e, now), Bucket::Scheduled);
    }

    #[test]
    fn past_window_and_missing_dates_are_unclassified() {
        let now = now();
        let past = entry("p", Some(now - Duration::days(3)), Some(now - Duration::days(2)));
        assert_eq!(bucket_for(&past, now), Bucket::Unclassified);
        assert_eq!(bucket_for(&entry("n", None, None), now), Bucket::Unclassified);
        assert_eq!(
            bucket_for(&entry("e", None, Some(now + Duration::hours(1))), now),
            Bucket::Unclassified
        );
    }

    #[test]
    fn classify_keeps_relative_order() {
        let now = now();
        let entries = vec![
            entry("s1", Some(now + Duration::days(1)), Some(now + Duration::days(2))),
            entry("o1", Some(now - Duration::hours(2)), None),
            entry("x", None, None),
            entry("o2", Some(now - Duration::hours(1)), Some(now + Duration::hours(1))),
            entry("s2", Some(now + Duration::days(5)), Some(now + Duration::days(6))),
        ];
        let mut classified = classify(&entries, now);
        let titles = |items: &[FeedEntry]| items.iter().map(|e| e.title.clone()).collect::<Vec<_>>();
        assert_eq!(titles(&classified.ongoing), vec!["o1", "o2"]);
        assert_eq!(titles(&classified.scheduled), vec!["s1", "s2"]);

        classified.truncate(1);
        assert_eq!(titles(&classified.ongoing), vec!["o1"]);
        assert_eq!(titles(&classified.scheduled), vec!["s1"]);
    }
}
