use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use chorus_core::Post;

/// Number of posts published on one UTC calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: usize,
}

/// Post volume per day, ascending by date. Posts without a timestamp are ignored.
pub fn daily_counts(posts: &[Post]) -> Vec<DailyCount> {
    let mut by_day: BTreeMap<NaiveDate, usize> = BTreeMap::new();
    for ts in posts.iter().filter_map(|p| p.created_at) {
        *by_day.entry(ts.date_naive()).or_default() += 1;
    }
    by_day
        .into_iter()
        .map(|(date, count)| DailyCount { date, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post_at(secs: Option<i64>) -> Post {
        Post::new("p", "a", secs.and_then(|s| Utc.timestamp_opt(s, 0).single()), "t", "")
    }

    #[test]
    fn counts_per_day_in_date_order() {
        // 2024-03-02 10:00, 2024-03-01 00:00, 2024-03-01 23:59:59, no timestamp
        let posts = vec![
            post_at(Some(1_709_373_600)),
            post_at(Some(1_709_251_200)),
            post_at(Some(1_709_337_599)),
            post_at(None),
        ];
        let series = daily_counts(&posts);
        assert_eq!(
            series,
            vec![
                DailyCount { date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), count: 2 },
                DailyCount { date: NaiveDate::from_ymd_opt(2024, 3, 2).unwrap(), count: 1 },
            ]
        );
    }

    #[test]
    fn serializes_date_as_iso() {
        let series = daily_counts(&[post_at(Some(0))]);
        let json = serde_json::to_value(&series).unwrap();
        assert_eq!(json[0]["date"], "1970-01-01");
        assert_eq!(json[0]["count"], 1);
    }
}
