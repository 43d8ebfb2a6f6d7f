//! Clone-demand forecast.
//!
//! Every record is placed in a Monday-aligned "clone week" bucket: the week in
//! which clones must be started so that a replacement batch is ready when the
//! current one is harvested. Plant counts are summed per bucket and reported
//! with fixed safety buffers.

use crate::dates::{self, FLOWER_WEEKS};
use crate::records::Record;
use chrono::{Days, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;

/// Safety buffers applied on top of the raw plant count, in percent.
pub const BUFFERS: [i64; 4] = [5, 10, 15, 20];

pub const CSV_HEADER: [&str; 7] = [
    "clone_week",
    "harvest_week",
    "plants",
    "p5",
    "p10",
    "p15",
    "p20",
];

// ---------------------------------------------------------------------------
// Cutoff
// ---------------------------------------------------------------------------

/// Earliest bucket included in a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cutoff(NaiveDate);

impl Cutoff {
    /// Monday of the week `lookback_weeks` before `today`. A lookback of 0
    /// keeps the current week and everything after it.
    ///
    /// A lookback reaching past the start of the calendar admits everything.
    pub fn new(today: NaiveDate, lookback_weeks: u32) -> Self {
        let back = Days::new(u64::from(lookback_weeks) * 7);
        match today.checked_sub_days(back) {
            Some(anchor) => Self(dates::week_start(anchor)),
            None => Self::none(),
        }
    }

    /// No cutoff; every bucket is reported.
    pub fn none() -> Self {
        Self(NaiveDate::MIN)
    }

    pub fn date(self) -> NaiveDate {
        self.0
    }

    fn admits(self, bucket: NaiveDate) -> bool {
        bucket >= self.0
    }
}

// ---------------------------------------------------------------------------
// Rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastRow {
    pub clone_week: NaiveDate,
    pub harvest_week: NaiveDate,
    pub plants: i64,
    pub p5: i64,
    pub p10: i64,
    pub p15: i64,
    pub p20: i64,
}

impl ForecastRow {
    fn new(clone_week: NaiveDate, plants: i64) -> Self {
        let [p5, p10, p15, p20] = BUFFERS.map(|pct| buffered(plants, pct));
        Self {
            clone_week,
            harvest_week: clone_week
                .checked_add_days(Days::new(FLOWER_WEEKS as u64 * 7))
                .unwrap_or(NaiveDate::MAX),
            plants,
            p5,
            p10,
            p15,
            p20,
        }
    }

    pub fn csv_fields(&self) -> [String; 7] {
        [
            self.clone_week.to_string(),
            self.harvest_week.to_string(),
            self.plants.to_string(),
            self.p5.to_string(),
            self.p10.to_string(),
            self.p15.to_string(),
            self.p20.to_string(),
        ]
    }
}

/// A record contributing to a bucket, for the detailed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BucketRecord {
    pub id: i64,
    pub room: String,
    pub strain: String,
    pub plants: i64,
    pub flower_date: NaiveDate,
    pub harvest_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForecastBucket {
    #[serde(flatten)]
    pub row: ForecastRow,
    pub records: Vec<BucketRecord>,
}

/// `plants` scaled up by `pct` percent, rounded half away from zero and
/// saturating at the `i64` range.
pub fn buffered(plants: i64, pct: i64) -> i64 {
    let scaled = i128::from(plants) * (100 + i128::from(pct));
    let q = scaled / 100;
    let r = scaled % 100;
    let rounded = if r.abs() * 2 >= 100 {
        q + scaled.signum()
    } else {
        q
    };
    i64::try_from(rounded).unwrap_or(if rounded < 0 { i64::MIN } else { i64::MAX })
}

fn total(members: &[BucketRecord]) -> i64 {
    members.iter().fold(0i64, |acc, m| acc.saturating_add(m.plants))
}

/// Clone-start week for a flowering date.
///
/// Clones for the next cycle start one full cycle before harvest, which in
/// this fixed-length model lands on the flowering week itself.
pub fn clone_week(flower: NaiveDate) -> NaiveDate {
    let start = dates::harvest_date(flower)
        .and_then(|h| h.checked_sub_days(Days::new(FLOWER_WEEKS as u64 * 7)))
        .unwrap_or(flower);
    dates::week_start(start)
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

fn bucketize(records: &[Record], cutoff: Cutoff) -> BTreeMap<NaiveDate, Vec<BucketRecord>> {
    let mut buckets: BTreeMap<NaiveDate, Vec<BucketRecord>> = BTreeMap::new();
    for r in records {
        let Some(flower) = dates::parse_date(&r.flower_date) else {
            continue;
        };
        let Some(harvest_date) = dates::harvest_date(flower) else {
            continue;
        };
        let week = clone_week(flower);
        if !cutoff.admits(week) {
            continue;
        }
        buckets.entry(week).or_default().push(BucketRecord {
            id: r.id,
            room: r.room.clone(),
            strain: r.strain.clone(),
            plants: r.plants,
            flower_date: flower,
            harvest_date,
        });
    }
    buckets
}

/// Summary forecast, one row per clone week, ascending.
pub fn summarize(records: &[Record], cutoff: Cutoff) -> Vec<ForecastRow> {
    bucketize(records, cutoff)
        .into_iter()
        .map(|(week, members)| ForecastRow::new(week, total(&members)))
        .collect()
}

/// Detailed forecast: summary rows with their contributing records.
pub fn detail(records: &[Record], cutoff: Cutoff) -> Vec<ForecastBucket> {
    bucketize(records, cutoff)
        .into_iter()
        .map(|(week, members)| ForecastBucket {
            row: ForecastRow::new(week, total(&members)),
            records: members,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        dates::parse_date(s).unwrap()
    }

    fn rec(id: i64, flower: &str, plants: i64) -> Record {
        Record {
            id,
            room: format!("F{id}"),
            plants,
            strain: "Gelato".to_string(),
            flower_date: flower.to_string(),
        }
    }

    #[test]
    fn same_week_records_share_a_bucket() {
        let records = vec![rec(1, "2024-01-01", 10), rec(2, "2024-01-03", 5)];
        let rows = summarize(&records, Cutoff::none());
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.clone_week, d("2024-01-01"));
        assert_eq!(row.harvest_week, d("2024-03-04"));
        assert_eq!(row.plants, 15);
        assert_eq!(row.p5, 16);
        assert_eq!(row.p10, 17);
        assert_eq!(row.p15, 17);
        assert_eq!(row.p20, 18);
    }

    #[test]
    fn buckets_are_sorted_ascending() {
        let records = vec![
            rec(1, "2024-02-14", 4),
            rec(2, "2024-01-02", 6),
            rec(3, "2024-01-20", 8),
        ];
        let weeks: Vec<_> = summarize(&records, Cutoff::none())
            .into_iter()
            .map(|r| r.clone_week)
            .collect();
        assert_eq!(weeks, vec![d("2024-01-01"), d("2024-01-15"), d("2024-02-12")]);
    }

    #[test]
    fn cutoff_drops_earlier_buckets() {
        let records = vec![rec(1, "2024-01-01", 10), rec(2, "2024-01-10", 7)];
        // today is Wednesday 2024-01-10 → cutoff Monday 2024-01-08
        let rows = summarize(&records, Cutoff::new(d("2024-01-10"), 0));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plants, 7);
    }

    #[test]
    fn lookback_extends_the_window() {
        let records = vec![rec(1, "2024-01-01", 10), rec(2, "2024-01-10", 7)];
        let cutoff = Cutoff::new(d("2024-01-10"), 1);
        assert_eq!(cutoff.date(), d("2024-01-01"));
        assert_eq!(summarize(&records, cutoff).len(), 2);
    }

    #[test]
    fn unparseable_flower_dates_are_skipped() {
        let records = vec![rec(1, "soon", 10), rec(2, "2024-01-03", 5)];
        let rows = summarize(&records, Cutoff::none());
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].plants, 5);
    }

    #[test]
    fn buffered_rounds_half_away_from_zero() {
        assert_eq!(buffered(10, 5), 11); // 10.5
        assert_eq!(buffered(30, 5), 32); // 31.5
        assert_eq!(buffered(1, 20), 1); // 1.2
        assert_eq!(buffered(0, 20), 0);
        assert_eq!(buffered(-10, 5), -11);
    }

    #[test]
    fn detail_lists_contributing_records() {
        let records = vec![rec(1, "2024-01-01", 10), rec(2, "2024-01-03", 5)];
        let buckets = detail(&records, Cutoff::none());
        assert_eq!(buckets.len(), 1);
        let ids: Vec<i64> = buckets[0].records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(buckets[0].records[1].harvest_date, d("2024-03-06"));
    }

    #[test]
    fn huge_lookback_admits_every_bucket() {
        let records = vec![rec(1, "1999-01-04", 3), rec(2, "2024-01-10", 7)];
        let cutoff = Cutoff::new(d("2024-01-10"), u32::MAX);
        assert_eq!(cutoff, Cutoff::none());
        assert_eq!(summarize(&records, cutoff).len(), 2);
    }

    #[test]
    fn oversized_plant_counts_saturate_instead_of_overflowing() {
        assert_eq!(buffered(i64::MAX / 50, 20), 221_360_928_884_514_619);
        assert_eq!(buffered(i64::MAX, 20), i64::MAX);

        let records = vec![rec(1, "2024-01-01", i64::MAX), rec(2, "2024-01-02", 5)];
        let rows = summarize(&records, Cutoff::none());
        assert_eq!(rows[0].plants, i64::MAX);
        assert_eq!(rows[0].p20, i64::MAX);
    }
}
