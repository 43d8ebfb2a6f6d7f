//! Flowering-cycle date arithmetic.
//!
//! Every derived quantity is a pure function of the flowering start date and
//! the caller's notion of "today". Dates are naive calendar dates; there is no
//! time zone handling anywhere in the dashboard.

use chrono::{Datelike, Days, NaiveDate};
use serde::Serialize;

/// Length of the flowering stage in weeks.
pub const FLOWER_WEEKS: i64 = 9;

/// Date format used for every stored and displayed date.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date. Dates whose flowering cycle would run off the
/// end of the calendar are treated as unparseable.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .ok()
        .filter(|d| harvest_date(*d).is_some() && d.checked_sub_days(Days::new(6)).is_some())
}

/// Week of flower, 1-based and clamped to `1..=FLOWER_WEEKS`.
///
/// Uses floor division, so a flowering date in the future clamps to week 1.
pub fn flower_week(flower: NaiveDate, today: NaiveDate) -> u32 {
    let days = (today - flower).num_days();
    (days.div_euclid(7) + 1).clamp(1, FLOWER_WEEKS) as u32
}

/// Projected harvest date. Independent of week clamping; `None` only when
/// it falls past the last representable date.
pub fn harvest_date(flower: NaiveDate) -> Option<NaiveDate> {
    flower.checked_add_days(Days::new(FLOWER_WEEKS as u64 * 7))
}

/// Signed days until harvest; negative once harvest has passed.
pub fn days_remaining(flower: NaiveDate, today: NaiveDate) -> Option<i64> {
    harvest_date(flower).map(|h| (h - today).num_days())
}

/// Floor a date to the Monday of its week. Saturates at the first
/// representable date.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let back = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN)
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// Derived view of a flowering date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Projection {
    pub week: u32,
    pub harvest_date: Option<NaiveDate>,
    pub days_remaining: Option<i64>,
}

impl Projection {
    pub fn new(flower: NaiveDate, today: NaiveDate) -> Self {
        Self {
            week: flower_week(flower, today),
            harvest_date: harvest_date(flower),
            days_remaining: days_remaining(flower, today),
        }
    }

    /// Project from a raw stored string. Unparseable input yields week 1 with
    /// no harvest date rather than an error.
    pub fn from_str_date(flower: &str, today: NaiveDate) -> Self {
        match parse_date(flower) {
            Some(d) => Self::new(d, today),
            None => Self {
                week: 1,
                harvest_date: None,
                days_remaining: None,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn d(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn ten_days_in_is_week_two() {
        let today = d("2024-03-11");
        let flower = today - Duration::days(10);
        assert_eq!(flower_week(flower, today), 2);
    }

    #[test]
    fn week_follows_floor_formula_and_clamps() {
        let today = d("2024-06-01");
        for n in 0..120i64 {
            let flower = today - Duration::days(n);
            let expected = (n / 7 + 1).clamp(1, 9) as u32;
            assert_eq!(flower_week(flower, today), expected, "n = {n}");
        }
    }

    #[test]
    fn future_flower_date_clamps_to_week_one() {
        let today = d("2024-06-01");
        assert_eq!(flower_week(d("2024-06-20"), today), 1);
        assert_eq!(flower_week(d("2024-06-02"), today), 1);
    }

    #[test]
    fn harvest_is_always_sixty_three_days_out() {
        assert_eq!(harvest_date(d("2024-01-01")), Some(d("2024-03-04")));
        // well past the clamped week 9
        let flower = d("2023-01-01");
        assert_eq!((harvest_date(flower).unwrap() - flower).num_days(), 63);
    }

    #[test]
    fn days_remaining_goes_negative_after_harvest() {
        let flower = d("2024-01-01");
        assert_eq!(days_remaining(flower, d("2024-01-01")), Some(63));
        assert_eq!(days_remaining(flower, d("2024-03-04")), Some(0));
        assert_eq!(days_remaining(flower, d("2024-03-14")), Some(-10));
    }

    #[test]
    fn week_start_floors_to_monday() {
        // 2024-01-01 is a Monday
        assert_eq!(week_start(d("2024-01-01")), d("2024-01-01"));
        assert_eq!(week_start(d("2024-01-03")), d("2024-01-01"));
        assert_eq!(week_start(d("2024-01-07")), d("2024-01-01"));
        assert_eq!(week_start(d("2024-01-08")), d("2024-01-08"));
    }

    #[test]
    fn unparseable_date_defaults_to_week_one() {
        let p = Projection::from_str_date("next tuesday", d("2024-01-01"));
        assert_eq!(p.week, 1);
        assert!(p.harvest_date.is_none());
        assert!(p.days_remaining.is_none());
    }

    #[test]
    fn projection_trims_input() {
        let p = Projection::from_str_date(" 2024-01-01 ", d("2024-01-11"));
        assert_eq!(p.week, 2);
        assert_eq!(p.harvest_date, Some(d("2024-03-04")));
        assert_eq!(p.days_remaining, Some(53));
    }

    #[test]
    fn dates_at_the_calendar_edge_project_like_unparseable_ones() {
        let today = d("2024-01-01");
        assert_eq!(harvest_date(NaiveDate::MAX), None);
        assert_eq!(days_remaining(NaiveDate::MAX, today), None);
        assert_eq!(week_start(NaiveDate::MIN), NaiveDate::MIN);

        let max = NaiveDate::MAX.format(DATE_FORMAT).to_string();
        assert_eq!(parse_date(&max), None);
        let p = Projection::from_str_date(&max, today);
        assert_eq!(p.week, 1);
        assert!(p.harvest_date.is_none());
        assert!(p.days_remaining.is_none());

        let min = NaiveDate::MIN.format(DATE_FORMAT).to_string();
        assert_eq!(parse_date(&min), None);
    }
}
