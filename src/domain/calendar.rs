//! Business-day calendar: Monday through Friday, no holiday calendar.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

pub fn is_business_day(date: NaiveDate) -> bool {
    !matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Number of business days `d` with `start < d <= end`; negative when `end < start`.
pub fn business_days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    if end < start {
        return -business_days_between(end, start);
    }
    let days = (end - start).num_days();
    let full_weeks = days / 7;
    let mut count = full_weeks * 5;
    for k in 1..=(days % 7) {
        if is_business_day(start + Duration::days(full_weeks * 7 + k)) {
            count += 1;
        }
    }
    count
}

/// The `count` business days strictly after `after`.
pub fn next_business_days(after: NaiveDate, count: usize) -> Vec<NaiveDate> {
    let mut dates = Vec::with_capacity(count);
    let mut current = after;
    while dates.len() < count {
        current += Duration::days(1);
        if is_business_day(current) {
            dates.push(current);
        }
    }
    dates
}
