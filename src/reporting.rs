//! Money arithmetic plus the time windows and filters behind the influencer analytics.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use uuid::Uuid;

/// Highest unit price a product may carry, in minor units.
pub const MAX_PRICE: i64 = 1_000_000_000_000;
/// Highest quantity of a single product per cart line.
pub const MAX_QUANTITY: i32 = 10_000;

/// `price × quantity`, or `None` when it does not fit in an `i64`.
pub fn line_total(price: i64, quantity: i32) -> Option<i64> {
    price.checked_mul(i64::from(quantity))
}

/// Sum of `price × quantity` over `lines`, or `None` on overflow.
pub fn checked_total<I>(lines: I) -> Option<i64>
where
    I: IntoIterator<Item = (i64, i32)>,
{
    lines
        .into_iter()
        .try_fold(0i64, |acc, (price, quantity)| acc.checked_add(line_total(price, quantity)?))
}

/// Formats minor currency units with two decimals and thousands separators.
pub fn format_amount(minor: i64) -> String {
    let sign = if minor < 0 { "-" } else { "" };
    let abs = minor.unsigned_abs();
    let whole = (abs / 100).to_string();
    let cents = abs % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    format!("{sign}{grouped}.{cents:02}")
}

pub fn start_of_day(now: DateTime<Utc>) -> DateTime<Utc> {
    now.date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or(now)
}

pub fn start_of_month(now: DateTime<Utc>) -> DateTime<Utc> {
    month_bounds(now.month(), now.year())
        .map(|(start, _)| start)
        .unwrap_or(now)
}

/// Half-open `[start, end)` range covering the given calendar month.
pub fn month_bounds(month: u32, year: i32) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
    let start = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year.checked_add(1)?, 1)
    } else {
        (year, month + 1)
    };
    let end = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    Some((
        start.and_hms_opt(0, 0, 0)?.and_utc(),
        end.and_hms_opt(0, 0, 0)?.and_utc(),
    ))
}

/// Lower bounds of the revenue windows shown on the sold-items report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindows {
    pub monthly_since: DateTime<Utc>,
    pub weekly_since: DateTime<Utc>,
    pub daily_since: DateTime<Utc>,
}

impl RevenueWindows {
    pub fn anchored_at(now: DateTime<Utc>) -> Self {
        Self {
            monthly_since: start_of_month(now),
            weekly_since: now - Duration::days(7),
            daily_since: start_of_day(now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoldFilter {
    Month {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    Product(Uuid),
}

impl SoldFilter {
    /// Parses the `filter_type`/`filter_value` pair. Anything malformed yields `None`
    /// and the report is shown unfiltered.
    pub fn parse(filter_type: Option<&str>, filter_value: Option<&str>) -> Option<Self> {
        let value = filter_value.map(str::trim).filter(|v| !v.is_empty())?;
        match filter_type.map(str::trim)? {
            "month" => {
                let (month, year) = value.split_once('-')?;
                let month = month.trim().parse::<u32>().ok()?;
                let year = year.trim().parse::<i32>().ok()?;
                let (start, end) = month_bounds(month, year)?;
                Some(SoldFilter::Month { start, end })
            }
            "product" => Uuid::parse_str(value).ok().map(SoldFilter::Product),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_amounts_with_grouping() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(5), "0.05");
        assert_eq!(format_amount(99_999), "999.99");
        assert_eq!(format_amount(100_000), "1,000.00");
        assert_eq!(format_amount(123_456_789), "1,234,567.89");
        assert_eq!(format_amount(-250_050), "-2,500.50");
    }

    #[test]
    fn totals_stop_at_overflow() {
        assert_eq!(line_total(1_250, 4), Some(5_000));
        assert_eq!(line_total(i64::MAX / 2 + 1, 2), None);
        assert_eq!(checked_total([(1_000, 3), (250, 2)]), Some(3_500));
        assert_eq!(checked_total([(i64::MAX, 1), (1, 1)]), None);
        assert_eq!(checked_total(Vec::new()), Some(0));
        assert!(line_total(MAX_PRICE, MAX_QUANTITY).is_some());
    }

    #[test]
    fn windows_are_anchored_to_now() {
        let now = Utc.with_ymd_and_hms(2025, 3, 18, 15, 30, 0).unwrap();
        let windows = RevenueWindows::anchored_at(now);
        assert_eq!(windows.monthly_since, Utc.with_ymd_and_hms(2025, 3, 1, 0, 0, 0).unwrap());
        assert_eq!(windows.weekly_since, Utc.with_ymd_and_hms(2025, 3, 11, 15, 30, 0).unwrap());
        assert_eq!(windows.daily_since, Utc.with_ymd_and_hms(2025, 3, 18, 0, 0, 0).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(12, 2024).unwrap();
        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 1, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn parses_month_filter() {
        let filter = SoldFilter::parse(Some("month"), Some("03-2025")).unwrap();
        let (start, end) = month_bounds(3, 2025).unwrap();
        assert_eq!(filter, SoldFilter::Month { start, end });
        assert!(SoldFilter::parse(Some("month"), Some("3-2025")).is_some());
    }

    #[test]
    fn malformed_filters_are_ignored() {
        assert_eq!(SoldFilter::parse(Some("month"), Some("2025-03")), None);
        assert_eq!(SoldFilter::parse(Some("month"), Some("13-2025")), None);
        assert_eq!(SoldFilter::parse(Some("month"), Some("abc")), None);
        assert_eq!(SoldFilter::parse(Some("product"), Some("42")), None);
        assert_eq!(SoldFilter::parse(Some("colour"), Some("red")), None);
        assert_eq!(SoldFilter::parse(Some("month"), Some("")), None);
        assert_eq!(SoldFilter::parse(None, Some("03-2025")), None);
    }

    #[test]
    fn parses_product_filter() {
        let id = Uuid::new_v4();
        assert_eq!(
            SoldFilter::parse(Some("product"), Some(&id.to_string())),
            Some(SoldFilter::Product(id))
        );
    }
}
