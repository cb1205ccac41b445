use chrono::{Datelike, Duration, NaiveDate};

/// Fixed days-of-month on which appointments are offered. Placeholder
/// policy, not a capacity model; replace when real scheduling lands.
const OFFERED_DAYS: [u32; 5] = [10, 15, 20, 24, 28];

pub fn month_number(name: &str) -> Option<u32> {
    let number = match name.to_ascii_lowercase().as_str() {
        "january" => 1,
        "february" => 2,
        "march" => 3,
        "april" => 4,
        "may" => 5,
        "june" => 6,
        "july" => 7,
        "august" => 8,
        "september" => 9,
        "october" => 10,
        "november" => 11,
        "december" => 12,
        _ => return None,
    };
    Some(number)
}

/// Ascending dates within (year, month) that are not before `today` and fall
/// on an offered day, plus tomorrow when tomorrow is inside that month.
/// `today` is injected so callers and tests share one clock seam.
pub fn available_dates(year: i32, month: u32, today: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let tomorrow = today + Duration::days(1);

    for day in 1..=days_in_month(year, month) {
        let Some(date) = NaiveDate::from_ymd_opt(year, month, day) else {
            continue;
        };
        if date < today {
            continue;
        }
        if OFFERED_DAYS.contains(&day) || date == tomorrow {
            dates.push(date);
        }
    }
    dates
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let first_of_next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    first_of_next
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn month_names_parse_case_insensitively() {
        assert_eq!(month_number("march"), Some(3));
        assert_eq!(month_number("March"), Some(3));
        assert_eq!(month_number("DECEMBER"), Some(12));
        assert_eq!(month_number("marzo"), None);
        assert_eq!(month_number(""), None);
    }

    #[test]
    fn full_month_offers_fixed_days_plus_tomorrow() {
        let dates = available_dates(2025, 3, date(2025, 3, 1));
        let days: Vec<u32> = dates.iter().map(|d| d.day()).collect();
        assert_eq!(days, vec![2, 10, 15, 20, 24, 28]);
        assert!(dates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn past_dates_are_excluded() {
        let dates = available_dates(2025, 3, date(2025, 3, 16));
        let days: Vec<u32> = dates.iter().map(|d| d.day()).collect();
        // 10 and 15 are gone; the 17th appears as tomorrow.
        assert_eq!(days, vec![17, 20, 24, 28]);
    }

    #[test]
    fn tomorrow_counts_when_it_crosses_into_the_queried_month() {
        let dates = available_dates(2025, 3, date(2025, 2, 28));
        assert_eq!(dates[0], date(2025, 3, 1));
    }

    #[test]
    fn tomorrow_outside_the_queried_month_is_ignored() {
        let dates = available_dates(2025, 3, date(2025, 3, 31));
        assert!(dates.is_empty());
    }

    #[test]
    fn invalid_calendar_month_yields_nothing() {
        assert!(available_dates(2025, 13, date(2025, 3, 1)).is_empty());
    }
}
