//! Résumé date strings (`YYYY-MM` / `YYYY-MM-DD`) rendered for display.

use chrono::NaiveDate;

pub const PRESENT: &str = "Present";

/// `"2020-01"` → `"Jan 2020"`. Strings that are not a year-month pass through unchanged.
pub fn short_month_year(date: &str) -> String {
    let date = date.trim();
    if date.is_empty() {
        return String::new();
    }
    let mut parts = date.splitn(3, '-');
    let (Some(year), Some(month)) = (parts.next(), parts.next()) else {
        return date.to_string();
    };
    let parsed = format!("{year}-{month}-01");
    match NaiveDate::parse_from_str(&parsed, "%Y-%m-%d") {
        Ok(d) => d.format("%b %Y").to_string(),
        Err(_) => date.to_string(),
    }
}

/// Work period, e.g. `"Jan 2020 - Mar 2022"`, or `"Jan 2020 - Present"` without an end date.
pub fn period(start: &str, end: &str) -> String {
    let end = if end.trim().is_empty() {
        PRESENT.to_string()
    } else {
        short_month_year(end)
    };
    format!("{} - {}", short_month_year(start), end)
}

/// Education year range from the first four characters of each date, e.g. `"2018/2022"`.
/// Missing dates leave their side empty (`"2020/"`).
pub fn year_range(start: &str, end: &str) -> String {
    format!("{}/{}", year_prefix(start), year_prefix(end))
}

fn year_prefix(date: &str) -> &str {
    match date.char_indices().nth(4) {
        Some((idx, _)) => &date[..idx],
        None => date,
    }
}
