use chrono::NaiveDate;

/// `"15 Mar 2025"`, or a dash when the backend sent no date.
#[must_use]
pub fn format_date(value: Option<NaiveDate>) -> String {
    value.map_or_else(|| "-".to_string(), |date| date.format("%d %b %Y").to_string())
}
