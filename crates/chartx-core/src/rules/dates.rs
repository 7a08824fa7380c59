use crate::model::operation::ColumnMap;
use chrono::NaiveDate;
use serde_json::Value;

/// Columns whose string values are normalised to `YYYY-MM-DD`
pub const DATE_COLUMNS: [&str; 4] = ["DOB", "start_date", "end_date", "surgery_date"];

/// Accepted input layouts, tried in order
const INPUT_FORMATS: [&str; 6] = [
    "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y", "%Y/%m/%d", "%d-%m-%Y", "%m-%d-%Y",
];

/// Parse a date in any accepted layout; ambiguous day/month reads day-first
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    INPUT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Rewrite known date columns in place; unparseable strings stay as given
pub fn normalize_date_columns(columns: &mut ColumnMap) {
    for column in DATE_COLUMNS {
        if let Some(Value::String(raw)) = columns.get_mut(column) {
            match normalize_date(raw) {
                Some(normalized) => *raw = normalized,
                None => tracing::debug!(column, "Left unparseable date value unchanged"),
            }
        }
    }
}
