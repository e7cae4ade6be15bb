/// Current UTC timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Current calendar year (UTC)
pub fn current_year() -> i32 {
    use chrono::Datelike;
    chrono::Utc::now().year()
}
