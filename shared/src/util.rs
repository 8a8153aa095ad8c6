/// Current Unix timestamp in milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a new random resource ID (UUID v4, hyphenated)
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
