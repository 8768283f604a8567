use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock unix milliseconds for wire timestamps.
pub fn unix_ms_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
