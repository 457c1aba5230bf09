use chrono::{DateTime, Utc};

/// Returns the current wall-clock time in UTC.
///
/// Pending requests are stamped with this value so that diagnostics can
/// report how long a call has been outstanding.
///
/// # Example:
/// ```rust
/// use hostrpc::utils::now;
/// let sent_at = now();
/// assert!(now() >= sent_at);
/// ```
pub fn now() -> DateTime<Utc> {
    Utc::now()
}

/// Milliseconds elapsed since `since`, clamped at zero when the clock moved
/// backwards.
pub fn elapsed_millis(since: DateTime<Utc>) -> u64 {
    (now() - since).num_milliseconds().max(0) as u64
}
