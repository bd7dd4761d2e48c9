use chrono::Utc;
use tokio::time::Instant;

pub fn now_i64() -> i64 {
    Utc::now().timestamp()
}

pub fn get_instant() -> Instant {
    Instant::now()
}

/// Single staleness rule shared by every provider: a token whose `exp` equals
/// the current second is still usable.
pub fn is_expired(exp_unix_ts: i64) -> bool {
    is_expired_at(exp_unix_ts, now_i64())
}

pub fn is_expired_at(exp_unix_ts: i64, now_unix_ts: i64) -> bool {
    now_unix_ts > exp_unix_ts
}
