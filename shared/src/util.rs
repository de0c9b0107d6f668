//! Time utilities

use std::sync::atomic::{AtomicI64, Ordering};

/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Strictly increasing millisecond timestamp (process-local).
///
/// `created_at` stamps produced by this function are unique within one
/// server process, so `ORDER BY created_at` gives a deterministic
/// insertion order even for rows written in the same millisecond. The
/// FIFO settlement walk depends on that ordering.
pub fn monotonic_millis() -> i64 {
    static LAST: AtomicI64 = AtomicI64::new(0);
    let now = now_millis();
    // If the clock hasn't advanced past the last stamp, take last + 1
    loop {
        let last = LAST.load(Ordering::Acquire);
        let next = if now > last { now } else { last + 1 };
        if LAST
            .compare_exchange(last, next, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            return next;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monotonic_millis_strictly_increases() {
        let mut prev = monotonic_millis();
        for _ in 0..1000 {
            let next = monotonic_millis();
            assert!(next > prev);
            prev = next;
        }
    }
}
