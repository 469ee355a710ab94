use chrono::Utc;
use std::sync::atomic::{AtomicU64, Ordering};

/// 行 ID 生成器 (会话内单调递增)
///
/// 以毫秒时间戳为种子, 同一毫秒内的多次调用依次 +1, 生成的 ID
/// 在会话内严格递增, 不会重复.
#[derive(Debug, Default)]
pub struct LineIdGenerator {
    last: AtomicU64,
}

impl LineIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&self) -> String {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let prev = match self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(now.max(last + 1))
            }) {
            Ok(prev) | Err(prev) => prev,
        };
        now.max(prev + 1).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_ids_are_unique_in_burst() {
        let ids = LineIdGenerator::new();
        let seen: HashSet<String> = (0..1000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 1000);
    }

    #[test]
    fn test_ids_are_increasing() {
        let ids = LineIdGenerator::new();
        let a: u64 = ids.next_id().parse().unwrap();
        let b: u64 = ids.next_id().parse().unwrap();
        assert!(b > a);
    }
}
