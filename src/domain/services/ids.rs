#[cfg(test)]
#[path = "ids_test.rs"]
mod tests;

use std::cmp;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use chrono::Utc;

/// Largest id that can come from `timestamp_millis`.
const MAX_OBSERVED_ID: u64 = i64::MAX as u64;

/// Hands out ids made of wall clock milliseconds. Ids never repeat: when two
/// are requested within the same millisecond, or the clock steps backwards,
/// the next id is the previous one plus one.
#[derive(Debug, Default)]
pub struct IdGenerator {
    last: AtomicU64,
}

impl IdGenerator {
    pub fn new() -> IdGenerator {
        return IdGenerator::default();
    }

    /// Makes sure later ids sort after `id`. Ids that are not numeric, or
    /// too large to be a millisecond timestamp, are ignored.
    pub fn observe(&self, id: &str) {
        if let Ok(value) = id.parse::<u64>() {
            if value > MAX_OBSERVED_ID {
                tracing::warn!(id, "Ignoring id outside the timestamp range");
                return;
            }
            self.last.fetch_max(value, Ordering::SeqCst);
        }
    }

    pub fn next_id(&self) -> String {
        let now = cmp::max(Utc::now().timestamp_millis(), 0) as u64;
        return self.next_after(now).to_string();
    }

    fn next_after(&self, now: u64) -> u64 {
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                return Some(cmp::max(now, last.saturating_add(1)));
            })
            .unwrap_or_else(|last| return last);

        return cmp::max(now, previous.saturating_add(1));
    }
}
