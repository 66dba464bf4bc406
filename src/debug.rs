//! Lifecycle counters and a short log of recent forest events

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// Track tree lifecycle events across every forest in the process
pub static SEEDS: AtomicU64 = AtomicU64::new(0);
pub static BIRTHS: AtomicU64 = AtomicU64::new(0);
pub static DEATHS: AtomicU64 = AtomicU64::new(0);
pub static CLEARINGS: AtomicU64 = AtomicU64::new(0);

/// Recent events log (circular buffer)
static EVENTS: Mutex<Option<VecDeque<String>>> = Mutex::new(None);
const MAX_EVENTS: usize = 100;

/// Initialize the event log
pub fn init() {
    if let Ok(mut events) = EVENTS.lock() {
        *events = Some(VecDeque::with_capacity(MAX_EVENTS));
    }
    tracing::debug!("event log initialized");
}

/// Record an event; also forwarded to `tracing` at debug level
pub fn log_event(msg: impl AsRef<str>) {
    if let Ok(mut events) = EVENTS.lock() {
        if let Some(queue) = events.as_mut() {
            if queue.len() >= MAX_EVENTS {
                queue.pop_front();
            }
            queue.push_back(msg.as_ref().to_string());
        }
    }

    tracing::debug!("{}", msg.as_ref());
}

/// Get recent events for display, oldest first
pub fn get_recent_events(count: usize) -> Vec<String> {
    if let Ok(events) = EVENTS.lock() {
        if let Some(queue) = events.as_ref() {
            return queue.iter().rev().take(count).rev().cloned().collect();
        }
    }
    Vec::new()
}

/// Print statistics summary
pub fn print_stats() {
    println!("\n=== Forest Statistics ===");
    println!("Seeds: {}", SEEDS.load(Ordering::Relaxed));
    println!("Births: {}", BIRTHS.load(Ordering::Relaxed));
    println!("Deaths: {}", DEATHS.load(Ordering::Relaxed));
    println!("Clearings: {}", CLEARINGS.load(Ordering::Relaxed));
    println!("=========================\n");
}

/// Reset all counters
pub fn reset_stats() {
    SEEDS.store(0, Ordering::Relaxed);
    BIRTHS.store(0, Ordering::Relaxed);
    DEATHS.store(0, Ordering::Relaxed);
    CLEARINGS.store(0, Ordering::Relaxed);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_keeps_most_recent() {
        init();
        for i in 0..(MAX_EVENTS + 10) {
            log_event(format!("event {i}"));
        }
        let recent = get_recent_events(3);
        assert!(recent.len() <= 3);
        // other tests may log concurrently, so only check what is certain
        assert!(get_recent_events(MAX_EVENTS * 2).len() <= MAX_EVENTS);
    }

    #[test]
    fn test_reset_stats_zeroes_counters() {
        BIRTHS.store(1_000_000_000, Ordering::Relaxed);
        CLEARINGS.store(1_000_000_000, Ordering::Relaxed);
        reset_stats();
        // concurrent forests only add small amounts
        assert!(BIRTHS.load(Ordering::Relaxed) < 1_000_000);
        assert!(CLEARINGS.load(Ordering::Relaxed) < 1_000_000);
    }
}
