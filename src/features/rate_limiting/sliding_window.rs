//! Sliding window limiter
//!
//! Keeps the timestamps of admitted requests per key and admits a new one
//! while fewer than `max_requests` fall inside the trailing `time_window`.
//! The window is exact: it is recomputed from `now` on every call.

use dashmap::DashMap;
use std::collections::VecDeque;
use std::time::{Duration, Instant};

use super::limiter::Limiter;

pub struct SlidingWindow {
    requests: DashMap<String, VecDeque<Instant>>,
    max_requests: usize,
    time_window: Duration,
}

impl SlidingWindow {
    pub fn new(max_requests: usize, time_window: Duration) -> Self {
        SlidingWindow {
            requests: DashMap::new(),
            max_requests,
            time_window,
        }
    }

    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn time_window(&self) -> Duration {
        self.time_window
    }

    /// Requests for `key` still inside the window, without recording one
    pub fn in_window(&self, key: &str) -> usize {
        let now = Instant::now();
        self.requests
            .get(key)
            .map(|entry| {
                entry
                    .iter()
                    .filter(|&&time| now.saturating_duration_since(time) < self.time_window)
                    .count()
            })
            .unwrap_or(0)
    }

    fn prune(&self, entry: &mut VecDeque<Instant>, now: Instant) {
        while let Some(&oldest) = entry.front() {
            if now.saturating_duration_since(oldest) < self.time_window {
                break;
            }
            entry.pop_front();
        }
    }
}

impl Limiter for SlidingWindow {
    fn allow(&self, key: &str) -> bool {
        let now = Instant::now();
        let mut entry = match self.requests.get_mut(key) {
            Some(entry) => entry,
            None => self.requests.entry(key.to_string()).or_default(),
        };

        self.prune(&mut entry, now);

        if entry.len() >= self.max_requests {
            false
        } else {
            entry.push_back(now);
            true
        }
    }

    fn reset(&self, key: &str) {
        self.requests.remove(key);
    }

    fn reset_all(&self) {
        self.requests.clear();
    }

    fn len(&self) -> usize {
        self.requests.len()
    }

    /// A key is evicted once its newest timestamp is outside both the window
    /// and `max_idle`, at which point it no longer counts against anything.
    fn sweep_idle(&self, max_idle: Duration) -> usize {
        let now = Instant::now();
        let horizon = self.time_window.max(max_idle);
        let mut evicted = 0;

        self.requests.retain(|_, entry| {
            let stale = entry
                .back()
                .map_or(true, |&newest| now.saturating_duration_since(newest) >= horizon);
            if stale {
                evicted += 1;
            }
            !stale
        });

        evicted
    }
}
