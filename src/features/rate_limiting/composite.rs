//! AND-combination of several limiters
//!
//! Sub-limiters are consulted in order and evaluation stops at the first
//! rejection. Limiters earlier in the list have already recorded the request
//! by then, so a veto from a later limiter still costs the earlier ones a
//! token or window slot. Put the cheapest-to-waste limiter first.

use std::sync::Arc;
use std::time::Duration;

use super::limiter::Limiter;

#[derive(Clone, Default)]
pub struct CompositeLimiter {
    limiters: Vec<Arc<dyn Limiter>>,
}

impl CompositeLimiter {
    pub fn new(limiters: Vec<Arc<dyn Limiter>>) -> Self {
        Self { limiters }
    }

    /// Append a limiter; it is consulted after every existing one
    pub fn with(mut self, limiter: Arc<dyn Limiter>) -> Self {
        self.limiters.push(limiter);
        self
    }
}

impl Limiter for CompositeLimiter {
    fn allow(&self, key: &str) -> bool {
        self.limiters.iter().all(|limiter| limiter.allow(key))
    }

    fn reset(&self, key: &str) {
        for limiter in &self.limiters {
            limiter.reset(key);
        }
    }

    fn reset_all(&self) {
        for limiter in &self.limiters {
            limiter.reset_all();
        }
    }

    /// Sum of keys held across all sub-limiters
    fn len(&self) -> usize {
        self.limiters.iter().map(|limiter| limiter.len()).sum()
    }

    fn sweep_idle(&self, max_idle: Duration) -> usize {
        self.limiters
            .iter()
            .map(|limiter| limiter.sweep_idle(max_idle))
            .sum()
    }
}
