//! # Rate Limiting Feature
//!
//! Per-key throttles for command senders. Two algorithms share the [`Limiter`]
//! trait: a burst-friendly token bucket and an exact sliding window. The
//! [`RateLimitManager`] composes one of each behind a single API.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod composite;
pub mod limiter;
pub mod manager;
pub mod sliding_window;
pub mod token_bucket;

pub use composite::CompositeLimiter;
pub use limiter::Limiter;
pub use manager::{RateLimitConfig, RateLimitManager};
pub use sliding_window::SlidingWindow;
pub use token_bucket::TokenBucket;
