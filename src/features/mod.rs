//! # Features Layer
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

pub mod rate_limiting;

pub use rate_limiting::{
    CompositeLimiter, Limiter, RateLimitConfig, RateLimitManager, SlidingWindow, TokenBucket,
};
