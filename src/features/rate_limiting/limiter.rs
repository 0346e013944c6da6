use std::time::Duration;

/// A stateful, per-key admission check
///
/// Implementations keep their state behind interior synchronization so a
/// single instance can be shared across every in-flight dispatch.
pub trait Limiter: Send + Sync {
    /// Admit or reject one request for `key`, recording it when admitted.
    fn allow(&self, key: &str) -> bool;

    /// Forget everything about `key`; the next call starts fresh.
    fn reset(&self, key: &str);

    fn reset_all(&self);

    /// Number of keys currently holding state
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop keys untouched for at least `max_idle` whose eviction cannot change
    /// a future decision. Returns how many keys were removed.
    fn sweep_idle(&self, max_idle: Duration) -> usize;
}
