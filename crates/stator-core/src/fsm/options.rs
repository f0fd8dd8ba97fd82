//! Per-call retry configuration and backoff functions.

use std::sync::Arc;
use std::time::Duration;

/// Backoff function: maps a zero-based attempt index to a wait duration.
pub type BackoffFn = Arc<dyn Fn(u32) -> Duration + Send + Sync>;

/// Retry configuration for a single `transition` invocation.
///
/// Scoped to that one call and never persisted on the entity. The default
/// is no retries and a zero wait.
#[derive(Clone)]
pub struct TransitionOptions {
    pub(crate) max_retries: u32,
    pub(crate) backoff: BackoffFn,
}

impl Default for TransitionOptions {
    fn default() -> Self {
        Self {
            max_retries: 0,
            backoff: Arc::new(|_| Duration::ZERO),
        }
    }
}

impl TransitionOptions {
    /// Options with no retries and a zero wait.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the maximum number of retries. Total attempts are
    /// `max_retries + 1`.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the backoff function consulted between attempts.
    pub fn with_backoff(
        mut self,
        backoff: impl Fn(u32) -> Duration + Send + Sync + 'static,
    ) -> Self {
        self.backoff = Arc::new(backoff);
        self
    }

    /// Configured maximum number of retries.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

impl std::fmt::Debug for TransitionOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransitionOptions")
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

/// Backoff that waits the same delay before every retry.
pub fn fixed_backoff(delay: Duration) -> impl Fn(u32) -> Duration + Send + Sync + 'static {
    move |_| delay
}

/// Exponential backoff: `base * multiplier^attempt`.
pub fn exponential_backoff(
    base: Duration,
    multiplier: f64,
) -> impl Fn(u32) -> Duration + Send + Sync + 'static {
    move |attempt| {
        let secs = base.as_secs_f64() * multiplier.powi(attempt as i32);
        Duration::from_secs_f64(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_retries_and_zero_wait() {
        let options = TransitionOptions::default();
        assert_eq!(options.max_retries, 0);
        assert_eq!((options.backoff)(0), Duration::ZERO);
        assert_eq!((options.backoff)(7), Duration::ZERO);
    }

    #[test]
    fn builder_sets_retries_and_backoff() {
        let options = TransitionOptions::new()
            .with_max_retries(3)
            .with_backoff(|attempt| Duration::from_millis(10 * (attempt as u64 + 1)));

        assert_eq!(options.max_retries(), 3);
        assert_eq!((options.backoff)(1), Duration::from_millis(20));
    }

    #[test]
    fn fixed_backoff_is_constant() {
        let backoff = fixed_backoff(Duration::from_millis(250));
        assert_eq!(backoff(0), Duration::from_millis(250));
        assert_eq!(backoff(9), Duration::from_millis(250));
    }

    #[test]
    fn exponential_backoff_doubles_per_attempt() {
        let backoff = exponential_backoff(Duration::from_secs(2), 2.0);
        assert_eq!(backoff(0), Duration::from_secs(2));
        assert_eq!(backoff(1), Duration::from_secs(4));
        assert_eq!(backoff(2), Duration::from_secs(8));
    }
}
