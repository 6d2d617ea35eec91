use std::time::Duration;

/// Configuration shared by the runners.
///
/// # Examples
///
/// ```
/// use apiglue_runner::RunnerConfig;
///
/// let config = RunnerConfig::default();
/// assert_eq!(config.chunk_size, 10);
/// assert!(config.max_attempts.is_none());
/// ```
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Largest slice handed to one action invocation.
    pub chunk_size: usize,
    /// Fixed pause between consecutive requests.
    pub delay: Duration,
    /// Retry budget for predicate retries; `None` retries until accepted.
    pub max_attempts: Option<u32>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            chunk_size: 10,
            delay: Duration::from_millis(1000),
            max_attempts: None,
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }
}
