/// Configures HTTP timeout and retry behavior.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Total number of delivery attempts per call, including the first.
    ///
    /// A value of `0` is treated as `1`.
    pub max_attempts: usize,
    /// Backoff before the first retry, doubled for every further retry.
    pub retry_backoff_ms: u64,
    /// Upper bound for the un-jittered backoff.
    pub max_backoff_ms: u64,
    /// Seed for the jitter generator. `None` draws from OS entropy per call.
    pub jitter_seed: Option<u64>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 60_000,
            max_attempts: 3,
            retry_backoff_ms: 100,
            max_backoff_ms: 5_000,
            jitter_seed: None,
        }
    }
}
