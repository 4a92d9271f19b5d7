use std::time::Duration;

/// Saga tuning passed in at construction.
#[derive(Debug, Clone, Copy)]
pub struct SagaConfig {
    /// Upper bound on one stock finalize call. Expiry counts as an unknown
    /// outcome.
    pub stock_timeout: Duration,
    /// Age after which an attempt that never reached a final state is
    /// treated as faulted by the reconciler. Must comfortably exceed
    /// `stock_timeout`.
    pub abandon_after: Duration,
}

impl Default for SagaConfig {
    fn default() -> Self {
        Self {
            stock_timeout: Duration::from_millis(5000),
            abandon_after: Duration::from_secs(60),
        }
    }
}
