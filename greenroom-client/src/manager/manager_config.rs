use std::time::Duration;

#[derive(Clone)]
pub struct ManagerConfig {
    /// Relay poll cadence.
    pub poll_interval: Duration,

    /// Automatic reconnects before a link is declared failed.
    pub max_reconnect_attempts: u32,

    /// Backoff grows linearly: `reconnect_step × attempt`.
    pub reconnect_step: Duration,
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_reconnect_attempts: 3,
            reconnect_step: Duration::from_millis(2000),
        }
    }
}
