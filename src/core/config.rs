//! Runtime configuration for a queue authority.

use std::env;

use super::constants::{DEFAULT_LOG_CAPACITY, ENV_LOG_CAPACITY, ENV_QUEUE_MAX_LENGTH};

/// Tunables for a queue authority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Maximum number of applied deltas retained for replay. Observers
    /// lagging further than this are served a snapshot.
    pub log_capacity: usize,

    /// Maximum queue length; `None` means unlimited. Appends against a
    /// full queue are rejected.
    pub max_length: Option<usize>,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            max_length: None,
        }
    }
}

impl QueueConfig {
    /// Create a configuration with the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of retained log entries.
    pub fn with_log_capacity(mut self, capacity: usize) -> Self {
        self.log_capacity = capacity;
        self
    }

    /// Cap the queue length.
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// Read overrides from the environment, falling back to the defaults.
    ///
    /// Unparsable values are ignored with a warning rather than failing
    /// startup.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(raw) = env::var(ENV_LOG_CAPACITY) {
            match raw.parse() {
                Ok(capacity) => config.log_capacity = capacity,
                Err(_) => log::warn!("ignoring unparsable {ENV_LOG_CAPACITY}={raw}"),
            }
        }

        if let Ok(raw) = env::var(ENV_QUEUE_MAX_LENGTH) {
            match raw.parse() {
                Ok(max) => config.max_length = Some(max),
                Err(_) => log::warn!("ignoring unparsable {ENV_QUEUE_MAX_LENGTH}={raw}"),
            }
        }

        config
    }
}
