use crate::infrastructure::relay_client::RetryPolicy;
use instant::Duration;

/// Configuration for a call session
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Session relay URL
    pub relay_url: String,

    /// Connect attempts before giving up on the relay
    pub reconnection_attempts: u32,

    /// Pause between two connect attempts
    pub reconnection_delay: Duration,

    /// Max mesh inputs processed per poll
    pub batch_size: usize,

    /// Mesh input queue capacity
    pub queue_size: usize,

    /// Keep joining when camera/microphone capture fails
    pub join_without_media: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            relay_url: "ws://localhost:5000/relay".to_string(),
            reconnection_attempts: 5,
            reconnection_delay: Duration::from_millis(1000),
            batch_size: 10,
            queue_size: 100,
            join_without_media: false,
        }
    }
}

impl SessionConfig {
    pub fn new(relay_url: impl Into<String>) -> Self {
        Self {
            relay_url: relay_url.into(),
            ..Default::default()
        }
    }

    pub fn with_reconnection(mut self, attempts: u32, delay: Duration) -> Self {
        self.reconnection_attempts = attempts;
        self.reconnection_delay = delay;
        self
    }

    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    pub fn with_queue_size(mut self, size: usize) -> Self {
        self.queue_size = size;
        self
    }

    pub fn with_join_without_media(mut self, allowed: bool) -> Self {
        self.join_without_media = allowed;
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.reconnection_attempts,
            delay: self.reconnection_delay,
        }
    }
}
