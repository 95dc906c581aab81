use crate::infrastructure::error::Result;
use async_trait::async_trait;

/// What a relay transport hands back when polled
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportFrame {
    Text(String),
    Closed { reason: String },
}

/// Bidirectional text channel to the relay (allows mocking in tests)
pub trait RelayTransport {
    fn send(&mut self, frame: String) -> Result<()>;
    fn poll_frames(&mut self) -> Vec<TransportFrame>;
    fn is_open(&self) -> bool;
    fn close(&mut self);
}

/// Opens relay transports
#[async_trait]
pub trait RelayConnector: Send {
    type Transport: RelayTransport + Send;

    async fn connect(&mut self, url: &str) -> Result<Self::Transport>;
}
