use meshcall_core::{MediaAcquisitionError, ParticipantError, QueueError};

/// Infrastructure layer errors
#[derive(Debug, thiserror::Error)]
pub enum P2PError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Could not reach relay after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Not connected to relay")]
    NotConnected,

    #[error("Call has ended")]
    CallEnded,

    #[error("Send failed: {0}")]
    SendFailed(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Media error: {0}")]
    Media(#[from] MediaAcquisitionError),

    #[error("Participant error: {0}")]
    Participant(#[from] ParticipantError),

    #[error("Queue error: {0}")]
    Queue(#[from] QueueError),
}

pub type Result<T> = std::result::Result<T, P2PError>;
