use crate::domain::ParticipantId;

/// Failure to capture camera and microphone
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum MediaAcquisitionError {
    #[error("Permission to capture media was denied")]
    PermissionDenied,

    #[error("No capture device found")]
    DeviceNotFound,

    #[error("Media capture failed: {0}")]
    Other(String),
}

/// Failure to start a screen share
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum ScreenCaptureError {
    #[error("Screen capture was cancelled")]
    Cancelled,

    #[error("Cannot share screen without local media")]
    NoLocalMedia,

    #[error("Call has ended")]
    CallEnded,

    #[error("Screen capture failed: {0}")]
    Other(String),
}

/// Failure to apply remote negotiation data to a connection
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum SignalApplicationError {
    #[error("Unexpected {kind} from {participant}")]
    OutOfOrder {
        participant: ParticipantId,
        kind: &'static str,
    },

    #[error("Connection to {participant} is closed")]
    Closed { participant: ParticipantId },

    #[error("{kind} from {participant} rejected: {reason}")]
    Rejected {
        participant: ParticipantId,
        kind: &'static str,
        reason: String,
    },
}

/// Failure reported by the peer-connection capability
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum PeerConnectionError {
    #[error("Peer connection is closed")]
    Closed,

    #[error("Failed to create peer connection: {0}")]
    Creation(String),

    #[error("Track operation failed: {0}")]
    Track(String),

    #[error("Negotiation failed: {0}")]
    Negotiation(String),
}
