use crate::application::ChatMessage;
use meshcall_core::{
    ConnectionStatus, ParticipantId, RemoteStream, ScreenCaptureError, SignalEnvelope,
};

/// Events decoded from the relay channel
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    MembershipJoined { participant_id: ParticipantId },
    MembershipLeft { participant_id: ParticipantId },
    ExistingMembers { participant_ids: Vec<ParticipantId> },
    SignalReceived { envelope: SignalEnvelope },

    /// The relay rejected something we sent
    RelayError { message: String },

    /// Channel lost; nothing more arrives until reconnect
    Disconnected { reason: String },
}

/// Notifications for the embedding application
#[derive(Debug, Clone, PartialEq)]
pub enum CallEvent {
    StatusChanged(ConnectionStatus),

    /// Show this participant's media
    RemoteStreamAdded {
        participant_id: ParticipantId,
        stream: RemoteStream,
    },

    /// Remove this participant's media
    ParticipantRemoved { participant_id: ParticipantId },

    PeerConnectionFailed {
        participant_id: ParticipantId,
        reason: String,
    },

    ScreenShareStarted,
    ScreenShareStopped,
    ScreenShareFailed { error: ScreenCaptureError },

    RelayError { message: String },

    /// Local echo of a chat line
    ChatMessagePosted(ChatMessage),

    CommandFailed { command: String, reason: String },
}
