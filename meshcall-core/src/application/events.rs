use crate::domain::{ParticipantId, RemoteStream, ScreenCaptureError, SignalEnvelope};

/// Relay notifications the mesh reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum MeshEvent {
    /// Someone joined after us
    MembershipJoined { participant_id: ParticipantId },

    /// Someone left the session
    MembershipLeft { participant_id: ParticipantId },

    /// Participants already present when we joined
    ExistingMembers {
        participant_ids: Vec<ParticipantId>,
    },

    /// Negotiation data relayed from a remote participant
    SignalReceived { envelope: SignalEnvelope },

    /// Relay connection lost
    RelayDisconnected,
}

/// Side effects requested by the mesh after handling an input
#[derive(Debug, Clone, PartialEq)]
pub enum MeshAction {
    /// Route a signal through the relay
    SendSignal { envelope: SignalEnvelope },

    /// Tell the relay we are leaving the session
    LeaveSession,

    /// Remote media is ready to be shown
    RemoteStreamAvailable {
        participant_id: ParticipantId,
        stream: RemoteStream,
    },

    /// A participant's connection is gone
    ParticipantRemoved { participant_id: ParticipantId },

    /// A connection failed and was discarded
    ConnectionFailed {
        participant_id: ParticipantId,
        reason: String,
    },

    /// The screen is now the outbound video on every connection
    ScreenShareStarted,

    /// The camera is back as the outbound video on every connection
    ScreenShareStopped,

    /// Screen capture could not be started
    ScreenShareFailed { error: ScreenCaptureError },

    /// Command failed
    CommandFailed { command: String, reason: String },
}
