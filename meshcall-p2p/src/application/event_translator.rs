use meshcall_core::{MeshAction, MeshEvent, SessionId};

use crate::application::{CallEvent, RelayEvent};

/// Translates between relay events, mesh inputs and application events
///
/// Mappings:
/// - relay membership/signal events → `MeshEvent`
/// - relay disconnect → `MeshEvent::RelayDisconnected`
/// - user-facing `MeshAction`s → `CallEvent`
#[derive(Debug, Clone)]
pub struct EventTranslator {
    session_id: SessionId,
}

impl EventTranslator {
    pub fn new(session_id: SessionId) -> Self {
        Self { session_id }
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Translate a relay event into a mesh input
    ///
    /// Returns `None` for events the mesh does not react to (relay errors)
    pub fn to_mesh_event(&self, event: RelayEvent) -> Option<MeshEvent> {
        match event {
            RelayEvent::MembershipJoined { participant_id } => {
                Some(MeshEvent::MembershipJoined { participant_id })
            }

            RelayEvent::MembershipLeft { participant_id } => {
                Some(MeshEvent::MembershipLeft { participant_id })
            }

            RelayEvent::ExistingMembers { participant_ids } => {
                Some(MeshEvent::ExistingMembers { participant_ids })
            }

            RelayEvent::SignalReceived { envelope } => Some(MeshEvent::SignalReceived { envelope }),

            RelayEvent::Disconnected { .. } => Some(MeshEvent::RelayDisconnected),

            RelayEvent::RelayError { .. } => None,
        }
    }

    /// Translate a mesh action into an application event
    ///
    /// Returns `None` for actions that go to the relay instead
    pub fn to_call_event(&self, action: MeshAction) -> Option<CallEvent> {
        match action {
            MeshAction::RemoteStreamAvailable {
                participant_id,
                stream,
            } => {
                tracing::info!(
                    "📺 Remote stream from {} in session {}",
                    participant_id,
                    self.session_id
                );
                Some(CallEvent::RemoteStreamAdded {
                    participant_id,
                    stream,
                })
            }

            MeshAction::ParticipantRemoved { participant_id } => {
                Some(CallEvent::ParticipantRemoved { participant_id })
            }

            MeshAction::ConnectionFailed {
                participant_id,
                reason,
            } => Some(CallEvent::PeerConnectionFailed {
                participant_id,
                reason,
            }),

            MeshAction::ScreenShareStarted => Some(CallEvent::ScreenShareStarted),
            MeshAction::ScreenShareStopped => Some(CallEvent::ScreenShareStopped),
            MeshAction::ScreenShareFailed { error } => Some(CallEvent::ScreenShareFailed { error }),

            MeshAction::CommandFailed { command, reason } => {
                Some(CallEvent::CommandFailed { command, reason })
            }

            MeshAction::SendSignal { .. } | MeshAction::LeaveSession => None,
        }
    }
}
