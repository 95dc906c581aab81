use crate::domain::{
    MediaTrack, ParticipantId, PeerConnectionError, RemoteStream, Role, SignalPayload, TrackKind,
};

/// Events raised by the underlying peer-connection capability
#[derive(Debug, Clone, PartialEq)]
pub enum PeerConnectionEvent {
    /// Local negotiation data that must reach the remote participant
    Signal(SignalPayload),

    /// Remote media arrived
    Stream(RemoteStream),

    /// Negotiation or transport failed for good
    Failed(String),
}

/// One direct media connection to a remote participant (allows mocking in tests)
///
/// Implementations wrap whatever real-time media stack the platform offers.
/// The mesh never blocks on them: results of asynchronous work come back
/// through `poll_events`.
pub trait PeerConnection {
    /// Attach a local track as a new sender
    fn add_track(&mut self, track: &MediaTrack) -> Result<(), PeerConnectionError>;

    /// Swap the source of every sender of `kind` without renegotiating.
    /// Returns how many senders were updated.
    fn replace_track(
        &mut self,
        kind: TrackKind,
        track: &MediaTrack,
    ) -> Result<usize, PeerConnectionError>;

    /// Tracks currently feeding the senders
    fn sender_tracks(&self) -> Vec<MediaTrack>;

    /// Start the handshake; the offer comes back as a `Signal` event
    fn create_offer(&mut self) -> Result<(), PeerConnectionError>;

    /// Apply an offer, answer or candidate from the remote side
    fn apply_signal(&mut self, payload: &SignalPayload) -> Result<(), PeerConnectionError>;

    fn poll_events(&mut self) -> Vec<PeerConnectionEvent>;

    fn close(&mut self);
}

/// Creates peer connections on demand
pub trait PeerConnectionFactory {
    type Connection: PeerConnection;

    fn create(
        &mut self,
        remote: &ParticipantId,
        role: Role,
    ) -> Result<Self::Connection, PeerConnectionError>;
}
