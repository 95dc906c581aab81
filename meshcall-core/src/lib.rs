pub mod application;
pub mod domain;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

pub use application::{
    AdapterEvent, ConnectionRecord, ConnectionStatusTracker, ConnectionTable, LocalMediaState,
    MediaTrackController, MeshAction, MeshCommand, MeshEvent, PeerConnectionAdapter,
    PeerMeshManager, ScreenShareStart, ScreenShareTicket, TrackChange,
};
pub use application::runtime::{InputQueue, MeshInput, MeshLoop, QueueError};
pub use domain::{
    ConnectionState, ConnectionStatus, Endpoint, Generation, IceCandidate, LocalStream,
    MediaAcquisitionError, MediaTrack, ParticipantError, ParticipantId, PeerConnectionError,
    RemoteStream, Role, ScreenCaptureError, SessionId, SignalApplicationError, SignalEnvelope,
    SignalPayload, Timestamp, TrackId, TrackKind, TrackSource,
};
pub use traits::{MediaDevices, PeerConnection, PeerConnectionEvent, PeerConnectionFactory};
