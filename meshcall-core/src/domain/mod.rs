pub mod connection;
pub mod error;
pub mod media;
pub mod participant;
pub mod session;
pub mod signal;
pub mod status;

pub use connection::{ConnectionState, Generation, Role};
pub use error::{
    MediaAcquisitionError, PeerConnectionError, ScreenCaptureError, SignalApplicationError,
};
pub use media::{LocalStream, MediaTrack, RemoteStream, TrackId, TrackKind, TrackSource};
pub use participant::{ParticipantError, ParticipantId, Timestamp};
pub use session::SessionId;
pub use signal::{Endpoint, IceCandidate, SignalEnvelope, SignalPayload};
pub use status::ConnectionStatus;
