//! Scripted peer connection used by the unit tests in this crate

use crate::domain::{
    LocalStream, MediaTrack, ParticipantId, PeerConnectionError, Role, SignalPayload, TrackKind,
    TrackSource,
};
use crate::traits::{PeerConnection, PeerConnectionEvent, PeerConnectionFactory};

#[derive(Debug, Default)]
pub struct FakeConnection {
    pub remote: Option<ParticipantId>,
    pub role: Option<Role>,
    pub senders: Vec<MediaTrack>,
    pub applied: Vec<SignalPayload>,
    pub offers_created: usize,
    pub closed: bool,
    pub reject_signals: Option<String>,
    pending: Vec<PeerConnectionEvent>,
}

impl FakeConnection {
    pub fn push_event(&mut self, event: PeerConnectionEvent) {
        self.pending.push(event);
    }
}

impl PeerConnection for FakeConnection {
    fn add_track(&mut self, track: &MediaTrack) -> Result<(), PeerConnectionError> {
        if self.closed {
            return Err(PeerConnectionError::Closed);
        }
        self.senders.push(track.clone());
        Ok(())
    }

    fn replace_track(
        &mut self,
        kind: TrackKind,
        track: &MediaTrack,
    ) -> Result<usize, PeerConnectionError> {
        let mut replaced = 0;
        for sender in self.senders.iter_mut().filter(|s| s.kind() == kind) {
            *sender = track.clone();
            replaced += 1;
        }
        Ok(replaced)
    }

    fn sender_tracks(&self) -> Vec<MediaTrack> {
        self.senders.clone()
    }

    fn create_offer(&mut self) -> Result<(), PeerConnectionError> {
        self.offers_created += 1;
        self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Offer {
            sdp: format!("offer-{}", self.offers_created),
        }));
        Ok(())
    }

    fn apply_signal(&mut self, payload: &SignalPayload) -> Result<(), PeerConnectionError> {
        if let Some(reason) = &self.reject_signals {
            return Err(PeerConnectionError::Negotiation(reason.clone()));
        }
        self.applied.push(payload.clone());
        if let SignalPayload::Offer { sdp } = payload {
            self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Answer {
                sdp: format!("answer-to-{}", sdp),
            }));
        }
        Ok(())
    }

    fn poll_events(&mut self) -> Vec<PeerConnectionEvent> {
        std::mem::take(&mut self.pending)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}

#[derive(Debug, Default)]
pub struct FakeFactory {
    pub created: Vec<(ParticipantId, Role)>,
    pub fail_for: Option<ParticipantId>,
}

impl PeerConnectionFactory for FakeFactory {
    type Connection = FakeConnection;

    fn create(
        &mut self,
        remote: &ParticipantId,
        role: Role,
    ) -> Result<FakeConnection, PeerConnectionError> {
        if self.fail_for.as_ref() == Some(remote) {
            return Err(PeerConnectionError::Creation("factory refused".to_string()));
        }
        self.created.push((remote.clone(), role));
        Ok(FakeConnection {
            remote: Some(remote.clone()),
            role: Some(role),
            ..Default::default()
        })
    }
}

pub fn pid(value: &str) -> ParticipantId {
    ParticipantId::parse(value).unwrap()
}

pub fn local_stream() -> LocalStream {
    LocalStream::new(
        MediaTrack::new(TrackSource::Camera, "FaceTime HD Camera"),
        MediaTrack::new(TrackSource::Microphone, "Built-in Microphone"),
    )
}

pub fn init_test_tracing() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}
