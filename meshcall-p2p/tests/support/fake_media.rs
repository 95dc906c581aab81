use async_trait::async_trait;
use meshcall_core::{
    LocalStream, MediaAcquisitionError, MediaDevices, MediaTrack, ParticipantId, PeerConnection,
    PeerConnectionError, PeerConnectionEvent, PeerConnectionFactory, RemoteStream, Role,
    ScreenCaptureError, SignalPayload, TrackKind, TrackSource,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Capture devices with scripted outcomes
#[derive(Debug, Default)]
pub struct ScriptedDevices {
    /// Error returned by the next camera/microphone request
    pub user_media_error: Option<MediaAcquisitionError>,

    /// Outcomes for upcoming screen pickers (a fresh screen track when empty)
    pub display_results: VecDeque<Result<MediaTrack, ScreenCaptureError>>,

    /// Every local track handed out, shared with the test
    pub issued: Arc<Mutex<Vec<MediaTrack>>>,

    pub user_media_requests: u32,
}

impl ScriptedDevices {
    pub fn failing(error: MediaAcquisitionError) -> Self {
        Self {
            user_media_error: Some(error),
            ..Default::default()
        }
    }
}

#[async_trait]
impl MediaDevices for ScriptedDevices {
    async fn get_user_media(&mut self) -> Result<LocalStream, MediaAcquisitionError> {
        self.user_media_requests += 1;
        if let Some(error) = self.user_media_error.clone() {
            return Err(error);
        }

        let stream = LocalStream::new(
            MediaTrack::new(TrackSource::Camera, "USB Camera"),
            MediaTrack::new(TrackSource::Microphone, "Headset Microphone"),
        );
        let mut issued = self.issued.lock().unwrap();
        issued.push(stream.camera.clone());
        issued.push(stream.microphone.clone());
        Ok(stream)
    }

    async fn get_display_media(&mut self) -> Result<MediaTrack, ScreenCaptureError> {
        let result = self
            .display_results
            .pop_front()
            .unwrap_or_else(|| Ok(MediaTrack::new(TrackSource::Screen, "Entire screen")));
        if let Ok(track) = &result {
            self.issued.lock().unwrap().push(track.clone());
        }
        result
    }
}

/// Peer connection that completes every handshake on its own
///
/// Offers are answered immediately and remote media shows up as soon as a
/// description has been applied.
#[derive(Debug)]
pub struct LoopbackConnection {
    pub remote: ParticipantId,
    pub role: Role,
    pub senders: Vec<MediaTrack>,
    pub applied: Vec<SignalPayload>,
    pub offers_created: usize,
    pub replacements: usize,
    pub closed: bool,
    pending: Vec<PeerConnectionEvent>,
}

impl LoopbackConnection {
    fn remote_stream(&self) -> RemoteStream {
        RemoteStream::new(
            format!("stream-{}", self.remote),
            vec![
                MediaTrack::remote(TrackKind::Audio, format!("{} audio", self.remote)),
                MediaTrack::remote(TrackKind::Video, format!("{} video", self.remote)),
            ],
        )
    }
}

impl PeerConnection for LoopbackConnection {
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
        self.replacements += replaced;
        Ok(replaced)
    }

    fn sender_tracks(&self) -> Vec<MediaTrack> {
        self.senders.clone()
    }

    fn create_offer(&mut self) -> Result<(), PeerConnectionError> {
        self.offers_created += 1;
        self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Offer {
            sdp: format!("v=0 offer for {}", self.remote),
        }));
        Ok(())
    }

    fn apply_signal(&mut self, payload: &SignalPayload) -> Result<(), PeerConnectionError> {
        if self.closed {
            return Err(PeerConnectionError::Closed);
        }
        self.applied.push(payload.clone());

        match payload {
            SignalPayload::Offer { .. } => {
                self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Answer {
                    sdp: format!("v=0 answer for {}", self.remote),
                }));
                self.pending
                    .push(PeerConnectionEvent::Stream(self.remote_stream()));
            }
            SignalPayload::Answer { .. } => {
                self.pending
                    .push(PeerConnectionEvent::Stream(self.remote_stream()));
            }
            SignalPayload::Candidate { .. } | SignalPayload::HandshakeRequest => {}
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
pub struct LoopbackFactory {
    pub created: Vec<(ParticipantId, Role)>,
}

impl PeerConnectionFactory for LoopbackFactory {
    type Connection = LoopbackConnection;

    fn create(
        &mut self,
        remote: &ParticipantId,
        role: Role,
    ) -> Result<LoopbackConnection, PeerConnectionError> {
        self.created.push((remote.clone(), role));
        Ok(LoopbackConnection {
            remote: remote.clone(),
            role,
            senders: Vec::new(),
            applied: Vec::new(),
            offers_created: 0,
            replacements: 0,
            closed: false,
            pending: Vec::new(),
        })
    }
}
