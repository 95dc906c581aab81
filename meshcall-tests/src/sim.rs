//! In-memory relay, peer connections and capture devices for whole-call
//! scenarios

use async_trait::async_trait;
use meshcall_core::{
    LocalStream, MediaAcquisitionError, MediaDevices, MediaTrack, ParticipantId, PeerConnection,
    PeerConnectionError, PeerConnectionEvent, PeerConnectionFactory, RemoteStream, Role,
    ScreenCaptureError, SessionId, SignalPayload, TrackKind, TrackSource,
};
use meshcall_p2p::{
    ClientMessage, P2PError, RelayConnector, RelayTransport, Result, ServerMessage, TransportFrame,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

/// A signal that went through the relay
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalRecord {
    pub from: String,
    pub to: String,
    pub kind: String,
}

#[derive(Debug, Default)]
struct NetworkState {
    /// Inboxes of connected clients
    inboxes: HashMap<String, VecDeque<TransportFrame>>,

    /// Session members in join order
    rooms: HashMap<SessionId, Vec<String>>,

    /// Every signal the relay forwarded (or tried to)
    signals: Vec<SignalRecord>,

    /// What each side currently sends on each connection
    links: HashMap<(String, String), Vec<MediaTrack>>,

    connects: HashMap<String, u32>,
}

impl NetworkState {
    fn deliver(&mut self, to: &str, message: &ServerMessage) {
        let frame = message.to_frame().expect("server messages serialize");
        if let Some(inbox) = self.inboxes.get_mut(to) {
            inbox.push_back(TransportFrame::Text(frame));
        }
    }

    fn session_of(&self, name: &str) -> Option<SessionId> {
        self.rooms
            .iter()
            .find(|(_, members)| members.iter().any(|member| member == name))
            .map(|(session_id, _)| session_id.clone())
    }

    fn handle(&mut self, from: &str, message: ClientMessage) {
        match message {
            ClientMessage::JoinSession { session_id } => self.join(from, session_id),
            ClientMessage::LeaveSession { session_id } => self.leave(from, &session_id),
            ClientMessage::Signal { to, signal } => self.forward(from, to.as_str(), signal),
        }
    }

    fn join(&mut self, name: &str, session_id: SessionId) {
        let members = self.rooms.entry(session_id).or_default();
        if members.iter().any(|member| member == name) {
            return;
        }
        let existing = members.clone();
        members.push(name.to_string());

        self.deliver(
            name,
            &ServerMessage::ExistingMembers {
                participant_ids: existing.iter().map(|other| participant(other)).collect(),
            },
        );
        for other in &existing {
            self.deliver(
                other,
                &ServerMessage::MembershipJoined {
                    participant_id: participant(name),
                },
            );
        }
    }

    fn leave(&mut self, name: &str, session_id: &SessionId) {
        let Some(members) = self.rooms.get_mut(session_id) else {
            return;
        };
        let before = members.len();
        members.retain(|member| member != name);
        if members.len() == before {
            return;
        }

        let remaining = members.clone();
        for other in &remaining {
            self.deliver(
                other,
                &ServerMessage::MembershipLeft {
                    participant_id: participant(name),
                },
            );
        }
    }

    fn disconnect(&mut self, name: &str) {
        if let Some(session_id) = self.session_of(name) {
            self.leave(name, &session_id);
        }
        self.inboxes.remove(name);
    }

    fn forward(&mut self, from: &str, to: &str, signal: SignalPayload) {
        self.signals.push(SignalRecord {
            from: from.to_string(),
            to: to.to_string(),
            kind: signal.kind().to_string(),
        });

        let same_session = self.session_of(from).is_some() && self.session_of(from) == self.session_of(to);
        if !same_session {
            return;
        }
        let signal = serde_json::to_value(&signal).expect("signals serialize");
        self.deliver(
            to,
            &ServerMessage::Signal {
                from: participant(from),
                signal,
            },
        );
    }
}

fn participant(name: &str) -> ParticipantId {
    ParticipantId::parse(name).expect("participant names are not blank")
}

/// Relay plus the media "wire" between simulated peers
#[derive(Debug, Clone, Default)]
pub struct SimNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl SimNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, NetworkState> {
        self.state.lock().expect("network lock poisoned")
    }

    pub fn connector(&self, name: &str) -> SimConnector {
        SimConnector {
            name: name.to_string(),
            network: self.clone(),
        }
    }

    pub fn peer_factory(&self, name: &str) -> SimPeerFactory {
        SimPeerFactory {
            local: name.to_string(),
            network: self.clone(),
            created: Vec::new(),
        }
    }

    /// Hand a raw frame to one client, as if the relay had sent it
    pub fn inject(&self, to: &str, message: ServerMessage) {
        self.state().deliver(to, &message);
    }

    /// Relay `signal` to `to` as coming from `from`, whatever it contains
    pub fn inject_signal(&self, from: &str, to: &str, signal: serde_json::Value) {
        self.inject(
            to,
            ServerMessage::Signal {
                from: participant(from),
                signal,
            },
        );
    }

    /// Cut one client off the relay
    pub fn drop_client(&self, name: &str) {
        let mut state = self.state();
        if let Some(inbox) = state.inboxes.get_mut(name) {
            inbox.push_back(TransportFrame::Closed {
                reason: "transport close".to_string(),
            });
        }
        if let Some(session_id) = state.session_of(name) {
            state.leave(name, &session_id);
        }
    }

    /// True once no frame is waiting for anyone
    pub fn is_idle(&self) -> bool {
        self.state().inboxes.values().all(VecDeque::is_empty)
    }

    pub fn members(&self, session_id: &SessionId) -> Vec<String> {
        self.state()
            .rooms
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Signal types forwarded from `from` to `to`, in order
    pub fn signals_between(&self, from: &str, to: &str) -> Vec<String> {
        self.state()
            .signals
            .iter()
            .filter(|record| record.from == from && record.to == to)
            .map(|record| record.kind.clone())
            .collect()
    }

    /// Tracks `from` currently sends to `to`
    pub fn outbound_tracks(&self, from: &str, to: &str) -> Vec<MediaTrack> {
        self.state()
            .links
            .get(&(from.to_string(), to.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    pub fn connects(&self, name: &str) -> u32 {
        self.state().connects.get(name).copied().unwrap_or(0)
    }

    fn publish(&self, from: &str, to: &str, tracks: Vec<MediaTrack>) {
        self.state()
            .links
            .insert((from.to_string(), to.to_string()), tracks);
    }

    fn unpublish(&self, from: &str, to: &str) {
        self.state()
            .links
            .remove(&(from.to_string(), to.to_string()));
    }
}

pub struct SimConnector {
    name: String,
    network: SimNetwork,
}

#[async_trait]
impl RelayConnector for SimConnector {
    type Transport = SimTransport;

    async fn connect(&mut self, _url: &str) -> Result<SimTransport> {
        let mut state = self.network.state();
        state.inboxes.insert(self.name.clone(), VecDeque::new());
        *state.connects.entry(self.name.clone()).or_default() += 1;

        Ok(SimTransport {
            name: self.name.clone(),
            network: self.network.clone(),
            open: true,
        })
    }
}

pub struct SimTransport {
    name: String,
    network: SimNetwork,
    open: bool,
}

impl RelayTransport for SimTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        if !self.open {
            return Err(P2PError::NotConnected);
        }
        let message = ClientMessage::from_frame(&frame)?;
        self.network.state().handle(&self.name, message);
        Ok(())
    }

    fn poll_frames(&mut self) -> Vec<TransportFrame> {
        if !self.open {
            return Vec::new();
        }
        let mut state = self.network.state();
        let Some(inbox) = state.inboxes.get_mut(&self.name) else {
            return Vec::new();
        };

        let mut frames = Vec::new();
        while let Some(frame) = inbox.pop_front() {
            let closed = matches!(frame, TransportFrame::Closed { .. });
            frames.push(frame);
            if closed {
                self.open = false;
                break;
            }
        }
        frames
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.network.state().disconnect(&self.name);
        }
    }
}

/// Peer connection whose media "wire" is the shared network
///
/// Descriptions are answered at once and the remote stream carries the
/// very track handles the other side sends.
#[derive(Debug)]
pub struct SimConnection {
    pub local: String,
    pub remote: String,
    pub role: Role,
    pub senders: Vec<MediaTrack>,
    pub applied: Vec<SignalPayload>,
    pub offers_created: usize,
    pub closed: bool,
    network: SimNetwork,
    pending: Vec<PeerConnectionEvent>,
}

impl SimConnection {
    fn publish(&self) {
        self.network
            .publish(&self.local, &self.remote, self.senders.clone());
    }

    fn candidate(&self) -> PeerConnectionEvent {
        PeerConnectionEvent::Signal(SignalPayload::Candidate {
            candidate: meshcall_core::IceCandidate::new(format!(
                "candidate:{} 1 udp 2122260223 192.0.2.1 54400 typ host",
                self.local
            ))
            .with_mid("0", 0),
        })
    }

    fn remote_stream(&self) -> RemoteStream {
        RemoteStream::new(
            format!("{}-media", self.remote),
            self.network.outbound_tracks(&self.remote, &self.local),
        )
    }
}

impl PeerConnection for SimConnection {
    fn add_track(&mut self, track: &MediaTrack) -> std::result::Result<(), PeerConnectionError> {
        if self.closed {
            return Err(PeerConnectionError::Closed);
        }
        self.senders.push(track.clone());
        self.publish();
        Ok(())
    }

    fn replace_track(
        &mut self,
        kind: TrackKind,
        track: &MediaTrack,
    ) -> std::result::Result<usize, PeerConnectionError> {
        if self.closed {
            return Err(PeerConnectionError::Closed);
        }
        let mut replaced = 0;
        for sender in self.senders.iter_mut().filter(|s| s.kind() == kind) {
            *sender = track.clone();
            replaced += 1;
        }
        self.publish();
        Ok(replaced)
    }

    fn sender_tracks(&self) -> Vec<MediaTrack> {
        self.senders.clone()
    }

    fn create_offer(&mut self) -> std::result::Result<(), PeerConnectionError> {
        self.offers_created += 1;
        self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Offer {
            sdp: format!(
                "v=0 {}->{} #{}",
                self.local, self.remote, self.offers_created
            ),
        }));
        self.pending.push(self.candidate());
        Ok(())
    }

    fn apply_signal(&mut self, payload: &SignalPayload) -> std::result::Result<(), PeerConnectionError> {
        if self.closed {
            return Err(PeerConnectionError::Closed);
        }
        self.applied.push(payload.clone());

        match payload {
            SignalPayload::Offer { .. } => {
                self.pending.push(PeerConnectionEvent::Signal(SignalPayload::Answer {
                    sdp: format!("v=0 {}->{}", self.local, self.remote),
                }));
                self.pending.push(self.candidate());
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
        if !self.closed {
            self.closed = true;
            self.network.unpublish(&self.local, &self.remote);
        }
    }
}

pub struct SimPeerFactory {
    local: String,
    network: SimNetwork,
    pub created: Vec<(ParticipantId, Role)>,
}

impl PeerConnectionFactory for SimPeerFactory {
    type Connection = SimConnection;

    fn create(
        &mut self,
        remote: &ParticipantId,
        role: Role,
    ) -> std::result::Result<SimConnection, PeerConnectionError> {
        self.created.push((remote.clone(), role));
        Ok(SimConnection {
            local: self.local.clone(),
            remote: remote.to_string(),
            role,
            senders: Vec::new(),
            applied: Vec::new(),
            offers_created: 0,
            closed: false,
            network: self.network.clone(),
            pending: Vec::new(),
        })
    }
}

/// Camera, microphone and screen picker of one simulated participant
#[derive(Debug, Default)]
pub struct SimDevices {
    pub user_media_error: Option<MediaAcquisitionError>,
    pub display_results: VecDeque<std::result::Result<MediaTrack, ScreenCaptureError>>,

    /// Every local track handed out
    pub issued: Vec<MediaTrack>,
}

#[async_trait]
impl MediaDevices for SimDevices {
    async fn get_user_media(&mut self) -> std::result::Result<LocalStream, MediaAcquisitionError> {
        if let Some(error) = self.user_media_error.clone() {
            return Err(error);
        }
        let stream = LocalStream::new(
            MediaTrack::new(TrackSource::Camera, "Integrated Webcam"),
            MediaTrack::new(TrackSource::Microphone, "Microphone Array"),
        );
        self.issued.push(stream.camera.clone());
        self.issued.push(stream.microphone.clone());
        Ok(stream)
    }

    async fn get_display_media(&mut self) -> std::result::Result<MediaTrack, ScreenCaptureError> {
        let result = self
            .display_results
            .pop_front()
            .unwrap_or_else(|| Ok(MediaTrack::new(TrackSource::Screen, "Screen 1")));
        if let Ok(track) = &result {
            self.issued.push(track.clone());
        }
        result
    }
}
