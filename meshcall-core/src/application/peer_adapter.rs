use crate::domain::{
    ConnectionState, IceCandidate, MediaTrack, ParticipantId, PeerConnectionError, RemoteStream,
    Role, SignalApplicationError, SignalPayload, TrackKind,
};
use crate::traits::{PeerConnection, PeerConnectionEvent};

/// What a single connection reports back to the mesh
#[derive(Debug, Clone, PartialEq)]
pub enum AdapterEvent {
    /// Negotiation data to route to the remote participant
    HandshakeDataProduced(SignalPayload),

    /// The remote participant's media arrived
    RemoteStreamAvailable(RemoteStream),

    /// The connection failed and is now closed
    ConnectionFailed(String),
}

/// Wraps one peer connection and enforces its lifecycle
pub struct PeerConnectionAdapter<C: PeerConnection> {
    remote: ParticipantId,
    role: Role,
    state: ConnectionState,
    connection: C,
    outbound: Vec<MediaTrack>,
    /// Candidates received before any remote description
    pending_candidates: Vec<IceCandidate>,
    last_remote_description: Option<SignalPayload>,
    awaiting_answer: bool,
    remote_stream: Option<RemoteStream>,
}

impl<C: PeerConnection> PeerConnectionAdapter<C> {
    pub fn new(remote: ParticipantId, role: Role, connection: C) -> Self {
        Self {
            remote,
            role,
            state: ConnectionState::Created,
            connection,
            outbound: Vec::new(),
            pending_candidates: Vec::new(),
            last_remote_description: None,
            awaiting_answer: false,
            remote_stream: None,
        }
    }

    pub fn remote(&self) -> &ParticipantId {
        &self.remote
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    pub fn outbound_tracks(&self) -> &[MediaTrack] {
        &self.outbound
    }

    pub fn remote_stream(&self) -> Option<&RemoteStream> {
        self.remote_stream.as_ref()
    }

    pub fn pending_candidates(&self) -> usize {
        self.pending_candidates.len()
    }

    /// Underlying connection (for inspection)
    pub fn connection(&self) -> &C {
        &self.connection
    }

    pub fn connection_mut(&mut self) -> &mut C {
        &mut self.connection
    }

    /// Attach a local track as a new sender. Attaching the same track twice
    /// is a no-op.
    pub fn attach_outbound_track(&mut self, track: &MediaTrack) -> Result<(), PeerConnectionError> {
        if self.is_closed() {
            return Err(PeerConnectionError::Closed);
        }
        if self.outbound.contains(track) {
            return Ok(());
        }
        self.connection.add_track(track)?;
        self.outbound.push(track.clone());
        Ok(())
    }

    /// Point every sender of `kind` at `track`. Returns the number of senders
    /// updated.
    pub fn replace_outbound_track(
        &mut self,
        kind: TrackKind,
        track: &MediaTrack,
    ) -> Result<usize, PeerConnectionError> {
        if self.is_closed() {
            return Err(PeerConnectionError::Closed);
        }
        let replaced = self.connection.replace_track(kind, track)?;
        for sender in self.outbound.iter_mut().filter(|t| t.kind() == kind) {
            *sender = track.clone();
        }
        if replaced == 0 {
            tracing::debug!("🔇 No {} sender towards {} to replace", kind, self.remote);
        }
        Ok(replaced)
    }

    /// Ask the capability to start the handshake
    pub fn request_offer(&mut self) -> Result<(), PeerConnectionError> {
        if self.is_closed() {
            return Err(PeerConnectionError::Closed);
        }
        self.connection.create_offer()?;
        self.awaiting_answer = true;
        self.mark_negotiating();
        Ok(())
    }

    /// Apply negotiation data received from the remote participant
    pub fn apply_incoming(&mut self, payload: &SignalPayload) -> Result<(), SignalApplicationError> {
        if self.is_closed() {
            return Err(SignalApplicationError::Closed {
                participant: self.remote.clone(),
            });
        }

        match payload {
            SignalPayload::Offer { .. } | SignalPayload::Answer { .. } => {
                if self.last_remote_description.as_ref() == Some(payload) {
                    tracing::debug!(
                        "🔁 Ignoring duplicate {} from {}",
                        payload.kind(),
                        self.remote
                    );
                    return Ok(());
                }
                if matches!(payload, SignalPayload::Answer { .. }) && !self.awaiting_answer {
                    return Err(SignalApplicationError::OutOfOrder {
                        participant: self.remote.clone(),
                        kind: payload.kind(),
                    });
                }

                self.forward(payload)?;
                self.last_remote_description = Some(payload.clone());
                self.awaiting_answer = false;
                self.mark_negotiating();
                self.flush_candidates()
            }
            SignalPayload::Candidate { candidate } => {
                self.mark_negotiating();
                if self.last_remote_description.is_none() {
                    tracing::debug!("🧊 Buffering early candidate from {}", self.remote);
                    self.pending_candidates.push(candidate.clone());
                    return Ok(());
                }
                self.forward(payload)
            }
            SignalPayload::HandshakeRequest => {
                tracing::debug!(
                    "🤝 Handshake request from {} reached an existing connection",
                    self.remote
                );
                Ok(())
            }
        }
    }

    /// Drain capability events into mesh vocabulary
    pub fn poll(&mut self) -> Vec<AdapterEvent> {
        let raw = self.connection.poll_events();
        if self.is_closed() {
            return Vec::new();
        }

        let mut events = Vec::with_capacity(raw.len());
        for event in raw {
            match event {
                PeerConnectionEvent::Signal(payload) => {
                    if matches!(payload, SignalPayload::Offer { .. }) {
                        self.awaiting_answer = true;
                    }
                    self.mark_negotiating();
                    events.push(AdapterEvent::HandshakeDataProduced(payload));
                }
                PeerConnectionEvent::Stream(stream) => {
                    self.mark_negotiating();
                    self.transition(ConnectionState::Connected);
                    self.remote_stream = Some(stream.clone());
                    events.push(AdapterEvent::RemoteStreamAvailable(stream));
                }
                PeerConnectionEvent::Failed(reason) => {
                    tracing::warn!("❌ Connection to {} failed: {}", self.remote, reason);
                    self.destroy();
                    events.push(AdapterEvent::ConnectionFailed(reason));
                    break;
                }
            }
        }
        events
    }

    /// Close the connection. Returns false if it was already closed.
    pub fn destroy(&mut self) -> bool {
        if self.is_closed() {
            return false;
        }
        self.connection.close();
        self.pending_candidates.clear();
        self.transition(ConnectionState::Closed);
        true
    }

    fn forward(&mut self, payload: &SignalPayload) -> Result<(), SignalApplicationError> {
        self.connection
            .apply_signal(payload)
            .map_err(|e| SignalApplicationError::Rejected {
                participant: self.remote.clone(),
                kind: payload.kind(),
                reason: e.to_string(),
            })
    }

    fn flush_candidates(&mut self) -> Result<(), SignalApplicationError> {
        if self.pending_candidates.is_empty() {
            return Ok(());
        }
        tracing::debug!(
            "🧊 Flushing {} buffered candidates for {}",
            self.pending_candidates.len(),
            self.remote
        );
        for candidate in std::mem::take(&mut self.pending_candidates) {
            self.forward(&SignalPayload::Candidate { candidate })?;
        }
        Ok(())
    }

    fn mark_negotiating(&mut self) {
        if self.state == ConnectionState::Created {
            self.transition(ConnectionState::Negotiating);
        }
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state == next {
            return;
        }
        if self.state.can_transition_to(next) {
            tracing::trace!("{} {} -> {}", self.remote, self.state, next);
            self.state = next;
        } else {
            tracing::debug!(
                "Ignoring transition {} -> {} for {}",
                self.state,
                next,
                self.remote
            );
        }
    }
}
