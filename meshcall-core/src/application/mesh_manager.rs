use crate::application::{
    AdapterEvent, ConnectionTable, MediaTrackController, MeshAction, MeshCommand, MeshEvent,
    PeerConnectionAdapter, ScreenShareStart, TrackChange,
};
use crate::domain::{
    Endpoint, LocalStream, ParticipantId, Role, ScreenCaptureError, SignalApplicationError,
    SignalEnvelope, SignalPayload,
};
use crate::traits::PeerConnectionFactory;

/// Orchestrates the full mesh of connections for one call
///
/// Rules for who starts a handshake:
/// - a participant that was already present initiates towards newcomers
///   (`MembershipJoined`);
/// - a newcomer creates responder records for everybody already present and
///   sends each of them a `HandshakeRequest` (`ExistingMembers`);
/// - a `HandshakeRequest` from someone without a record makes us the offering
///   side, one that arrives for an existing record is ignored;
/// - any other signal from an unknown participant lazily creates a responder
///   record.
///
/// All of these are idempotent, so each pair ends up with exactly one record
/// on each side whatever order the triggers arrive in.
pub struct PeerMeshManager<F: PeerConnectionFactory> {
    factory: F,
    media: MediaTrackController,
    connections: ConnectionTable<F::Connection>,
    torn_down: bool,
}

impl<F: PeerConnectionFactory> PeerMeshManager<F> {
    /// Create a new mesh manager with no local media yet
    pub fn new(factory: F) -> Self {
        Self::with_media(factory, MediaTrackController::new())
    }

    pub fn with_media(factory: F, media: MediaTrackController) -> Self {
        Self {
            factory,
            media,
            connections: ConnectionTable::new(),
            torn_down: false,
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn media(&self) -> &MediaTrackController {
        &self.media
    }

    pub fn connections(&self) -> &ConnectionTable<F::Connection> {
        &self.connections
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Hand captured camera and microphone to the controller
    ///
    /// Connections that already exist get the new tracks attached.
    pub fn install_local_media(&mut self, stream: LocalStream) -> Vec<MeshAction> {
        let mut actions = Vec::new();
        if self.torn_down {
            tracing::debug!("Ignoring local media after leaving");
            for track in stream.tracks() {
                track.stop();
            }
            return actions;
        }

        self.media.install(stream);
        let tracks = self.media.outbound_tracks();
        let mut failed = Vec::new();
        for record in self.connections.iter_mut() {
            for track in &tracks {
                if let Err(e) = record.adapter.attach_outbound_track(track) {
                    failed.push((record.participant_id.clone(), e.to_string()));
                    break;
                }
            }
        }
        for (participant_id, reason) in failed {
            self.fail_record(&participant_id, reason, &mut actions);
        }
        actions
    }

    /// Process a relay notification
    pub fn handle_event(&mut self, event: MeshEvent) -> Vec<MeshAction> {
        let mut actions = Vec::new();
        if self.torn_down {
            tracing::debug!("Ignoring {:?} after leaving", event);
            return actions;
        }

        match event {
            MeshEvent::MembershipJoined { participant_id } => {
                self.handle_membership_joined(participant_id, &mut actions)
            }
            MeshEvent::MembershipLeft { participant_id } => {
                self.handle_membership_left(participant_id, &mut actions)
            }
            MeshEvent::ExistingMembers { participant_ids } => {
                self.handle_existing_members(participant_ids, &mut actions)
            }
            MeshEvent::SignalReceived { envelope } => self.handle_signal(envelope, &mut actions),
            MeshEvent::RelayDisconnected => {
                let closed = self.destroy_all(&mut actions);
                tracing::warn!("🔴 Relay lost, closed {} connections", closed);
            }
        }

        actions
    }

    /// Process a local user intent
    pub fn handle_command(&mut self, command: MeshCommand) -> Vec<MeshAction> {
        if let MeshCommand::Leave = command {
            return self.teardown();
        }

        let mut actions = Vec::new();
        if self.torn_down {
            if let MeshCommand::CompleteScreenShare {
                result: Ok(track), ..
            } = &command
            {
                track.stop();
            }
            actions.push(MeshAction::CommandFailed {
                command: command.name().to_string(),
                reason: "Call has ended".to_string(),
            });
            return actions;
        }

        match command {
            MeshCommand::SetCameraEnabled { enabled } => {
                if !self.media.set_camera_enabled(enabled) {
                    actions.push(Self::no_media_failure(MeshCommand::SetCameraEnabled {
                        enabled,
                    }));
                }
            }
            MeshCommand::SetMicEnabled { enabled } => {
                if !self.media.set_mic_enabled(enabled) {
                    actions.push(Self::no_media_failure(MeshCommand::SetMicEnabled {
                        enabled,
                    }));
                }
            }
            MeshCommand::CompleteScreenShare { ticket, result } => {
                match self.media.complete_screen_share(ticket, result) {
                    Ok(Some(change)) => {
                        self.apply_track_change(&change, &mut actions);
                        actions.push(MeshAction::ScreenShareStarted);
                    }
                    Ok(None) => {}
                    Err(error) => {
                        tracing::warn!("❌ Screen share failed: {}", error);
                        actions.push(MeshAction::ScreenShareFailed { error });
                    }
                }
            }
            MeshCommand::StopScreenShare => match self.media.stop_screen_share() {
                Some(change) => {
                    self.apply_track_change(&change, &mut actions);
                    actions.push(MeshAction::ScreenShareStopped);
                }
                None => tracing::debug!("No screen share to stop"),
            },
            MeshCommand::LocalTrackEnded { track_id } => {
                if let Some(change) = self.media.handle_track_ended(track_id) {
                    self.apply_track_change(&change, &mut actions);
                    actions.push(MeshAction::ScreenShareStopped);
                }
            }
            MeshCommand::Leave => {}
        }

        actions
    }

    /// First half of a screen share; see [`MediaTrackController::begin_screen_share`]
    pub fn begin_screen_share(&mut self) -> Result<ScreenShareStart, ScreenCaptureError> {
        if self.torn_down {
            return Err(ScreenCaptureError::CallEnded);
        }
        self.media.begin_screen_share()
    }

    /// Drain every adapter and route what they produced
    pub fn poll_connections(&mut self) -> Vec<MeshAction> {
        let mut actions = Vec::new();
        if self.torn_down {
            return actions;
        }

        // 1. Screen capture ended from the platform's own controls
        if self.media.screen_track_ended() {
            if let Some(change) = self.media.stop_screen_share() {
                self.apply_track_change(&change, &mut actions);
                actions.push(MeshAction::ScreenShareStopped);
            }
        }

        // 2. Collect adapter output
        let mut batches = Vec::new();
        for record in self.connections.iter_mut() {
            let events = record.adapter.poll();
            if !events.is_empty() {
                batches.push((record.participant_id.clone(), record.generation, events));
            }
        }
        batches.sort_by(|a, b| a.0.cmp(&b.0));

        // 3. Route it, dropping anything from a record that is gone
        for (participant_id, generation, events) in batches {
            for event in events {
                if !self.connections.is_current(&participant_id, generation) {
                    tracing::debug!("🗑️ Dropping stale event from {}", participant_id);
                    break;
                }
                match event {
                    AdapterEvent::HandshakeDataProduced(payload) => {
                        tracing::debug!("📤 {} -> {}", payload.kind(), participant_id);
                        actions.push(MeshAction::SendSignal {
                            envelope: SignalEnvelope::to_remote(participant_id.clone(), payload),
                        });
                    }
                    AdapterEvent::RemoteStreamAvailable(stream) => {
                        let Some(record) = self.connections.get_mut(&participant_id) else {
                            continue;
                        };
                        if record.stream_announced {
                            continue;
                        }
                        record.stream_announced = true;
                        tracing::info!("📺 Receiving media from {}", participant_id);
                        actions.push(MeshAction::RemoteStreamAvailable {
                            participant_id: participant_id.clone(),
                            stream,
                        });
                    }
                    AdapterEvent::ConnectionFailed(reason) => {
                        self.fail_record(&participant_id, reason, &mut actions);
                    }
                }
            }
        }

        actions
    }

    /// Close every connection, stop every local track and leave
    ///
    /// Synchronous so it can run from an unload hook. Calling it again does
    /// nothing.
    pub fn teardown(&mut self) -> Vec<MeshAction> {
        let mut actions = Vec::new();
        if self.torn_down {
            return actions;
        }
        self.torn_down = true;

        let closed = self.destroy_all(&mut actions);
        let stopped = self.media.release_all();
        tracing::info!(
            "🔴 Leaving call: {} connections closed, {} tracks stopped",
            closed,
            stopped
        );

        actions.push(MeshAction::LeaveSession);
        actions
    }

    fn handle_membership_joined(
        &mut self,
        participant_id: ParticipantId,
        actions: &mut Vec<MeshAction>,
    ) {
        if self.connections.contains(&participant_id) {
            tracing::debug!("Already connected to {}", participant_id);
            return;
        }
        tracing::info!("👋 {} joined, sending offer", participant_id);
        if self.create_record(&participant_id, Role::Initiator, actions) {
            self.start_offer(&participant_id, actions);
        }
    }

    fn handle_membership_left(
        &mut self,
        participant_id: ParticipantId,
        actions: &mut Vec<MeshAction>,
    ) {
        match self.connections.remove(&participant_id) {
            Some(mut record) => {
                record.adapter.destroy();
                tracing::info!("👋 {} left ({})", participant_id, record.generation);
                actions.push(MeshAction::ParticipantRemoved { participant_id });
            }
            None => tracing::debug!("{} left without a connection", participant_id),
        }
    }

    fn handle_existing_members(
        &mut self,
        participant_ids: Vec<ParticipantId>,
        actions: &mut Vec<MeshAction>,
    ) {
        tracing::info!(
            "👥 {} participants already in session",
            participant_ids.len()
        );
        for participant_id in participant_ids {
            if self.connections.contains(&participant_id) {
                tracing::debug!("Already connected to {}", participant_id);
                continue;
            }
            if self.create_record(&participant_id, Role::Responder, actions) {
                actions.push(MeshAction::SendSignal {
                    envelope: SignalEnvelope::to_remote(
                        participant_id,
                        SignalPayload::HandshakeRequest,
                    ),
                });
            }
        }
    }

    fn handle_signal(&mut self, envelope: SignalEnvelope, actions: &mut Vec<MeshAction>) {
        let Endpoint::Remote(from) = envelope.from else {
            tracing::warn!("⚠️ Dropping signal without a remote sender");
            return;
        };
        tracing::debug!("📥 {} <- {}", envelope.payload.kind(), from);

        match envelope.payload {
            SignalPayload::HandshakeRequest => {
                if self.connections.contains(&from) {
                    tracing::debug!("Handshake already under way with {}", from);
                    return;
                }
                if self.create_record(&from, Role::Initiator, actions) {
                    self.start_offer(&from, actions);
                }
            }
            payload => {
                if !self.connections.contains(&from)
                    && !self.create_record(&from, Role::Responder, actions)
                {
                    return;
                }
                let Some(record) = self.connections.get_mut(&from) else {
                    return;
                };
                match record.adapter.apply_incoming(&payload) {
                    Ok(()) => {}
                    Err(e @ SignalApplicationError::Closed { .. }) => {
                        tracing::warn!("⚠️ {}", e);
                    }
                    Err(e) => {
                        tracing::warn!("❌ {}", e);
                        self.fail_record(&from, e.to_string(), actions);
                    }
                }
            }
        }
    }

    fn create_record(
        &mut self,
        participant_id: &ParticipantId,
        role: Role,
        actions: &mut Vec<MeshAction>,
    ) -> bool {
        let connection = match self.factory.create(participant_id, role) {
            Ok(connection) => connection,
            Err(e) => {
                tracing::warn!("❌ Could not connect to {}: {}", participant_id, e);
                actions.push(MeshAction::ConnectionFailed {
                    participant_id: participant_id.clone(),
                    reason: e.to_string(),
                });
                return false;
            }
        };

        let mut adapter = PeerConnectionAdapter::new(participant_id.clone(), role, connection);
        for track in self.media.outbound_tracks() {
            if let Err(e) = adapter.attach_outbound_track(&track) {
                tracing::warn!("❌ Could not attach {} to {}: {}", track.kind(), participant_id, e);
                adapter.destroy();
                actions.push(MeshAction::ConnectionFailed {
                    participant_id: participant_id.clone(),
                    reason: e.to_string(),
                });
                return false;
            }
        }

        match self.connections.insert(adapter) {
            Some(generation) => {
                tracing::info!(
                    "🔗 {} connection to {} created ({})",
                    role,
                    participant_id,
                    generation
                );
                true
            }
            None => false,
        }
    }

    fn start_offer(&mut self, participant_id: &ParticipantId, actions: &mut Vec<MeshAction>) {
        let Some(record) = self.connections.get_mut(participant_id) else {
            return;
        };
        if let Err(e) = record.adapter.request_offer() {
            tracing::warn!("❌ Could not create offer for {}: {}", participant_id, e);
            self.fail_record(participant_id, e.to_string(), actions);
        }
    }

    fn apply_track_change(&mut self, change: &TrackChange, actions: &mut Vec<MeshAction>) {
        let mut failed = Vec::new();
        for record in self.connections.iter_mut() {
            match record
                .adapter
                .replace_outbound_track(change.kind, &change.current)
            {
                Ok(replaced) => tracing::debug!(
                    "🔄 {} {} sender(s) towards {} now use '{}'",
                    replaced,
                    change.kind,
                    record.participant_id,
                    change.current.label()
                ),
                Err(e) => failed.push((record.participant_id.clone(), e.to_string())),
            }
        }
        for (participant_id, reason) in failed {
            tracing::warn!("❌ Track substitution failed for {}: {}", participant_id, reason);
            self.fail_record(&participant_id, reason, actions);
        }
    }

    fn fail_record(
        &mut self,
        participant_id: &ParticipantId,
        reason: String,
        actions: &mut Vec<MeshAction>,
    ) {
        let Some(mut record) = self.connections.remove(participant_id) else {
            return;
        };
        record.adapter.destroy();
        actions.push(MeshAction::ConnectionFailed {
            participant_id: participant_id.clone(),
            reason,
        });
        actions.push(MeshAction::ParticipantRemoved {
            participant_id: participant_id.clone(),
        });
    }

    fn destroy_all(&mut self, actions: &mut Vec<MeshAction>) -> usize {
        let records = self.connections.drain();
        let count = records.len();
        for mut record in records {
            record.adapter.destroy();
            actions.push(MeshAction::ParticipantRemoved {
                participant_id: record.participant_id,
            });
        }
        count
    }

    fn no_media_failure(command: MeshCommand) -> MeshAction {
        MeshAction::CommandFailed {
            command: command.name().to_string(),
            reason: "No local media".to_string(),
        }
    }
}
