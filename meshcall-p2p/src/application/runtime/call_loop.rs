use crate::application::{CallEvent, ChatLog, ChatMessage, EventTranslator, RelayEvent, SessionConfig};
use crate::infrastructure::error::{P2PError, Result};
use crate::infrastructure::relay_client::RelayClient;
use crate::infrastructure::transport::RelayConnector;
use meshcall_core::{
    ConnectionStatus, ConnectionStatusTracker, MediaDevices, MeshAction, MeshCommand, MeshEvent,
    MeshLoop, PeerConnectionFactory, PeerMeshManager, ScreenCaptureError, ScreenShareStart,
    SessionId, TrackId,
};
use std::collections::VecDeque;
use tokio::sync::watch;

/// One participant's side of a call: relay ↔ mesh ↔ media devices
///
/// This is the main integration point for applications.
///
/// ```text
/// ┌─────────────────────────────────────────┐
/// │         Application Layer               │
/// │  (video grid, buttons, status badge)    │
/// └─────────────────────────────────────────┘
///                   │  CallEvent / status
///                   ↓
/// ┌─────────────────────────────────────────┐
/// │           CallLoop (this)               │
/// │  - relay events → mesh inputs           │
/// │  - mesh actions → relay / CallEvent     │
/// │  - status derivation                    │
/// └─────────────────────────────────────────┘
///       │                        │
///       ↓                        ↓
/// ┌──────────────┐      ┌──────────────┐
/// │ RelayClient  │      │   MeshLoop   │
/// │  (Network)   │      │ (Connections)│
/// └──────────────┘      └──────────────┘
/// ```
///
/// Only `connect`, `join`, `reconnect` and `start_screen_share` await.
/// Everything else, `teardown` included, is synchronous.
pub struct CallLoop<C, F, D>
where
    C: RelayConnector,
    F: PeerConnectionFactory,
    D: MediaDevices,
{
    config: SessionConfig,
    session_id: SessionId,

    connector: C,
    relay: Option<RelayClient<C::Transport>>,
    devices: D,

    mesh: MeshLoop<F>,
    translator: EventTranslator,

    /// Relay events that did not fit in the mesh queue yet
    backlog: VecDeque<MeshEvent>,

    status: ConnectionStatusTracker,
    status_tx: watch::Sender<ConnectionStatus>,

    /// Application events (caller drains this)
    events: Vec<CallEvent>,
    chat: ChatLog,

    media_skipped: bool,
    joined: bool,
    ended: bool,
}

impl<C, F, D> CallLoop<C, F, D>
where
    C: RelayConnector,
    F: PeerConnectionFactory,
    D: MediaDevices,
{
    pub fn new(
        config: SessionConfig,
        session_id: SessionId,
        connector: C,
        factory: F,
        devices: D,
    ) -> Self {
        let (status_tx, _) = watch::channel(ConnectionStatus::Disconnected);
        let mesh = MeshLoop::new(factory, config.batch_size, config.queue_size);
        let translator = EventTranslator::new(session_id.clone());

        Self {
            config,
            session_id,
            connector,
            relay: None,
            devices,
            mesh,
            translator,
            backlog: VecDeque::new(),
            status: ConnectionStatusTracker::new(),
            status_tx,
            events: Vec::new(),
            chat: ChatLog::default(),
            media_skipped: false,
            joined: false,
            ended: false,
        }
    }

    /// Connect to the relay, capture local media and join the session
    pub async fn start(&mut self) -> Result<()> {
        self.connect().await?;
        self.join().await
    }

    /// Open the relay channel with bounded retries
    pub async fn connect(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.update_status(ConnectionStatusTracker::relay_connecting);

        match RelayClient::connect(
            &mut self.connector,
            &self.config.relay_url,
            self.config.retry_policy(),
        )
        .await
        {
            Ok(relay) => {
                self.relay = Some(relay);
                self.update_status(ConnectionStatusTracker::relay_connected);
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Could not connect to relay: {}", e);
                self.update_status(ConnectionStatusTracker::relay_disconnected);
                Err(e)
            }
        }
    }

    /// Capture camera and microphone (once), then join the session
    pub async fn join(&mut self) -> Result<()> {
        self.ensure_active()?;

        if !self.mesh.manager().media().has_local_media() && !self.media_skipped {
            match self.devices.get_user_media().await {
                Ok(stream) => {
                    tracing::info!("🎥 Local media acquired");
                    self.mesh.install_local_media(stream);
                    self.update_status(ConnectionStatusTracker::media_acquired);
                }
                Err(e) if self.config.join_without_media => {
                    tracing::warn!("⚠️ Joining without local media: {}", e);
                    self.media_skipped = true;
                    self.update_status(ConnectionStatusTracker::media_skipped);
                }
                Err(e) => {
                    tracing::error!("❌ Media error: {}", e);
                    self.update_status(ConnectionStatusTracker::media_failed);
                    return Err(e.into());
                }
            }
        }

        let relay = self.relay.as_mut().ok_or(P2PError::NotConnected)?;
        relay.join_session(&self.session_id)?;
        self.joined = true;

        self.dispatch_actions();
        Ok(())
    }

    /// Reconnect after the relay was lost and join the session again
    ///
    /// Every peer connection was already destroyed when the loss was
    /// polled; the mesh is rebuilt from the fresh membership events.
    pub async fn reconnect(&mut self) -> Result<()> {
        self.ensure_active()?;
        self.update_status(ConnectionStatusTracker::relay_connecting);

        let result = match self.relay.take() {
            Some(mut relay) => relay.reconnect(&mut self.connector).await.map(|()| relay),
            None => {
                RelayClient::connect(
                    &mut self.connector,
                    &self.config.relay_url,
                    self.config.retry_policy(),
                )
                .await
            }
        };

        match result {
            Ok(relay) => {
                self.relay = Some(relay);
                self.update_status(ConnectionStatusTracker::relay_connected);
                self.join().await
            }
            Err(e) => {
                tracing::error!("🔴 Reconnect failed: {}", e);
                self.update_status(ConnectionStatusTracker::relay_disconnected);
                Err(e)
            }
        }
    }

    /// Main event loop - call this regularly
    ///
    /// Returns number of inputs processed.
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;

        // ===== Step 1: Relay events → backlog =====
        let relay_events = match self.relay.as_mut() {
            Some(relay) => relay.poll_events(),
            None => Vec::new(),
        };
        for event in relay_events {
            match &event {
                RelayEvent::Disconnected { .. } => {
                    self.joined = false;
                    self.update_status(ConnectionStatusTracker::relay_disconnected);
                }
                RelayEvent::RelayError { message } => {
                    self.events.push(CallEvent::RelayError {
                        message: message.clone(),
                    });
                }
                _ => {}
            }

            if let Some(mesh_event) = self.translator.to_mesh_event(event) {
                self.backlog.push_back(mesh_event);
            }
        }

        // ===== Step 2: Backlog → mesh queue, as far as it has room =====
        if let Err(e) = self.mesh.feed_events(&mut self.backlog) {
            tracing::warn!("⚠️ Relay events held back: {}", e);
        }

        // ===== Step 3: Run the mesh =====
        processed += self.mesh.poll();

        // ===== Step 4: Execute mesh actions =====
        self.dispatch_actions();

        processed
    }

    pub fn set_camera_enabled(&mut self, enabled: bool) {
        self.mesh.execute(MeshCommand::SetCameraEnabled { enabled });
        self.dispatch_actions();
    }

    pub fn set_mic_enabled(&mut self, enabled: bool) {
        self.mesh.execute(MeshCommand::SetMicEnabled { enabled });
        self.dispatch_actions();
    }

    /// Ask for a screen and send it instead of the camera on every connection
    ///
    /// A second call while already sharing does nothing. If the call ends
    /// while the picker is open, the captured track is stopped and dropped.
    pub async fn start_screen_share(&mut self) -> std::result::Result<(), ScreenCaptureError> {
        let ticket = match self.mesh.begin_screen_share() {
            Ok(ScreenShareStart::AlreadySharing) => {
                tracing::debug!("Screen share already active");
                return Ok(());
            }
            Ok(ScreenShareStart::Pending(ticket)) => ticket,
            Err(error) => {
                tracing::warn!("⚠️ Cannot share screen: {}", error);
                self.events.push(CallEvent::ScreenShareFailed {
                    error: error.clone(),
                });
                return Err(error);
            }
        };

        let result = self.devices.get_display_media().await;
        let failure = result.as_ref().err().cloned();

        self.mesh
            .execute(MeshCommand::CompleteScreenShare { ticket, result });
        self.dispatch_actions();

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    pub fn stop_screen_share(&mut self) {
        self.mesh.execute(MeshCommand::StopScreenShare);
        self.dispatch_actions();
    }

    /// A local track ended outside our control (e.g. the platform's
    /// "stop sharing" button)
    pub fn notify_track_ended(&mut self, track_id: TrackId) {
        self.mesh.execute(MeshCommand::LocalTrackEnded { track_id });
        self.dispatch_actions();
    }

    /// Post a chat line to the local log
    pub fn send_chat_message(&mut self, text: &str) -> Option<ChatMessage> {
        let message = self.chat.post(text)?.clone();
        self.events
            .push(CallEvent::ChatMessagePosted(message.clone()));
        Some(message)
    }

    /// Leave the call: close every connection, stop every track, tell the
    /// relay and close it
    ///
    /// Synchronous and idempotent, so it can run from an unload hook.
    pub fn teardown(&mut self) {
        if self.ended {
            return;
        }
        self.ended = true;

        tracing::info!("👋 Leaving session {}", self.session_id);
        self.backlog.clear();
        self.mesh.teardown();
        self.dispatch_actions();

        if let Some(mut relay) = self.relay.take() {
            relay.close();
        }
        self.joined = false;
        self.update_status(ConnectionStatusTracker::reset);
    }

    /// Drain application events (caller's responsibility)
    pub fn drain_events(&mut self) -> Vec<CallEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn status(&self) -> ConnectionStatus {
        self.status.status()
    }

    /// Watch status changes from another task
    pub fn subscribe_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status_tx.subscribe()
    }

    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn chat_log(&self) -> &ChatLog {
        &self.chat
    }

    pub fn is_joined(&self) -> bool {
        self.joined
    }

    pub fn is_relay_connected(&self) -> bool {
        self.relay.as_ref().is_some_and(RelayClient::is_connected)
    }

    pub fn has_ended(&self) -> bool {
        self.ended
    }

    /// Relay events received but not yet queued for the mesh
    pub fn backlog_len(&self) -> usize {
        self.backlog.len()
    }

    /// Get reference to the mesh (for queries)
    pub fn mesh(&self) -> &PeerMeshManager<F> {
        self.mesh.manager()
    }

    /// Get reference to the media devices (for advanced usage)
    pub fn devices(&self) -> &D {
        &self.devices
    }

    pub fn devices_mut(&mut self) -> &mut D {
        &mut self.devices
    }

    fn ensure_active(&self) -> Result<()> {
        if self.ended {
            return Err(P2PError::CallEnded);
        }
        Ok(())
    }

    fn update_status(
        &mut self,
        input: impl FnOnce(&mut ConnectionStatusTracker) -> Option<ConnectionStatus>,
    ) {
        if let Some(status) = input(&mut self.status) {
            self.status_tx.send_replace(status);
            self.events.push(CallEvent::StatusChanged(status));
        }
    }

    fn dispatch_actions(&mut self) {
        for action in self.mesh.drain_actions() {
            match action {
                MeshAction::SendSignal { envelope } => match self.relay.as_mut() {
                    Some(relay) => {
                        if let Err(e) = relay.send_signal(&envelope) {
                            tracing::warn!(
                                "⚠️ Could not relay {}: {}",
                                envelope.payload.kind(),
                                e
                            );
                        }
                    }
                    None => tracing::warn!(
                        "⚠️ Dropping {}: relay not connected",
                        envelope.payload.kind()
                    ),
                },

                MeshAction::LeaveSession => {
                    if !self.joined {
                        continue;
                    }
                    if let Some(relay) = self.relay.as_mut() {
                        if let Err(e) = relay.leave_session(&self.session_id) {
                            tracing::warn!("⚠️ Could not announce leave: {}", e);
                        }
                    }
                }

                action => {
                    if let Some(event) = self.translator.to_call_event(action) {
                        self.events.push(event);
                    }
                }
            }
        }
    }
}

impl<C, F, D> Drop for CallLoop<C, F, D>
where
    C: RelayConnector,
    F: PeerConnectionFactory,
    D: MediaDevices,
{
    fn drop(&mut self) {
        self.teardown();
    }
}
