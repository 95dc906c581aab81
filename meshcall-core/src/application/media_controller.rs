use crate::domain::{LocalStream, MediaTrack, ScreenCaptureError, TrackId, TrackKind};

/// Local capture state for one call
#[derive(Debug, Clone)]
pub struct LocalMediaState {
    pub camera_track: MediaTrack,
    pub mic_track: MediaTrack,
    pub camera_enabled: bool,
    pub mic_enabled: bool,
    pub screen_track: Option<MediaTrack>,
    pub sharing_screen: bool,
}

impl LocalMediaState {
    fn from_stream(stream: LocalStream) -> Self {
        Self {
            camera_enabled: stream.camera.is_enabled(),
            mic_enabled: stream.microphone.is_enabled(),
            camera_track: stream.camera,
            mic_track: stream.microphone,
            screen_track: None,
            sharing_screen: false,
        }
    }

    /// The track currently feeding every outbound video sender
    pub fn active_video(&self) -> &MediaTrack {
        match (&self.screen_track, self.sharing_screen) {
            (Some(screen), true) => screen,
            _ => &self.camera_track,
        }
    }
}

/// Proof that a screen capture was requested at a given point in time
///
/// A completion is only honoured while its ticket is still the latest one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScreenShareTicket(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenShareStart {
    /// A screen share is already active; nothing to do
    AlreadySharing,
    /// Capture must be requested; hand the ticket back on completion
    Pending(ScreenShareTicket),
}

/// Substitution of an outbound source, to be applied on every connection
#[derive(Debug, Clone, PartialEq)]
pub struct TrackChange {
    pub kind: TrackKind,
    pub previous: MediaTrack,
    pub current: MediaTrack,
}

/// Owns the local tracks and decides which one is the active video source
#[derive(Debug, Default)]
pub struct MediaTrackController {
    state: Option<LocalMediaState>,
    ticket_counter: u64,
    pending_ticket: Option<ScreenShareTicket>,
}

impl MediaTrackController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of freshly captured camera and microphone tracks
    pub fn install(&mut self, stream: LocalStream) {
        if let Some(previous) = self.state.take() {
            tracing::warn!("♻️ Replacing existing local media, stopping old tracks");
            Self::stop_state(&previous);
        }
        tracing::info!(
            "🎥 Local media ready: camera '{}', microphone '{}'",
            stream.camera.label(),
            stream.microphone.label()
        );
        self.state = Some(LocalMediaState::from_stream(stream));
    }

    pub fn has_local_media(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&LocalMediaState> {
        self.state.as_ref()
    }

    pub fn active_video(&self) -> Option<&MediaTrack> {
        self.state.as_ref().map(LocalMediaState::active_video)
    }

    pub fn is_sharing_screen(&self) -> bool {
        self.state.as_ref().is_some_and(|s| s.sharing_screen)
    }

    /// Tracks every new connection must carry: audio first, then active video
    pub fn outbound_tracks(&self) -> Vec<MediaTrack> {
        match &self.state {
            Some(state) => vec![state.mic_track.clone(), state.active_video().clone()],
            None => Vec::new(),
        }
    }

    /// Returns false when there is no local media to toggle
    pub fn set_camera_enabled(&mut self, enabled: bool) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.camera_track.set_enabled(enabled) {
            tracing::debug!("📷 Camera {}", if enabled { "on" } else { "off" });
        }
        state.camera_enabled = enabled;
        true
    }

    /// Returns false when there is no local media to toggle
    pub fn set_mic_enabled(&mut self, enabled: bool) -> bool {
        let Some(state) = self.state.as_mut() else {
            return false;
        };
        if state.mic_track.set_enabled(enabled) {
            tracing::debug!("🎙️ Microphone {}", if enabled { "on" } else { "off" });
        }
        state.mic_enabled = enabled;
        true
    }

    /// First half of starting a screen share
    ///
    /// Issuing a new ticket invalidates any capture still in flight.
    pub fn begin_screen_share(&mut self) -> Result<ScreenShareStart, ScreenCaptureError> {
        let Some(state) = self.state.as_ref() else {
            return Err(ScreenCaptureError::NoLocalMedia);
        };
        if state.sharing_screen {
            return Ok(ScreenShareStart::AlreadySharing);
        }

        self.ticket_counter += 1;
        let ticket = ScreenShareTicket(self.ticket_counter);
        if self.pending_ticket.replace(ticket).is_some() {
            tracing::debug!("🖥️ Superseding pending screen capture request");
        }
        Ok(ScreenShareStart::Pending(ticket))
    }

    /// Second half of starting a screen share
    ///
    /// `Ok(None)` means the completion was stale or the capture had already
    /// ended; the captured track (if any) has been stopped.
    pub fn complete_screen_share(
        &mut self,
        ticket: ScreenShareTicket,
        result: Result<MediaTrack, ScreenCaptureError>,
    ) -> Result<Option<TrackChange>, ScreenCaptureError> {
        if self.pending_ticket != Some(ticket) {
            if let Ok(track) = result {
                tracing::debug!("🗑️ Discarding stale screen capture {}", track.id());
                track.stop();
            }
            return Ok(None);
        }
        self.pending_ticket = None;

        let screen = result?;
        let Some(state) = self.state.as_mut() else {
            screen.stop();
            return Err(ScreenCaptureError::NoLocalMedia);
        };
        if screen.is_stopped() {
            tracing::debug!("🖥️ Screen capture ended before it could be applied");
            return Ok(None);
        }

        let previous = state.active_video().clone();
        state.screen_track = Some(screen.clone());
        state.sharing_screen = true;
        tracing::info!("🖥️ Screen share started: '{}'", screen.label());

        Ok(Some(TrackChange {
            kind: TrackKind::Video,
            previous,
            current: screen,
        }))
    }

    /// Stop sharing and put the camera track back
    pub fn stop_screen_share(&mut self) -> Option<TrackChange> {
        let state = self.state.as_mut()?;
        if !state.sharing_screen {
            return None;
        }

        let screen = state.screen_track.take()?;
        screen.stop();
        state.sharing_screen = false;
        tracing::info!("🖥️ Screen share stopped, camera restored");

        Some(TrackChange {
            kind: TrackKind::Video,
            previous: screen,
            current: state.camera_track.clone(),
        })
    }

    /// True when the active screen track was ended by the platform
    pub fn screen_track_ended(&self) -> bool {
        self.state.as_ref().is_some_and(|state| {
            state.sharing_screen
                && state
                    .screen_track
                    .as_ref()
                    .is_some_and(MediaTrack::is_stopped)
        })
    }

    /// React to a local track that ended on its own
    pub fn handle_track_ended(&mut self, track_id: TrackId) -> Option<TrackChange> {
        let state = self.state.as_ref()?;
        if state.screen_track.as_ref().map(MediaTrack::id) == Some(track_id) {
            return self.stop_screen_share();
        }
        if state.camera_track.id() == track_id || state.mic_track.id() == track_id {
            tracing::warn!("⚠️ Capture track {} ended unexpectedly", track_id);
        }
        None
    }

    /// Stop every local track and forget local media. Returns the number of
    /// tracks that were still live.
    pub fn release_all(&mut self) -> usize {
        self.pending_ticket = None;
        match self.state.take() {
            Some(state) => {
                let stopped = Self::stop_state(&state);
                tracing::info!("🛑 Released local media ({} tracks stopped)", stopped);
                stopped
            }
            None => 0,
        }
    }

    fn stop_state(state: &LocalMediaState) -> usize {
        let mut stopped = 0;
        for track in [&state.camera_track, &state.mic_track]
            .into_iter()
            .chain(state.screen_track.as_ref())
        {
            if track.stop() {
                stopped += 1;
            }
        }
        stopped
    }
}
