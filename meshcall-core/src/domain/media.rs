use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

/// Kind of media a track carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    Audio,
    Video,
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackKind::Audio => write!(f, "audio"),
            TrackKind::Video => write!(f, "video"),
        }
    }
}

/// Capture device a local track comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackSource {
    Camera,
    Microphone,
    Screen,
    /// Track received from a remote participant
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrackId(Uuid);

impl TrackId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TrackId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug)]
struct TrackFlags {
    enabled: AtomicBool,
    stopped: AtomicBool,
}

/// Handle to a media track
///
/// Clones share the same `enabled` and `stopped` flags, so muting a track
/// is seen by every connection it is attached to. Two handles are equal when
/// they refer to the same underlying track.
#[derive(Debug, Clone)]
pub struct MediaTrack {
    id: TrackId,
    kind: TrackKind,
    source: TrackSource,
    label: String,
    flags: Arc<TrackFlags>,
}

impl MediaTrack {
    /// Create a new live, enabled local track
    pub fn new(source: TrackSource, label: impl Into<String>) -> Self {
        let kind = match source {
            TrackSource::Microphone => TrackKind::Audio,
            TrackSource::Camera | TrackSource::Screen => TrackKind::Video,
            TrackSource::Remote => TrackKind::Video,
        };
        Self::with_kind(kind, source, label)
    }

    /// Create a track handle for media received from a remote participant
    pub fn remote(kind: TrackKind, label: impl Into<String>) -> Self {
        Self::with_kind(kind, TrackSource::Remote, label)
    }

    fn with_kind(kind: TrackKind, source: TrackSource, label: impl Into<String>) -> Self {
        Self {
            id: TrackId::new(),
            kind,
            source,
            label: label.into(),
            flags: Arc::new(TrackFlags {
                enabled: AtomicBool::new(true),
                stopped: AtomicBool::new(false),
            }),
        }
    }

    pub fn id(&self) -> TrackId {
        self.id
    }

    pub fn kind(&self) -> TrackKind {
        self.kind
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn is_enabled(&self) -> bool {
        self.flags.enabled.load(Ordering::SeqCst)
    }

    /// Flip the enabled flag. Returns true if the value changed.
    pub fn set_enabled(&self, enabled: bool) -> bool {
        self.flags.enabled.swap(enabled, Ordering::SeqCst) != enabled
    }

    pub fn is_stopped(&self) -> bool {
        self.flags.stopped.load(Ordering::SeqCst)
    }

    /// Stop the track permanently. Returns true on the first call only.
    pub fn stop(&self) -> bool {
        !self.flags.stopped.swap(true, Ordering::SeqCst)
    }
}

impl PartialEq for MediaTrack {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for MediaTrack {}

/// Camera and microphone captured together at join time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalStream {
    pub camera: MediaTrack,
    pub microphone: MediaTrack,
}

impl LocalStream {
    pub fn new(camera: MediaTrack, microphone: MediaTrack) -> Self {
        Self { camera, microphone }
    }

    pub fn tracks(&self) -> [&MediaTrack; 2] {
        [&self.microphone, &self.camera]
    }
}

/// Media stream delivered by a remote participant's connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteStream {
    pub id: String,
    pub tracks: Vec<MediaTrack>,
}

impl RemoteStream {
    pub fn new(id: impl Into<String>, tracks: Vec<MediaTrack>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    pub fn track_of_kind(&self, kind: TrackKind) -> Option<&MediaTrack> {
        self.tracks.iter().find(|track| track.kind() == kind)
    }
}
