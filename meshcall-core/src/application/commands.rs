use crate::application::ScreenShareTicket;
use crate::domain::{MediaTrack, ScreenCaptureError, TrackId};

/// Local user intents handled by the mesh
#[derive(Debug, Clone, PartialEq)]
pub enum MeshCommand {
    /// Turn the camera on or off (no renegotiation)
    SetCameraEnabled { enabled: bool },

    /// Turn the microphone on or off (no renegotiation)
    SetMicEnabled { enabled: bool },

    /// Deliver the result of a screen capture request
    CompleteScreenShare {
        ticket: ScreenShareTicket,
        result: Result<MediaTrack, ScreenCaptureError>,
    },

    /// Go back to the camera
    StopScreenShare,

    /// A local track ended on its own (e.g. "stop sharing" in the browser bar)
    LocalTrackEnded { track_id: TrackId },

    /// Leave the call
    Leave,
}

impl MeshCommand {
    pub fn name(&self) -> &'static str {
        match self {
            MeshCommand::SetCameraEnabled { .. } => "SetCameraEnabled",
            MeshCommand::SetMicEnabled { .. } => "SetMicEnabled",
            MeshCommand::CompleteScreenShare { .. } => "CompleteScreenShare",
            MeshCommand::StopScreenShare => "StopScreenShare",
            MeshCommand::LocalTrackEnded { .. } => "LocalTrackEnded",
            MeshCommand::Leave => "Leave",
        }
    }
}
