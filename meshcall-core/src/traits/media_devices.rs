use crate::domain::{LocalStream, MediaAcquisitionError, MediaTrack, ScreenCaptureError};
use async_trait::async_trait;

/// Local capture capability (camera, microphone, screen)
#[async_trait]
pub trait MediaDevices: Send {
    /// Ask for camera and microphone access
    async fn get_user_media(&mut self) -> Result<LocalStream, MediaAcquisitionError>;

    /// Ask the user to pick a screen or window to share
    ///
    /// If the user later stops sharing from the platform's own controls, the
    /// returned track is marked stopped.
    async fn get_display_media(&mut self) -> Result<MediaTrack, ScreenCaptureError>;
}
