use cucumber::{given, then, when};
use meshcall_core::{
    MediaAcquisitionError, ParticipantId, ScreenCaptureError, TrackKind, TrackSource,
};
use meshcall_p2p::CallEvent;
use meshcall_tests::sim::SimDevices;
use meshcall_tests::MeshWorld;

fn outbound_video_source(world: &MeshWorld, sender: &str, receiver: &str) -> Option<TrackSource> {
    world
        .network
        .outbound_tracks(sender, receiver)
        .iter()
        .find(|track| track.kind() == TrackKind::Video)
        .map(|track| track.source())
}

// ===== Given Steps =====

#[given(expr = "{string} has no camera")]
async fn has_no_camera(world: &mut MeshWorld, name: String) {
    world.prepare(
        &name,
        SimDevices {
            user_media_error: Some(MediaAcquisitionError::DeviceNotFound),
            ..Default::default()
        },
    );
}

#[given("joining without media is allowed")]
async fn joining_without_media_allowed(world: &mut MeshWorld) {
    world.join_without_media = true;
}

// ===== When Steps =====

#[when(expr = "{string} disables the camera")]
async fn disables_camera(world: &mut MeshWorld, name: String) {
    world.call_mut(&name).set_camera_enabled(false);
    world.collect_events();
}

#[when(expr = "{string} disables the microphone")]
async fn disables_microphone(world: &mut MeshWorld, name: String) {
    world.call_mut(&name).set_mic_enabled(false);
    world.collect_events();
}

#[when(expr = "{string} shares the screen")]
async fn shares_screen(world: &mut MeshWorld, name: String) {
    if let Err(e) = world.call_mut(&name).start_screen_share().await {
        world.last_error = Some(e.to_string());
    }
    world.collect_events();
}

#[when(expr = "{string} stops sharing the screen")]
async fn stops_sharing(world: &mut MeshWorld, name: String) {
    world.call_mut(&name).stop_screen_share();
    world.collect_events();
}

#[when(expr = "the screen capture of {string} ends on its own")]
async fn screen_capture_ends(world: &mut MeshWorld, name: String) {
    let screen = world
        .call(&name)
        .mesh()
        .media()
        .state()
        .and_then(|state| state.screen_track.clone())
        .unwrap_or_else(|| panic!("{} is not sharing a screen", name));
    screen.stop();
}

#[when(expr = "{string} cancels the screen picker")]
async fn cancels_screen_picker(world: &mut MeshWorld, name: String) {
    let call = world.call_mut(&name);
    call.devices_mut()
        .display_results
        .push_back(Err(ScreenCaptureError::Cancelled));
    if let Err(e) = call.start_screen_share().await {
        world.last_error = Some(e.to_string());
    }
    world.collect_events();
}

// ===== Then Steps =====

#[then(expr = "{string} receives a disabled {string} track from {string}")]
async fn receives_disabled_track(world: &mut MeshWorld, receiver: String, kind: String, sender: String) {
    let kind = match kind.as_str() {
        "audio" => TrackKind::Audio,
        "video" => TrackKind::Video,
        other => panic!("Unknown track kind '{}'", other),
    };
    let sender_id = ParticipantId::parse(sender.as_str()).unwrap();
    let record = world
        .call(&receiver)
        .mesh()
        .connections()
        .get(&sender_id)
        .unwrap_or_else(|| panic!("{} has no connection to {}", receiver, sender));
    let stream = record
        .adapter
        .remote_stream()
        .unwrap_or_else(|| panic!("{} has no media from {}", receiver, sender));
    let track = stream.track_of_kind(kind).unwrap();
    assert!(!track.is_enabled());
    assert!(!track.is_stopped());
}

#[then(expr = "{string} receives the screen of {string}")]
async fn receives_screen(world: &mut MeshWorld, receiver: String, sender: String) {
    assert_eq!(
        outbound_video_source(world, &sender, &receiver),
        Some(TrackSource::Screen)
    );
}

#[then(expr = "{string} receives the camera of {string}")]
async fn receives_camera(world: &mut MeshWorld, receiver: String, sender: String) {
    assert_eq!(
        outbound_video_source(world, &sender, &receiver),
        Some(TrackSource::Camera)
    );
}

#[then(expr = "{string} saw the screen share stop")]
async fn saw_share_stop(world: &mut MeshWorld, name: String) {
    assert!(world
        .events_of(&name)
        .contains(&CallEvent::ScreenShareStopped));
}

#[then(expr = "{string} saw the screen share fail")]
async fn saw_share_fail(world: &mut MeshWorld, name: String) {
    assert!(world.events_of(&name).iter().any(|event| matches!(
        event,
        CallEvent::ScreenShareFailed { .. }
    )));
}

#[then(expr = "joining failed with {string}")]
async fn joining_failed(world: &mut MeshWorld, expected: String) {
    let error = world.last_error.as_deref().unwrap_or_default();
    assert!(
        error.contains(&expected),
        "expected '{}' in '{}'",
        expected,
        error
    );
}
