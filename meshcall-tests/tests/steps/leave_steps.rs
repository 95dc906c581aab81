use cucumber::{then, when};
use meshcall_p2p::CallEvent;
use meshcall_tests::MeshWorld;

// ===== When Steps =====

#[when(expr = "{string} leaves the call")]
async fn leaves_call(world: &mut MeshWorld, name: String) {
    world.call_mut(&name).teardown();
    world.collect_events();
}

// ===== Then Steps =====

#[then(expr = "every track {string} captured is stopped")]
async fn every_track_stopped(world: &mut MeshWorld, name: String) {
    let tracks = world.issued_tracks(&name);
    assert!(!tracks.is_empty());
    for track in tracks {
        assert!(track.is_stopped(), "{} is still live", track.label());
    }
}

#[then(expr = "{string} saw {string} leave")]
async fn saw_leave(world: &mut MeshWorld, observer: String, leaver: String) {
    assert!(world.events_of(&observer).iter().any(|event| matches!(
        event,
        CallEvent::ParticipantRemoved { participant_id } if participant_id.as_str() == leaver
    )));
}

#[then("no participant reported a failure")]
async fn no_failures(world: &mut MeshWorld) {
    for (name, events) in &world.events {
        let failures: Vec<_> = events
            .iter()
            .filter(|event| {
                matches!(
                    event,
                    CallEvent::PeerConnectionFailed { .. } | CallEvent::CommandFailed { .. }
                )
            })
            .collect();
        assert!(failures.is_empty(), "{} reported {:?}", name, failures);
    }
}
