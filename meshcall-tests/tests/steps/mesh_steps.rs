use cucumber::{given, then, when};
use meshcall_core::{ConnectionState, Role};
use meshcall_p2p::CallEvent;
use meshcall_tests::MeshWorld;

// ===== Given Steps =====

#[given(expr = "{string} is in the session")]
async fn participant_in_session(world: &mut MeshWorld, name: String) {
    world.join(&name).await;
    world.settle();
    assert!(
        world.last_error.is_none(),
        "{} could not join: {:?}",
        name,
        world.last_error
    );
}

// ===== When Steps =====

#[when(expr = "{string} joins the session")]
async fn participant_joins(world: &mut MeshWorld, name: String) {
    world.join(&name).await;
}

#[when("the network settles")]
async fn network_settles(world: &mut MeshWorld) {
    world.settle();
}

#[when(expr = "the relay drops {string}")]
async fn relay_drops(world: &mut MeshWorld, name: String) {
    world.network.drop_client(&name);
}

#[when(expr = "{string} reconnects")]
async fn participant_reconnects(world: &mut MeshWorld, name: String) {
    let result = world.call_mut(&name).reconnect().await;
    if let Err(e) = result {
        world.last_error = Some(e.to_string());
    }
    world.collect_events();
}

// ===== Then Steps =====

#[then(expr = "{string} has {int} connection(s)")]
async fn connection_count(world: &mut MeshWorld, name: String, expected: usize) {
    assert_eq!(world.call(&name).mesh().connection_count(), expected);
}

#[then(expr = "{string} is connected to {string}")]
async fn is_connected_to(world: &mut MeshWorld, local: String, remote: String) {
    let (_, state) = world
        .connection(&local, &remote)
        .unwrap_or_else(|| panic!("{} has no connection to {}", local, remote));
    assert_eq!(state, ConnectionState::Connected);
}

#[then(expr = "{string} is the {word} towards {string}")]
async fn role_towards(world: &mut MeshWorld, local: String, role: String, remote: String) {
    let expected = match role.as_str() {
        "initiator" => Role::Initiator,
        "responder" => Role::Responder,
        other => panic!("Unknown role '{}'", other),
    };
    let (connection, _) = world
        .connection(&local, &remote)
        .unwrap_or_else(|| panic!("{} has no connection to {}", local, remote));
    assert_eq!(connection.role, expected);
}

#[then(expr = "the status of {string} is {string}")]
async fn status_is(world: &mut MeshWorld, name: String, expected: String) {
    assert_eq!(world.call(&name).status().to_string(), expected);
}

#[then(expr = "{string} shows the media of {string}")]
async fn shows_media_of(world: &mut MeshWorld, local: String, remote: String) {
    let shown = world
        .events_of(&local)
        .iter()
        .filter(|event| {
            matches!(
                event,
                CallEvent::RemoteStreamAdded { participant_id, .. }
                    if participant_id.as_str() == remote
            )
        })
        .count();
    assert_eq!(shown, 1, "{} should show {} exactly once", local, remote);
}

#[then(expr = "every participant has {int} connections")]
async fn everyone_has_connections(world: &mut MeshWorld, expected: usize) {
    for (name, call) in &world.calls {
        assert_eq!(
            call.mesh().connection_count(),
            expected,
            "{} has the wrong number of connections",
            name
        );
    }
}

#[then("every participant is connected to every other participant")]
async fn full_mesh(world: &mut MeshWorld) {
    let names: Vec<String> = world.calls.keys().cloned().collect();
    for local in &names {
        for remote in names.iter().filter(|remote| *remote != local) {
            let (_, state) = world
                .connection(local, remote)
                .unwrap_or_else(|| panic!("{} has no connection to {}", local, remote));
            assert_eq!(state, ConnectionState::Connected, "{} -> {}", local, remote);
        }
    }
}

#[then(expr = "{string} reached the relay {int} times")]
async fn relay_connects(world: &mut MeshWorld, name: String, expected: u32) {
    assert_eq!(world.network.connects(&name), expected);
}
