use cucumber::{then, when};
use meshcall_core::ParticipantId;
use meshcall_p2p::ServerMessage;
use meshcall_tests::MeshWorld;
use serde_json::json;

fn participant(name: &str) -> ParticipantId {
    ParticipantId::parse(name).unwrap()
}

// ===== When Steps =====

#[when(expr = "the relay tells {string} that {string} joined")]
async fn relay_announces_join(world: &mut MeshWorld, to: String, who: String) {
    world.network.inject(
        &to,
        ServerMessage::MembershipJoined {
            participant_id: participant(&who),
        },
    );
}

#[when(expr = "the relay tells {string} that {string} was already present")]
async fn relay_lists_existing(world: &mut MeshWorld, to: String, who: String) {
    world.network.inject(
        &to,
        ServerMessage::ExistingMembers {
            participant_ids: vec![participant(&who)],
        },
    );
}

#[when(expr = "{string} sends {string} a handshake request")]
async fn sends_handshake_request(world: &mut MeshWorld, from: String, to: String) {
    world
        .network
        .inject_signal(&from, &to, json!({"type": "handshake-request"}));
}

#[when(expr = "{string} sends {string} a signal of type {string}")]
async fn sends_typed_signal(world: &mut MeshWorld, from: String, to: String, kind: String) {
    world
        .network
        .inject_signal(&from, &to, json!({"type": kind, "sdp": "v=0"}));
}

#[when(expr = "{string} sends {string} an offer")]
async fn sends_offer(world: &mut MeshWorld, from: String, to: String) {
    world.network.inject_signal(
        &from,
        &to,
        json!({"type": "offer", "sdp": format!("v=0 {}->{}", from, to)}),
    );
}

#[when(expr = "{string} sends {string} a candidate")]
async fn sends_candidate(world: &mut MeshWorld, from: String, to: String) {
    world.network.inject_signal(
        &from,
        &to,
        json!({
            "type": "candidate",
            "candidate": {
                "candidate": "candidate:7 1 udp 1686052607 203.0.113.9 61000 typ srflx",
                "sdpMid": "0",
                "sdpMLineIndex": 0
            }
        }),
    );
}

// ===== Then Steps =====

#[then(expr = "{string} sent {int} {string} to {string}")]
async fn sent_signals(world: &mut MeshWorld, from: String, expected: usize, kind: String, to: String) {
    let sent = world
        .network
        .signals_between(&from, &to)
        .into_iter()
        .filter(|sent| *sent == kind)
        .count();
    assert_eq!(sent, expected, "{} -> {} {}", from, to, kind);
}

#[then(expr = "{string} applied {int} signals from {string}")]
async fn applied_signals(world: &mut MeshWorld, local: String, expected: usize, remote: String) {
    let (connection, _) = world
        .connection(&local, &remote)
        .unwrap_or_else(|| panic!("{} has no connection to {}", local, remote));
    assert_eq!(connection.applied.len(), expected);
}

#[then(expr = "the first signal {string} applied from {string} is an {string}")]
async fn first_applied_signal(world: &mut MeshWorld, local: String, remote: String, kind: String) {
    let (connection, _) = world
        .connection(&local, &remote)
        .unwrap_or_else(|| panic!("{} has no connection to {}", local, remote));
    assert_eq!(connection.applied.first().map(|signal| signal.kind()), Some(kind.as_str()));
}
