pub mod sim;

use cucumber::World;
use meshcall_core::{ConnectionState, MediaTrack, SessionId};
use meshcall_p2p::{CallEvent, CallLoop, CallLoopBuilder, SessionConfig};
use sim::{SimConnection, SimConnector, SimDevices, SimNetwork, SimPeerFactory};
use std::collections::BTreeMap;
use std::fmt;

pub type SimCall = CallLoop<SimConnector, SimPeerFactory, SimDevices>;

/// Upper bound on poll rounds before a scenario is considered stuck
const MAX_SETTLE_ROUNDS: usize = 50;

#[derive(World, Default)]
pub struct MeshWorld {
    /// Relay and media wire shared by everyone
    pub network: SimNetwork,

    /// One call per participant (the systems under test)
    pub calls: BTreeMap<String, SimCall>,

    /// Application events seen so far, per participant
    pub events: BTreeMap<String, Vec<CallEvent>>,

    /// Allow joining when camera/microphone capture fails
    pub join_without_media: bool,

    /// Last error returned by an operation
    pub last_error: Option<String>,
}

impl fmt::Debug for MeshWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeshWorld")
            .field("participants", &self.calls.keys().collect::<Vec<_>>())
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl MeshWorld {
    pub fn session_id() -> SessionId {
        SessionId::parse("team-sync").expect("session name is not blank")
    }

    /// Build an idle call for `name` with the given devices
    pub fn prepare(&mut self, name: &str, devices: SimDevices) {
        let config = SessionConfig::new("sim://relay")
            .with_join_without_media(self.join_without_media);
        let call = CallLoopBuilder::new().config(config).build(
            Self::session_id(),
            self.network.connector(name),
            self.network.peer_factory(name),
            devices,
        );
        self.calls.insert(name.to_string(), call);
    }

    /// Connect `name` to the relay and join the session
    pub async fn join(&mut self, name: &str) {
        if !self.calls.contains_key(name) {
            self.prepare(name, SimDevices::default());
        }
        let result = self.call_mut(name).start().await;
        if let Err(e) = result {
            self.last_error = Some(e.to_string());
        }
        self.collect_events();
    }

    /// Poll everyone until no frame is in flight
    pub fn settle(&mut self) {
        for _ in 0..MAX_SETTLE_ROUNDS {
            let mut processed = 0;
            for call in self.calls.values_mut() {
                processed += call.poll();
            }
            self.collect_events();
            if processed == 0 && self.network.is_idle() {
                return;
            }
        }
        panic!("network did not settle after {} rounds", MAX_SETTLE_ROUNDS);
    }

    pub fn collect_events(&mut self) {
        for (name, call) in self.calls.iter_mut() {
            self.events
                .entry(name.clone())
                .or_default()
                .extend(call.drain_events());
        }
    }

    pub fn call(&self, name: &str) -> &SimCall {
        self.calls
            .get(name)
            .unwrap_or_else(|| panic!("Participant '{}' not found", name))
    }

    pub fn call_mut(&mut self, name: &str) -> &mut SimCall {
        self.calls
            .get_mut(name)
            .unwrap_or_else(|| panic!("Participant '{}' not found", name))
    }

    /// `local`'s connection to `remote`, if any
    pub fn connection(&self, local: &str, remote: &str) -> Option<(&SimConnection, ConnectionState)> {
        let participant_id = meshcall_core::ParticipantId::parse(remote).ok()?;
        let record = self.call(local).mesh().connections().get(&participant_id)?;
        Some((record.adapter.connection(), record.state()))
    }

    pub fn events_of(&self, name: &str) -> &[CallEvent] {
        self.events.get(name).map(Vec::as_slice).unwrap_or_default()
    }

    /// Every local track `name` ever captured
    pub fn issued_tracks(&self, name: &str) -> Vec<MediaTrack> {
        self.call(name).devices().issued.clone()
    }
}
