use crate::application::PeerConnectionAdapter;
use crate::domain::{ConnectionState, Generation, ParticipantId, Role, Timestamp};
use crate::traits::PeerConnection;
use std::collections::HashMap;

/// Connection bookkeeping for one remote participant
pub struct ConnectionRecord<C: PeerConnection> {
    /// Remote participant this record talks to
    pub participant_id: ParticipantId,
    /// Wrapped peer connection
    pub adapter: PeerConnectionAdapter<C>,
    /// Token assigned at creation, used to spot stale events
    pub generation: Generation,
    /// When this record was created
    pub created_at: Timestamp,
    /// Whether the remote stream has been surfaced already
    pub stream_announced: bool,
}

impl<C: PeerConnection> ConnectionRecord<C> {
    pub fn role(&self) -> Role {
        self.adapter.role()
    }

    pub fn state(&self) -> ConnectionState {
        self.adapter.state()
    }
}

/// All live connections of one call, keyed by participant
///
/// Holds at most one record per participant.
pub struct ConnectionTable<C: PeerConnection> {
    records: HashMap<ParticipantId, ConnectionRecord<C>>,
    last_generation: Generation,
}

impl<C: PeerConnection> ConnectionTable<C> {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
            last_generation: Generation::new(0),
        }
    }

    /// Add a record for the adapter's participant
    ///
    /// Returns `None` and closes the adapter if that participant already has
    /// a record.
    pub fn insert(&mut self, mut adapter: PeerConnectionAdapter<C>) -> Option<Generation> {
        let participant_id = adapter.remote().clone();
        if self.records.contains_key(&participant_id) {
            tracing::warn!(
                "⚠️ Refusing second connection record for {}",
                participant_id
            );
            adapter.destroy();
            return None;
        }

        self.last_generation = self.last_generation.next();
        let generation = self.last_generation;
        self.records.insert(
            participant_id.clone(),
            ConnectionRecord {
                participant_id,
                adapter,
                generation,
                created_at: Timestamp::now(),
                stream_announced: false,
            },
        );
        Some(generation)
    }

    pub fn get(&self, participant_id: &ParticipantId) -> Option<&ConnectionRecord<C>> {
        self.records.get(participant_id)
    }

    pub fn get_mut(&mut self, participant_id: &ParticipantId) -> Option<&mut ConnectionRecord<C>> {
        self.records.get_mut(participant_id)
    }

    pub fn contains(&self, participant_id: &ParticipantId) -> bool {
        self.records.contains_key(participant_id)
    }

    /// Whether `generation` still identifies the live record for this participant
    pub fn is_current(&self, participant_id: &ParticipantId, generation: Generation) -> bool {
        self.records
            .get(participant_id)
            .is_some_and(|record| record.generation == generation)
    }

    pub fn remove(&mut self, participant_id: &ParticipantId) -> Option<ConnectionRecord<C>> {
        self.records.remove(participant_id)
    }

    /// Participant ids in stable order
    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        let mut ids: Vec<_> = self.records.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConnectionRecord<C>> {
        self.records.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ConnectionRecord<C>> {
        self.records.values_mut()
    }

    /// Remove every record, in participant order
    pub fn drain(&mut self) -> Vec<ConnectionRecord<C>> {
        let mut records: Vec<_> = self.records.drain().map(|(_, record)| record).collect();
        records.sort_by(|a, b| a.participant_id.cmp(&b.participant_id));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<C: PeerConnection> Default for ConnectionTable<C> {
    fn default() -> Self {
        Self::new()
    }
}
