use crate::application::runtime::{InputQueue, MeshInput, QueueError};
use crate::application::{
    MeshAction, MeshCommand, MeshEvent, PeerMeshManager, ScreenShareStart,
};
use crate::domain::{LocalStream, ScreenCaptureError};
use crate::traits::PeerConnectionFactory;
use std::collections::VecDeque;

/// Mesh loop - processes queued inputs in batches, then polls connections
pub struct MeshLoop<F: PeerConnectionFactory> {
    /// Stateful orchestrator (owns all connections)
    manager: PeerMeshManager<F>,

    /// Inbound event/command queue
    inbound: InputQueue,

    /// Outbound actions (caller drains this)
    outbound: Vec<MeshAction>,

    /// Max inputs to process per poll
    batch_size: usize,
}

impl<F: PeerConnectionFactory> MeshLoop<F> {
    pub fn new(factory: F, batch_size: usize, max_queue_size: usize) -> Self {
        Self::with_manager(PeerMeshManager::new(factory), batch_size, max_queue_size)
    }

    pub fn with_manager(
        manager: PeerMeshManager<F>,
        batch_size: usize,
        max_queue_size: usize,
    ) -> Self {
        Self {
            manager,
            inbound: InputQueue::new(max_queue_size),
            outbound: Vec::new(),
            batch_size,
        }
    }

    /// Queue a relay event (non-blocking)
    pub fn submit_event(&mut self, event: MeshEvent) -> Result<(), QueueError> {
        self.inbound.push(MeshInput::Event(event))
    }

    /// Move relay events from `backlog` into the queue while there is room
    ///
    /// Whatever does not fit stays at the front of `backlog`, in order, for
    /// the next call. Returns how many events were queued.
    pub fn feed_events(
        &mut self,
        backlog: &mut VecDeque<MeshEvent>,
    ) -> Result<usize, QueueError> {
        let mut queued = 0;
        while !self.inbound.is_full() {
            let Some(event) = backlog.pop_front() else {
                break;
            };
            self.inbound.push(MeshInput::Event(event))?;
            queued += 1;
        }
        if !backlog.is_empty() {
            tracing::debug!(
                "⏳ Input queue full, {} relay events waiting",
                backlog.len()
            );
        }
        Ok(queued)
    }

    /// Queue a local command (non-blocking)
    pub fn submit_command(&mut self, command: MeshCommand) -> Result<(), QueueError> {
        self.inbound.push(MeshInput::Command(command))
    }

    /// Run a command immediately, ahead of anything queued
    ///
    /// Its actions are appended to the outbound buffer like any other.
    pub fn execute(&mut self, command: MeshCommand) {
        let actions = self.manager.handle_command(command);
        self.outbound.extend(actions);
    }

    /// Install captured media; see [`PeerMeshManager::install_local_media`]
    pub fn install_local_media(&mut self, stream: LocalStream) {
        let actions = self.manager.install_local_media(stream);
        self.outbound.extend(actions);
    }

    pub fn begin_screen_share(&mut self) -> Result<ScreenShareStart, ScreenCaptureError> {
        self.manager.begin_screen_share()
    }

    /// Process up to `batch_size` inputs, then poll every connection
    /// Returns number of inputs processed
    pub fn poll(&mut self) -> usize {
        let mut processed = 0;

        while processed < self.batch_size {
            match self.inbound.pop() {
                Some(MeshInput::Event(event)) => {
                    let actions = self.manager.handle_event(event);
                    self.outbound.extend(actions);
                    processed += 1;
                }
                Some(MeshInput::Command(command)) => {
                    let actions = self.manager.handle_command(command);
                    self.outbound.extend(actions);
                    processed += 1;
                }
                None => break,
            }
        }

        let actions = self.manager.poll_connections();
        self.outbound.extend(actions);

        processed
    }

    /// Leave right now, dropping whatever is still queued
    pub fn teardown(&mut self) {
        let dropped = self.inbound.clear();
        if dropped > 0 {
            tracing::debug!("Dropped {} queued inputs on teardown", dropped);
        }
        let actions = self.manager.teardown();
        self.outbound.extend(actions);
    }

    /// Drain all emitted actions (caller's responsibility)
    pub fn drain_actions(&mut self) -> Vec<MeshAction> {
        std::mem::take(&mut self.outbound)
    }

    pub fn pending_inputs(&self) -> usize {
        self.inbound.len()
    }

    /// Whether another input fits in the queue
    pub fn has_capacity(&self) -> bool {
        !self.inbound.is_full()
    }

    /// Get reference to the orchestrator (for queries)
    pub fn manager(&self) -> &PeerMeshManager<F> {
        &self.manager
    }
}
