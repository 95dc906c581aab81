use crate::application::{MeshCommand, MeshEvent};
use std::collections::VecDeque;

/// Anything the mesh can be asked to process
#[derive(Debug, Clone, PartialEq)]
pub enum MeshInput {
    Event(MeshEvent),
    Command(MeshCommand),
}

impl From<MeshEvent> for MeshInput {
    fn from(event: MeshEvent) -> Self {
        MeshInput::Event(event)
    }
}

impl From<MeshCommand> for MeshInput {
    fn from(command: MeshCommand) -> Self {
        MeshInput::Command(command)
    }
}

/// Synchronous bounded FIFO (no async, works in any runtime)
#[derive(Debug)]
pub struct InputQueue {
    queue: VecDeque<MeshInput>,
    max_size: usize,
}

impl InputQueue {
    pub fn new(max_size: usize) -> Self {
        Self {
            queue: VecDeque::with_capacity(max_size),
            max_size,
        }
    }

    /// Push an input (returns error if full)
    pub fn push(&mut self, input: MeshInput) -> Result<(), QueueError> {
        if self.queue.len() >= self.max_size {
            return Err(QueueError::Full { max: self.max_size });
        }
        self.queue.push_back(input);
        Ok(())
    }

    pub fn pop(&mut self) -> Option<MeshInput> {
        self.queue.pop_front()
    }

    /// Discard everything still queued, returning how many inputs were dropped
    pub fn clear(&mut self) -> usize {
        let dropped = self.queue.len();
        self.queue.clear();
        dropped
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.queue.len() >= self.max_size
    }

    pub fn capacity(&self) -> usize {
        self.max_size
    }
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum QueueError {
    #[error("Queue is full (max size: {max})")]
    Full { max: usize },
}

impl Default for InputQueue {
    fn default() -> Self {
        Self::new(100)
    }
}
