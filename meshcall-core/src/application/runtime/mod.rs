mod input_queue;
mod mesh_loop;

pub use input_queue::{InputQueue, MeshInput, QueueError};
pub use mesh_loop::MeshLoop;
