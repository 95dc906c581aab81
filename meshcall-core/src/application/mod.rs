mod commands;
mod connection_table;
mod events;
mod media_controller;
mod mesh_manager;
mod peer_adapter;
pub mod runtime;
mod status_tracker;

pub use commands::MeshCommand;
pub use connection_table::{ConnectionRecord, ConnectionTable};
pub use events::{MeshAction, MeshEvent};
pub use media_controller::{
    LocalMediaState, MediaTrackController, ScreenShareStart, ScreenShareTicket, TrackChange,
};
pub use mesh_manager::PeerMeshManager;
pub use peer_adapter::{AdapterEvent, PeerConnectionAdapter};
pub use status_tracker::ConnectionStatusTracker;
