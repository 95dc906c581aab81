pub mod media_devices;
pub mod peer_connection;

pub use media_devices::MediaDevices;
pub use peer_connection::{PeerConnection, PeerConnectionEvent, PeerConnectionFactory};
