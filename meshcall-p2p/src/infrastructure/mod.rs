pub mod error;
pub mod message;
pub mod relay_client;
pub mod transport;

#[cfg(feature = "native")]
pub mod websocket;

pub use error::{P2PError, Result};
pub use relay_client::{RelayClient, RetryPolicy};
pub use transport::{RelayConnector, RelayTransport, TransportFrame};
