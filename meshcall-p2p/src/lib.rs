// Application layer (use cases)
pub mod application;

// Infrastructure layer (adapters)
pub mod infrastructure;

// Re-exports for convenience
pub use application::runtime::{CallLoop, CallLoopBuilder};
pub use application::{CallEvent, ChatLog, ChatMessage, EventTranslator, RelayEvent, SessionConfig};
pub use infrastructure::error::{P2PError, Result};
pub use infrastructure::message::{ClientMessage, ServerMessage};
pub use infrastructure::relay_client::{RelayClient, RetryPolicy};
pub use infrastructure::transport::{RelayConnector, RelayTransport, TransportFrame};

pub use meshcall_core::{ConnectionStatus, ParticipantId, SessionId};

#[cfg(feature = "native")]
pub use infrastructure::websocket::{WebSocketConnector, WebSocketTransport};
