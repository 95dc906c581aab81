use crate::application::runtime::CallLoop;
use crate::application::SessionConfig;
use crate::infrastructure::error::Result;
use crate::infrastructure::transport::RelayConnector;
use instant::Duration;
use meshcall_core::{MediaDevices, PeerConnectionFactory, SessionId};

/// Builder for call loops
pub struct CallLoopBuilder {
    config: SessionConfig,
}

impl CallLoopBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
        }
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn relay_url(mut self, url: impl Into<String>) -> Self {
        self.config.relay_url = url.into();
        self
    }

    pub fn batch_size(mut self, size: usize) -> Self {
        self.config.batch_size = size;
        self
    }

    pub fn queue_size(mut self, size: usize) -> Self {
        self.config.queue_size = size;
        self
    }

    pub fn reconnection(mut self, attempts: u32, delay: Duration) -> Self {
        self.config = self.config.with_reconnection(attempts, delay);
        self
    }

    pub fn join_without_media(mut self, allowed: bool) -> Self {
        self.config.join_without_media = allowed;
        self
    }

    /// Build an idle loop; call [`CallLoop::start`] to join
    pub fn build<C, F, D>(
        self,
        session_id: SessionId,
        connector: C,
        factory: F,
        devices: D,
    ) -> CallLoop<C, F, D>
    where
        C: RelayConnector,
        F: PeerConnectionFactory,
        D: MediaDevices,
    {
        CallLoop::new(self.config, session_id, connector, factory, devices)
    }

    /// Build, connect and join in one go
    pub async fn join<C, F, D>(
        self,
        session_id: SessionId,
        connector: C,
        factory: F,
        devices: D,
    ) -> Result<CallLoop<C, F, D>>
    where
        C: RelayConnector,
        F: PeerConnectionFactory,
        D: MediaDevices,
    {
        tracing::info!("🎯 Joining session {} via {}", session_id, self.config.relay_url);

        let mut call = self.build(session_id, connector, factory, devices);
        call.start().await?;

        tracing::info!("✅ Joined session {}", call.session_id());
        Ok(call)
    }

    /// Join over a WebSocket relay connection
    #[cfg(feature = "native")]
    pub async fn join_websocket<F, D>(
        self,
        session_id: SessionId,
        factory: F,
        devices: D,
    ) -> Result<CallLoop<crate::infrastructure::websocket::WebSocketConnector, F, D>>
    where
        F: PeerConnectionFactory,
        D: MediaDevices,
    {
        self.join(
            session_id,
            crate::infrastructure::websocket::WebSocketConnector,
            factory,
            devices,
        )
        .await
    }
}

impl Default for CallLoopBuilder {
    fn default() -> Self {
        Self::new()
    }
}
