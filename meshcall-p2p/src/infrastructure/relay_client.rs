use crate::application::RelayEvent;
use crate::infrastructure::error::{P2PError, Result};
use crate::infrastructure::message::{decode_signal, ClientMessage, ServerMessage};
use crate::infrastructure::transport::{RelayConnector, RelayTransport, TransportFrame};
use instant::Duration;
use meshcall_core::{Endpoint, SessionId, SignalEnvelope};

/// How hard to try reaching the relay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 5,
            delay: Duration::from_millis(1000),
        }
    }
}

/// Session relay client: membership, leave/join and signal forwarding
pub struct RelayClient<T: RelayTransport> {
    transport: Option<T>,
    url: String,
    policy: RetryPolicy,
}

impl<T: RelayTransport> RelayClient<T> {
    /// Connect with bounded retries
    pub async fn connect<C>(connector: &mut C, url: &str, policy: RetryPolicy) -> Result<Self>
    where
        C: RelayConnector<Transport = T>,
    {
        let transport = Self::connect_with_retries(connector, url, policy).await?;
        Ok(Self::from_transport(transport, url, policy))
    }

    /// Wrap an already open transport
    pub fn from_transport(transport: T, url: &str, policy: RetryPolicy) -> Self {
        Self {
            transport: Some(transport),
            url: url.to_string(),
            policy,
        }
    }

    /// Run the bounded connect loop again after the relay was lost
    ///
    /// The caller is responsible for joining the session again.
    pub async fn reconnect<C>(&mut self, connector: &mut C) -> Result<()>
    where
        C: RelayConnector<Transport = T>,
    {
        if let Some(mut stale) = self.transport.take() {
            stale.close();
        }
        tracing::info!("🔄 Reconnecting to relay {}", self.url);
        let transport = Self::connect_with_retries(connector, &self.url, self.policy).await?;
        self.transport = Some(transport);
        Ok(())
    }

    async fn connect_with_retries<C>(connector: &mut C, url: &str, policy: RetryPolicy) -> Result<T>
    where
        C: RelayConnector<Transport = T>,
    {
        let attempts = policy.attempts.max(1);
        let mut last_error = String::new();

        for attempt in 1..=attempts {
            match connector.connect(url).await {
                Ok(transport) => {
                    if attempt > 1 {
                        tracing::info!("✅ Relay reachable after {} attempts", attempt);
                    }
                    return Ok(transport);
                }
                Err(e) => {
                    tracing::warn!(
                        "⚠️ Relay connect attempt {}/{} failed: {}",
                        attempt,
                        attempts,
                        e
                    );
                    last_error = e.to_string();
                    if attempt < attempts {
                        tokio::time::sleep(policy.delay).await;
                    }
                }
            }
        }

        tracing::error!("🔴 Giving up on relay after {} attempts", attempts);
        Err(P2PError::RetriesExhausted {
            attempts,
            last_error,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_connected(&self) -> bool {
        self.transport.as_ref().is_some_and(T::is_open)
    }

    pub fn join_session(&mut self, session_id: &SessionId) -> Result<()> {
        tracing::info!("🚪 Joining session {}", session_id);
        self.send_message(&ClientMessage::JoinSession {
            session_id: session_id.clone(),
        })
    }

    pub fn leave_session(&mut self, session_id: &SessionId) -> Result<()> {
        tracing::info!("🚪 Leaving session {}", session_id);
        self.send_message(&ClientMessage::LeaveSession {
            session_id: session_id.clone(),
        })
    }

    /// Forward a signal to the envelope's remote recipient
    pub fn send_signal(&mut self, envelope: &SignalEnvelope) -> Result<()> {
        let Endpoint::Remote(to) = &envelope.to else {
            return Err(P2PError::SendFailed(
                "signal has no remote recipient".to_string(),
            ));
        };
        tracing::debug!("📤 Relaying {} to {}", envelope.payload.kind(), to);
        self.send_message(&ClientMessage::Signal {
            to: to.clone(),
            signal: envelope.payload.clone(),
        })
    }

    /// Decode everything the relay sent since the last poll
    pub fn poll_events(&mut self) -> Vec<RelayEvent> {
        let Some(transport) = self.transport.as_mut() else {
            return Vec::new();
        };

        let mut events = Vec::new();
        let mut lost = false;
        for frame in transport.poll_frames() {
            match frame {
                TransportFrame::Text(text) => {
                    if let Some(event) = Self::decode(&text) {
                        events.push(event);
                    }
                }
                TransportFrame::Closed { reason } => {
                    tracing::error!("🔴 Relay connection lost: {}", reason);
                    events.push(RelayEvent::Disconnected { reason });
                    lost = true;
                    break;
                }
            }
        }

        if lost {
            self.transport = None;
        }
        events
    }

    /// Close the channel without waiting for anything
    pub fn close(&mut self) {
        if let Some(mut transport) = self.transport.take() {
            transport.close();
            tracing::info!("🔌 Relay connection closed");
        }
    }

    fn send_message(&mut self, message: &ClientMessage) -> Result<()> {
        let transport = self
            .transport
            .as_mut()
            .filter(|transport| transport.is_open())
            .ok_or(P2PError::NotConnected)?;
        transport.send(message.to_frame()?)
    }

    fn decode(text: &str) -> Option<RelayEvent> {
        let message = match ServerMessage::from_frame(text) {
            Ok(message) => message,
            Err(e) => {
                tracing::warn!("⚠️ Dropping undecodable relay frame: {}", e);
                return None;
            }
        };

        let event = match message {
            ServerMessage::MembershipJoined { participant_id } => {
                RelayEvent::MembershipJoined { participant_id }
            }
            ServerMessage::MembershipLeft { participant_id } => {
                RelayEvent::MembershipLeft { participant_id }
            }
            ServerMessage::ExistingMembers { participant_ids } => {
                RelayEvent::ExistingMembers { participant_ids }
            }
            ServerMessage::Signal { from, signal } => match decode_signal(signal) {
                Ok(payload) => {
                    tracing::debug!("📥 {} from {}", payload.kind(), from);
                    RelayEvent::SignalReceived {
                        envelope: SignalEnvelope::from_remote(from, payload),
                    }
                }
                Err(e) => {
                    tracing::warn!("⚠️ Ignoring signal from {}: {}", from, e);
                    return None;
                }
            },
            ServerMessage::Error { message } => {
                tracing::warn!("⚠️ Relay error: {}", message);
                RelayEvent::RelayError { message }
            }
        };
        Some(event)
    }
}
