use async_trait::async_trait;
use meshcall_p2p::{
    ClientMessage, P2PError, RelayConnector, RelayTransport, Result, ServerMessage, TransportFrame,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Shared relay state (the test plays the server side by hand)
#[derive(Debug, Default)]
pub struct RelayState {
    /// Everything clients sent, in order
    pub received: Vec<ClientMessage>,

    /// Frames waiting for the client
    pub outbox: VecDeque<TransportFrame>,

    /// Successful connects so far
    pub connects: u32,

    /// Connect attempts so far (including refused ones)
    pub attempts: u32,

    /// How many upcoming connect attempts to refuse
    pub refuse: u32,

    /// How many times a client closed its transport
    pub closes: u32,
}

/// In-memory stand-in for the session relay
#[derive(Debug, Clone, Default)]
pub struct MockRelay {
    state: Arc<Mutex<RelayState>>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connector(&self) -> MockConnector {
        MockConnector {
            state: self.state.clone(),
        }
    }

    /// Server → client
    pub fn push(&self, message: ServerMessage) {
        let frame = message.to_frame().unwrap();
        self.push_raw(&frame);
    }

    /// Server → client, bypassing the codec
    pub fn push_raw(&self, frame: &str) {
        self.state
            .lock()
            .unwrap()
            .outbox
            .push_back(TransportFrame::Text(frame.to_string()));
    }

    /// Relay a signal as if `from` had sent it
    pub fn push_signal(&self, from: &str, signal: serde_json::Value) {
        self.push(ServerMessage::Signal {
            from: super::pid(from),
            signal,
        });
    }

    /// Simulate the relay going away
    pub fn drop_connection(&self, reason: &str) {
        self.state
            .lock()
            .unwrap()
            .outbox
            .push_back(TransportFrame::Closed {
                reason: reason.to_string(),
            });
    }

    pub fn refuse_next(&self, attempts: u32) {
        self.state.lock().unwrap().refuse = attempts;
    }

    pub fn received(&self) -> Vec<ClientMessage> {
        self.state.lock().unwrap().received.clone()
    }

    pub fn take_received(&self) -> Vec<ClientMessage> {
        std::mem::take(&mut self.state.lock().unwrap().received)
    }

    pub fn connects(&self) -> u32 {
        self.state.lock().unwrap().connects
    }

    pub fn attempts(&self) -> u32 {
        self.state.lock().unwrap().attempts
    }

    pub fn closes(&self) -> u32 {
        self.state.lock().unwrap().closes
    }
}

pub struct MockConnector {
    state: Arc<Mutex<RelayState>>,
}

#[async_trait]
impl RelayConnector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&mut self, url: &str) -> Result<MockTransport> {
        let mut state = self.state.lock().unwrap();
        state.attempts += 1;
        if state.refuse > 0 {
            state.refuse -= 1;
            return Err(P2PError::Transport(format!("{} refused the connection", url)));
        }
        state.connects += 1;

        Ok(MockTransport {
            state: self.state.clone(),
            open: true,
        })
    }
}

pub struct MockTransport {
    state: Arc<Mutex<RelayState>>,
    open: bool,
}

impl RelayTransport for MockTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        if !self.open {
            return Err(P2PError::NotConnected);
        }
        let message = ClientMessage::from_frame(&frame)?;
        self.state.lock().unwrap().received.push(message);
        Ok(())
    }

    fn poll_frames(&mut self) -> Vec<TransportFrame> {
        if !self.open {
            return Vec::new();
        }
        let frames: Vec<_> = self.state.lock().unwrap().outbox.drain(..).collect();
        if frames
            .iter()
            .any(|frame| matches!(frame, TransportFrame::Closed { .. }))
        {
            self.open = false;
        }
        frames
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            self.state.lock().unwrap().closes += 1;
        }
    }
}
