use crate::infrastructure::error::{P2PError, Result};
use crate::infrastructure::transport::{RelayConnector, RelayTransport, TransportFrame};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use tracing::Instrument;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Opens WebSocket connections to the relay
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl RelayConnector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&mut self, url: &str) -> Result<WebSocketTransport> {
        tracing::info!("Connecting to relay: {}", url);
        let (stream, _response) = connect_async(url)
            .await
            .map_err(|e| P2PError::Transport(e.to_string()))?;
        tracing::info!("✅ Connected to relay");

        Ok(WebSocketTransport::spawn(stream))
    }
}

/// Infrastructure adapter: relay channel over a WebSocket
///
/// Socket I/O runs on two spawned tasks. This handle only talks to them
/// through channels, so it never blocks.
pub struct WebSocketTransport {
    outgoing: mpsc::UnboundedSender<Message>,
    incoming: mpsc::UnboundedReceiver<TransportFrame>,
    open: bool,
}

impl WebSocketTransport {
    fn spawn(stream: WsStream) -> Self {
        let (write, read) = stream.split();
        let (out_tx, out_rx) = mpsc::unbounded_channel();
        let (in_tx, in_rx) = mpsc::unbounded_channel();

        tokio::spawn(
            Self::sender_task(write, out_rx, in_tx.clone())
                .instrument(tracing::info_span!("meshcall::relay_sender")),
        );
        tokio::spawn(
            Self::receiver_task(read, in_tx)
                .instrument(tracing::info_span!("meshcall::relay_receiver")),
        );

        Self {
            outgoing: out_tx,
            incoming: in_rx,
            open: true,
        }
    }

    async fn sender_task(
        mut write: SplitSink<WsStream, Message>,
        mut rx: mpsc::UnboundedReceiver<Message>,
        frames: mpsc::UnboundedSender<TransportFrame>,
    ) {
        while let Some(message) = rx.recv().await {
            if let Err(e) = write.send(message).await {
                tracing::error!("❌ Failed to send to relay: {}", e);
                let _ = frames.send(TransportFrame::Closed {
                    reason: e.to_string(),
                });
                return;
            }
        }

        let _ = write.close().await;
        tracing::debug!("Relay sender task terminated");
    }

    async fn receiver_task(
        mut read: SplitStream<WsStream>,
        frames: mpsc::UnboundedSender<TransportFrame>,
    ) {
        let reason = loop {
            match read.next().await {
                Some(Ok(message)) if message.is_text() => match message.to_text() {
                    Ok(text) => {
                        if frames.send(TransportFrame::Text(text.to_string())).is_err() {
                            break "transport dropped".to_string();
                        }
                    }
                    Err(e) => tracing::warn!("⚠️ Dropping undecodable relay frame: {}", e),
                },
                Some(Ok(message)) if message.is_close() => {
                    break "closed by relay".to_string();
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    tracing::error!("❌ Relay socket error: {}", e);
                    break e.to_string();
                }
                None => break "relay stream ended".to_string(),
            }
        };

        let _ = frames.send(TransportFrame::Closed { reason });
        tracing::debug!("Relay receiver task terminated");
    }
}

impl RelayTransport for WebSocketTransport {
    fn send(&mut self, frame: String) -> Result<()> {
        if !self.open {
            return Err(P2PError::NotConnected);
        }
        self.outgoing
            .send(Message::text(frame))
            .map_err(|_| P2PError::SendFailed("relay sender task has stopped".to_string()))
    }

    fn poll_frames(&mut self) -> Vec<TransportFrame> {
        let mut frames = Vec::new();
        loop {
            match self.incoming.try_recv() {
                Ok(frame) => {
                    if let TransportFrame::Closed { .. } = frame {
                        if !self.open {
                            continue;
                        }
                        self.open = false;
                    }
                    frames.push(frame);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.open {
                        self.open = false;
                        frames.push(TransportFrame::Closed {
                            reason: "relay tasks ended".to_string(),
                        });
                    }
                    break;
                }
            }
        }
        frames
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn close(&mut self) {
        if self.open {
            self.open = false;
            let _ = self.outgoing.send(Message::Close(None));
        }
    }
}
