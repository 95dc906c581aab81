use crate::domain::ParticipantId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A proposed network path discovered during negotiation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IceCandidate {
    pub candidate: String,

    #[serde(rename = "sdpMid", default, skip_serializing_if = "Option::is_none")]
    pub sdp_mid: Option<String>,

    #[serde(
        rename = "sdpMLineIndex",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub sdp_mline_index: Option<u16>,
}

impl IceCandidate {
    pub fn new(candidate: impl Into<String>) -> Self {
        Self {
            candidate: candidate.into(),
            sdp_mid: None,
            sdp_mline_index: None,
        }
    }

    pub fn with_mid(mut self, sdp_mid: impl Into<String>, sdp_mline_index: u16) -> Self {
        self.sdp_mid = Some(sdp_mid.into());
        self.sdp_mline_index = Some(sdp_mline_index);
        self
    }
}

/// Negotiation data exchanged between two participants through the relay
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum SignalPayload {
    /// First half of the handshake
    Offer { sdp: String },

    /// Second half of the handshake
    Answer { sdp: String },

    /// Trickled network path
    Candidate { candidate: IceCandidate },

    /// Newcomer asking an existing participant to start the handshake
    HandshakeRequest,
}

impl SignalPayload {
    /// Wire name of the payload type
    pub fn kind(&self) -> &'static str {
        match self {
            SignalPayload::Offer { .. } => "offer",
            SignalPayload::Answer { .. } => "answer",
            SignalPayload::Candidate { .. } => "candidate",
            SignalPayload::HandshakeRequest => "handshake-request",
        }
    }

    /// True for payloads that carry a session description
    pub fn is_description(&self) -> bool {
        matches!(
            self,
            SignalPayload::Offer { .. } | SignalPayload::Answer { .. }
        )
    }
}

/// One side of a signal route
///
/// The local participant never learns its own relay id, so it is addressed
/// as `Local` rather than by id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Endpoint {
    Local,
    Remote(ParticipantId),
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Endpoint::Local => write!(f, "local"),
            Endpoint::Remote(id) => write!(f, "{}", id),
        }
    }
}

/// Routed signal: who sent it, who should receive it, and the payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalEnvelope {
    pub from: Endpoint,
    pub to: Endpoint,
    pub payload: SignalPayload,
}

impl SignalEnvelope {
    /// Envelope addressed from the local participant to a remote one
    pub fn to_remote(to: ParticipantId, payload: SignalPayload) -> Self {
        Self {
            from: Endpoint::Local,
            to: Endpoint::Remote(to),
            payload,
        }
    }

    /// Envelope received from a remote participant
    pub fn from_remote(from: ParticipantId, payload: SignalPayload) -> Self {
        Self {
            from: Endpoint::Remote(from),
            to: Endpoint::Local,
            payload,
        }
    }

    /// The remote participant on the other end of this envelope
    pub fn remote(&self) -> Option<&ParticipantId> {
        match (&self.from, &self.to) {
            (Endpoint::Remote(id), _) => Some(id),
            (_, Endpoint::Remote(id)) => Some(id),
            _ => None,
        }
    }
}
