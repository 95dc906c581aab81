use crate::infrastructure::error::Result;
use meshcall_core::{ParticipantId, SessionId, SignalPayload};
use serde::{Deserialize, Serialize};

/// Frames sent from a participant to the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientMessage {
    JoinSession {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },

    LeaveSession {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },

    /// Forward `signal` to one participant of the session
    Signal {
        to: ParticipantId,
        signal: SignalPayload,
    },
}

/// Frames sent from the relay to a participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerMessage {
    MembershipJoined {
        #[serde(rename = "participantId")]
        participant_id: ParticipantId,
    },

    MembershipLeft {
        #[serde(rename = "participantId")]
        participant_id: ParticipantId,
    },

    ExistingMembers {
        #[serde(rename = "participantIds")]
        participant_ids: Vec<ParticipantId>,
    },

    /// Relayed signal, stamped with the sender. The payload stays raw so an
    /// unknown signal type does not poison the whole frame.
    Signal {
        from: ParticipantId,
        signal: serde_json::Value,
    },

    Error {
        message: String,
    },
}

impl ClientMessage {
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_frame(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

impl ServerMessage {
    pub fn to_frame(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_frame(frame: &str) -> Result<Self> {
        Ok(serde_json::from_str(frame)?)
    }
}

const KNOWN_SIGNAL_TYPES: [&str; 4] = ["offer", "answer", "candidate", "handshake-request"];

#[derive(Debug, thiserror::Error)]
pub enum SignalDecodeError {
    #[error("Unknown signal type '{0}'")]
    UnknownType(String),

    #[error("Malformed signal: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Decode a relayed signal payload
pub fn decode_signal(
    value: serde_json::Value,
) -> std::result::Result<SignalPayload, SignalDecodeError> {
    if let Some(kind) = value.get("type").and_then(serde_json::Value::as_str) {
        if !KNOWN_SIGNAL_TYPES.contains(&kind) {
            return Err(SignalDecodeError::UnknownType(kind.to_string()));
        }
    }
    Ok(serde_json::from_value(value)?)
}
