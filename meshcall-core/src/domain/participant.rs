use instant::Instant;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Relay-assigned identifier of a remote participant
///
/// Opaque to the mesh. Stable for as long as the participant stays in the
/// session and never reused while they are present.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ParticipantId(String);

/// Errors that can occur when parsing identifiers received from the relay
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParticipantError {
    #[error("Participant ID cannot be empty")]
    EmptyParticipantId,

    #[error("Session ID cannot be empty")]
    EmptySessionId,
}

impl ParticipantId {
    /// Parse a participant id, rejecting blank values
    pub fn parse(value: impl Into<String>) -> Result<Self, ParticipantError> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(ParticipantError::EmptyParticipantId);
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ParticipantId {
    type Error = ParticipantError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ParticipantId> for String {
    fn from(id: ParticipantId) -> Self {
        id.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Timestamp in milliseconds since application start (monotonic)
///
/// Uses instant::Instant internally so it also works on wasm targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp representing the current moment
    pub fn now() -> Self {
        static ANCHOR: std::sync::OnceLock<Instant> = std::sync::OnceLock::new();
        let anchor = ANCHOR.get_or_init(Instant::now);

        let elapsed = Instant::now().duration_since(*anchor);
        Timestamp(elapsed.as_millis() as u64)
    }

    pub fn as_millis(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}ms", self.0)
    }
}
