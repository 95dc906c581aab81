use serde::{Deserialize, Serialize};
use std::fmt;

/// Negotiation role of the local side of one connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Creates the offer
    Initiator,
    /// Answers the remote offer
    Responder,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Initiator => write!(f, "Initiator"),
            Role::Responder => write!(f, "Responder"),
        }
    }
}

/// Lifecycle of a single peer connection
///
/// ```text
/// Created -> Negotiating -> Connected
///    \            \            \
///     +------------+------------+--> Closed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    Created,
    Negotiating,
    Connected,
    Closed,
}

impl ConnectionState {
    /// Whether moving from `self` to `next` is a legal transition
    pub fn can_transition_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (Created, Negotiating)
                | (Negotiating, Connected)
                | (Created, Closed)
                | (Negotiating, Closed)
                | (Connected, Closed)
        )
    }

    pub fn is_closed(self) -> bool {
        self == ConnectionState::Closed
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Created => write!(f, "Created"),
            ConnectionState::Negotiating => write!(f, "Negotiating"),
            ConnectionState::Connected => write!(f, "Connected"),
            ConnectionState::Closed => write!(f, "Closed"),
        }
    }
}

/// Monotonic token stamped on a connection record at creation
///
/// Events carrying an older generation than the live record for the same
/// participant are stale and must be dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Generation(u64);

impl Generation {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Generation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "g{}", self.0)
    }
}
