#![allow(dead_code)]

pub mod fake_media;
pub mod mock_relay;

pub use fake_media::{LoopbackConnection, LoopbackFactory, ScriptedDevices};
pub use mock_relay::{MockConnector, MockRelay, MockTransport};

use meshcall_core::{ParticipantId, SessionId};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub fn init_test_tracing() {
    let _ = tracing_subscriber::registry()
        .with(EnvFilter::new("debug"))
        .with(fmt::layer().with_test_writer())
        .try_init();
}

pub fn pid(value: &str) -> ParticipantId {
    ParticipantId::parse(value).unwrap()
}

pub fn room() -> SessionId {
    SessionId::parse("standup").unwrap()
}
