mod chat;
mod config;
mod event_translator;
mod events;
pub mod runtime;

pub use chat::{ChatLog, ChatMessage};
pub use config::SessionConfig;
pub use event_translator::EventTranslator;
pub use events::{CallEvent, RelayEvent};
