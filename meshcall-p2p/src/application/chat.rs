use meshcall_core::Timestamp;

/// One line in the local chat log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: String,
    pub body: String,
    pub sent_at: Timestamp,
}

/// In-memory chat history. Messages are echoed locally and never sent
/// through the relay.
#[derive(Debug, Clone)]
pub struct ChatLog {
    local_name: String,
    messages: Vec<ChatMessage>,
}

impl ChatLog {
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            messages: Vec::new(),
        }
    }

    /// Append a message from the local participant
    ///
    /// Returns `None` when the text is blank after trimming.
    pub fn post(&mut self, text: &str) -> Option<&ChatMessage> {
        let body = text.trim();
        if body.is_empty() {
            return None;
        }

        self.messages.push(ChatMessage {
            sender: self.local_name.clone(),
            body: body.to_string(),
            sent_at: Timestamp::now(),
        });
        self.messages.last()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::new("You")
    }
}
