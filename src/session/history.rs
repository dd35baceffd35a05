use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub text: String,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

/// Append-only transcript of one chat session. Held in process memory
/// only; the session dies with the process.
#[derive(Debug, Clone, Default)]
pub struct History {
    messages: Vec<Message>,
}

impl History {
    pub fn with_greeting(greeting: &str) -> Self {
        let mut history = Self::default();
        if !greeting.trim().is_empty() {
            history.push(Message::model(greeting));
        }
        history
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Last `count` messages, or the whole transcript when shorter.
    pub fn tail(&self, count: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(count);
        &self.messages[start..]
    }
}

/// Render turns as `role: text` lines for inclusion in a prompt.
pub fn render_transcript(messages: &[Message]) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str(message.role.as_str());
        out.push_str(": ");
        out.push_str(&message.text);
        out.push('\n');
    }
    out
}

/// Concatenated text of all turns, used for token counting.
pub fn joined_text(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| m.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::{History, Message, render_transcript};

    #[test]
    fn tail_returns_whole_transcript_when_short() {
        let mut history = History::with_greeting("hello");
        history.push(Message::user("hi"));
        assert_eq!(history.tail(6).len(), 2);
        assert_eq!(history.tail(1).len(), 1);
        assert_eq!(history.tail(1)[0].text, "hi");
    }

    #[test]
    fn empty_greeting_starts_empty() {
        let history = History::with_greeting("   ");
        assert!(history.is_empty());
    }

    #[test]
    fn render_transcript_labels_roles() {
        let messages = vec![Message::model("ahoy"), Message::user("question")];
        let rendered = render_transcript(&messages);
        assert_eq!(rendered, "model: ahoy\nuser: question\n");
    }
}
