use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub text: String,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Role::Bot,
            text: text.into(),
        }
    }
}

/// Shared "awaiting response" flag. Cloning shares the same flag.
#[derive(Debug, Clone, Default)]
pub struct AwaitingFlag(Arc<AtomicBool>);

impl AwaitingFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Sets the flag until the returned guard is dropped.
    pub fn raise(&self) -> AwaitingGuard {
        self.0.store(true, Ordering::SeqCst);
        AwaitingGuard(self.0.clone())
    }
}

/// Clears the flag on drop, whichever way the request ends.
#[derive(Debug)]
pub struct AwaitingGuard(Arc<AtomicBool>);

impl Drop for AwaitingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("message is empty")]
    Empty,
    #[error("still waiting for the previous reply")]
    Busy,
}

/// Transcript plus UI flags for one chat window.
#[derive(Debug)]
pub struct ConversationState {
    transcript: Vec<ChatMessage>,
    awaiting: AwaitingFlag,
    dark_mode: bool,
}

impl ConversationState {
    pub fn new(greeting: impl Into<String>) -> Self {
        Self {
            transcript: vec![ChatMessage::bot(greeting)],
            awaiting: AwaitingFlag::default(),
            dark_mode: false,
        }
    }

    /// Appends the trimmed input as a user message and returns its text.
    /// Blank input and input arriving while a reply is pending are refused
    /// without touching the transcript.
    pub fn submit(&mut self, input: &str) -> Result<String, SubmitError> {
        let text = input.trim();
        if text.is_empty() {
            return Err(SubmitError::Empty);
        }
        if self.awaiting.is_set() {
            return Err(SubmitError::Busy);
        }
        self.transcript.push(ChatMessage::user(text));
        Ok(text.to_string())
    }

    pub fn record_reply(&mut self, reply: ChatMessage) {
        self.transcript.push(reply);
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn awaiting(&self) -> &AwaitingFlag {
        &self.awaiting
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_set()
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Cosmetic only; returns the new value.
    pub fn toggle_theme(&mut self) -> bool {
        self.dark_mode = !self.dark_mode;
        self.dark_mode
    }
}
