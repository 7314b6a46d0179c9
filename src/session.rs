//! One chat window's worth of state driven through the resolver.
//!
//! Submissions are serialized: while a remote reply is pending, further
//! input is refused with [`SubmitError::Busy`], so replies always land
//! directly after the message that triggered them.

use std::sync::Arc;

use crate::conversation::{AwaitingGuard, ChatMessage, ConversationState, SubmitError};
use crate::resolver::{MessageResolver, Resolution};

pub enum Step {
    Rejected(SubmitError),
    /// Answered from the knowledge table; both messages are already in the transcript.
    Answered { user: ChatMessage, reply: ChatMessage },
    /// The user message is recorded and the awaiting flag is up.
    Pending { user: ChatMessage, request: PendingReply },
}

/// An outstanding remote lookup. Holds the awaiting flag up until the
/// finished reply is handed back to [`ChatSession::finish`].
pub struct PendingReply {
    resolver: Arc<MessageResolver>,
    question: String,
    guard: AwaitingGuard,
}

impl PendingReply {
    pub async fn resolve(self) -> CompletedReply {
        let message = self.resolver.ask_remote(&self.question).await;
        CompletedReply {
            message,
            _guard: self.guard,
        }
    }
}

pub struct CompletedReply {
    pub message: ChatMessage,
    _guard: AwaitingGuard,
}

pub struct ChatSession {
    state: ConversationState,
    resolver: Arc<MessageResolver>,
}

impl ChatSession {
    pub fn new(resolver: Arc<MessageResolver>, greeting: impl Into<String>) -> Self {
        Self {
            state: ConversationState::new(greeting),
            resolver,
        }
    }

    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    pub fn toggle_theme(&mut self) -> bool {
        self.state.toggle_theme()
    }

    pub fn handle_input(&mut self, input: &str) -> Step {
        let text = match self.state.submit(input) {
            Ok(text) => text,
            Err(e) => return Step::Rejected(e),
        };
        let user = ChatMessage::user(text.clone());

        match self.resolver.begin(&text, self.state.awaiting()) {
            Some(Resolution::Canned(reply)) => {
                self.state.record_reply(reply.clone());
                Step::Answered { user, reply }
            }
            Some(Resolution::Remote { question, guard }) => Step::Pending {
                user,
                request: PendingReply {
                    resolver: self.resolver.clone(),
                    question,
                    guard,
                },
            },
            // submit() already refused blank input
            None => Step::Rejected(SubmitError::Empty),
        }
    }

    /// Appends the reply, then releases the awaiting flag.
    pub fn finish(&mut self, completed: CompletedReply) -> ChatMessage {
        let CompletedReply { message, _guard } = completed;
        self.state.record_reply(message.clone());
        drop(_guard);
        message
    }
}
