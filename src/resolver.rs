use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::ChatConfig;
use crate::conversation::{AwaitingFlag, AwaitingGuard, ChatMessage};
use crate::knowledge::{self, KnowledgeEntry, KNOWLEDGE_BASE};
use crate::llm_interaction::{GeminiClient, TextGenerator};

/// Answers a user message from the knowledge table, or from the generator
/// when nothing in the table matches. Holds no conversation state.
pub struct MessageResolver {
    knowledge: &'static [KnowledgeEntry],
    generator: Arc<dyn TextGenerator>,
    company: String,
}

impl MessageResolver {
    pub fn new(company: impl Into<String>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            knowledge: KNOWLEDGE_BASE,
            generator,
            company: company.into(),
        }
    }

    /// Resolver backed by the Gemini client described by `config`.
    pub fn from_config(config: &ChatConfig) -> Self {
        Self::new(config.company.clone(), Arc::new(GeminiClient::new(config)))
    }

    pub fn company(&self) -> &str {
        &self.company
    }

    /// Persona preamble followed by the literal question.
    pub fn build_prompt(&self, question: &str) -> String {
        format!(
            "You are an AI assistant for {}.\nAnswer professionally and clearly.\n\nQuestion: {}",
            self.company, question
        )
    }

    /// Canned answer for `text`, if any table phrase occurs in it.
    pub fn lookup(&self, text: &str) -> Option<ChatMessage> {
        knowledge::find_answer(self.knowledge, text).map(|entry| {
            debug!(question = entry.question, "Matched canned answer");
            ChatMessage::bot(entry.answer)
        })
    }

    /// Asks the generator. Failures become the matching fallback reply.
    pub async fn ask_remote(&self, question: &str) -> ChatMessage {
        let prompt = self.build_prompt(question);
        match self.generator.generate(&prompt).await {
            Ok(text) => ChatMessage::bot(text),
            Err(e) => {
                warn!(error = %e, "Remote answer unavailable, using fallback reply");
                ChatMessage::bot(e.fallback_text())
            }
        }
    }

    /// The synchronous half of resolution: blank check, then table match.
    /// When the message has to go to the generator the awaiting flag is
    /// raised here and stays up for as long as the returned guard lives.
    pub fn begin(&self, user_text: &str, awaiting: &AwaitingFlag) -> Option<Resolution> {
        let text = user_text.trim();
        if text.is_empty() {
            return None;
        }
        if let Some(reply) = self.lookup(text) {
            return Some(Resolution::Canned(reply));
        }

        info!("No canned answer, asking the generation service");
        Some(Resolution::Remote {
            question: text.to_string(),
            guard: awaiting.raise(),
        })
    }

    /// Full resolution of one user message. `None` for blank input.
    /// `awaiting` is set only while the remote call is outstanding.
    pub async fn resolve(&self, user_text: &str, awaiting: &AwaitingFlag) -> Option<ChatMessage> {
        match self.begin(user_text, awaiting)? {
            Resolution::Canned(reply) => Some(reply),
            Resolution::Remote { question, guard } => {
                let reply = self.ask_remote(&question).await;
                drop(guard);
                Some(reply)
            }
        }
    }
}

/// Outcome of [`MessageResolver::begin`].
pub enum Resolution {
    Canned(ChatMessage),
    Remote { question: String, guard: AwaitingGuard },
}
