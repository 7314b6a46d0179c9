// Canned answers, matched by substring before any remote lookup.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Lowercase phrase looked for anywhere in the user's message.
    pub question: &'static str,
    pub answer: &'static str,
}

/// Table order is the tie-break when several phrases match.
pub static KNOWLEDGE_BASE: &[KnowledgeEntry] = &[
    KnowledgeEntry {
        question: "what does shnoor international llc do",
        answer: "Shnoor International LLC specializes in international trading, logistics solutions, and global business services.",
    },
    KnowledgeEntry {
        question: "where is shnoor international llc located",
        answer: "Shnoor International LLC operates internationally with partners across multiple regions.",
    },
    KnowledgeEntry {
        question: "what services does the company offer",
        answer: "The company offers international trade services, supply chain management, sourcing, and business consulting.",
    },
    KnowledgeEntry {
        question: "how can i contact shnoor international llc",
        answer: "You can contact Shnoor International LLC through official company email or phone channels.",
    },
    KnowledgeEntry {
        question: "what is this chatbot used for",
        answer: "This chatbot provides quick and accurate information about Shnoor International LLC using AI.",
    },
];

/// First entry whose question occurs in the lowercased message.
pub fn find_answer(entries: &'static [KnowledgeEntry], message: &str) -> Option<&'static KnowledgeEntry> {
    let normalized = message.to_lowercase();
    entries
        .iter()
        .find(|entry| normalized.contains(entry.question))
}
