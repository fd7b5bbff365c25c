//! Prompt assembly for the QA and chat paths.

use ragserve_core::{ChatRole, ChatTurn, SearchResult};

/// The fixed RAG prompt.
///
/// The instruction makes the empty-context case safe: with nothing retrieved
/// the model is told to admit it does not know rather than fabricate.
const RAG_TEMPLATE: &str = "Use the following context to answer the question.
If the answer is not in the context, say honestly that you don't know. Do not make up an answer.

Context:
{context}

Question: {question}

Answer:";

/// Number of prior exchanges the chat path keeps.
const HISTORY_WINDOW: usize = 3;

/// A prompt template with `{context}` and `{question}` slots.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// The default RAG template.
    #[must_use]
    pub fn rag_default() -> Self {
        Self {
            template: RAG_TEMPLATE.to_string(),
        }
    }

    /// A custom template. Must contain `{context}` and `{question}`.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Fill in the slots.
    #[must_use]
    pub fn render(&self, context: &str, question: &str) -> String {
        self.template
            .replace("{context}", context)
            .replace("{question}", question)
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::rag_default()
    }
}

/// Join retrieved chunk texts into the context block, blank-line separated.
#[must_use]
pub fn format_context(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(|r| r.content.as_str())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Render the chat prompt: a transcript window of the last
/// [`HISTORY_WINDOW`] exchanges followed by the new message.
///
/// With no history the message is sent as-is.
#[must_use]
pub fn render_chat_prompt(message: &str, history: &[ChatTurn]) -> String {
    if history.is_empty() {
        return message.to_string();
    }

    let keep = HISTORY_WINDOW * 2;
    let window = &history[history.len().saturating_sub(keep)..];

    let mut prompt = String::new();
    for turn in window {
        let speaker = match turn.role {
            ChatRole::User => "User",
            ChatRole::Assistant => "Assistant",
        };
        prompt.push_str(speaker);
        prompt.push_str(": ");
        prompt.push_str(&turn.content);
        prompt.push('\n');
    }
    prompt.push_str("User: ");
    prompt.push_str(message);
    prompt.push_str("\nAssistant:");
    prompt
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result(content: &str) -> SearchResult {
        SearchResult {
            chunk_id: Uuid::new_v4(),
            source: "doc.txt".to_string(),
            chunk_index: 0,
            content: content.to_string(),
            distance: 0.0,
        }
    }

    fn turn(role: ChatRole, content: &str) -> ChatTurn {
        ChatTurn {
            role,
            content: content.to_string(),
        }
    }

    #[test]
    fn test_render_fills_both_slots() {
        let prompt = PromptTemplate::rag_default().render("CONTEXT HERE", "What is X?");
        assert!(prompt.contains("CONTEXT HERE"));
        assert!(prompt.contains("Question: What is X?"));
        assert!(prompt.ends_with("Answer:"));
    }

    #[test]
    fn test_render_with_empty_context() {
        let prompt = PromptTemplate::rag_default().render("", "What is X?");
        assert!(prompt.contains("Context:\n\n"));
        assert!(prompt.contains("don't know"));
    }

    #[test]
    fn test_custom_template() {
        let prompt = PromptTemplate::new("C={context} Q={question}").render("ctx", "q");
        assert_eq!(prompt, "C=ctx Q=q");
    }

    #[test]
    fn test_format_context_joins_with_blank_lines() {
        let context = format_context(&[result("first"), result("second"), result("third")]);
        assert_eq!(context, "first\n\nsecond\n\nthird");
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_chat_prompt_without_history_is_bare_message() {
        assert_eq!(render_chat_prompt("안녕하세요", &[]), "안녕하세요");
    }

    #[test]
    fn test_chat_prompt_renders_transcript() {
        let history = vec![
            turn(ChatRole::User, "hi"),
            turn(ChatRole::Assistant, "hello"),
        ];
        let prompt = render_chat_prompt("how are you?", &history);
        assert_eq!(
            prompt,
            "User: hi\nAssistant: hello\nUser: how are you?\nAssistant:"
        );
    }

    #[test]
    fn test_chat_prompt_keeps_last_three_exchanges() {
        let mut history = Vec::new();
        for i in 0..5 {
            history.push(turn(ChatRole::User, &format!("question {i}")));
            history.push(turn(ChatRole::Assistant, &format!("answer {i}")));
        }

        let prompt = render_chat_prompt("latest", &history);
        // Exchanges 2, 3, 4 survive; 0 and 1 are dropped.
        assert!(!prompt.contains("question 0"));
        assert!(!prompt.contains("question 1"));
        assert!(prompt.contains("question 2"));
        assert!(prompt.contains("answer 4"));
        assert!(prompt.ends_with("User: latest\nAssistant:"));
    }
}
