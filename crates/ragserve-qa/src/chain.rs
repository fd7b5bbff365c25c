//! The QA and chat chains.

use ragserve_core::{ChatTurn, Error, GenerationOptions, SearchResult, TextGenerator};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::prompt::{format_context, render_chat_prompt, PromptTemplate};
use crate::retriever::Retriever;

/// A generated answer with the chunks used as context, in retrieval order.
#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    /// The question as asked
    pub question: String,
    /// The generated answer text
    pub answer: String,
    /// Chunks that formed the context block
    pub source_chunks: Vec<SearchResult>,
}

/// Retrieval-augmented question answering.
///
/// Flow per query: retrieve → format prompt → generate → respond. When
/// retrieval comes back empty the chain proceeds with an empty context block;
/// the prompt itself instructs the model to admit not knowing.
pub struct QaChain {
    retriever: Retriever,
    generator: Arc<dyn TextGenerator>,
    prompt: PromptTemplate,
    options: GenerationOptions,
}

impl QaChain {
    /// Create a new QA chain.
    pub fn new(
        retriever: Retriever,
        generator: Arc<dyn TextGenerator>,
        options: GenerationOptions,
    ) -> Self {
        Self {
            retriever,
            generator,
            prompt: PromptTemplate::rag_default(),
            options,
        }
    }

    /// Replace the prompt template.
    #[must_use]
    pub fn with_prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = prompt;
        self
    }

    /// Answer `question` from the collection.
    ///
    /// `top_k` overrides the retriever's default result count for this call.
    pub async fn query(&self, question: &str, top_k: Option<usize>) -> Result<Answer, Error> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Validation("question must not be empty".to_string()));
        }

        let source_chunks = self.retriever.retrieve(question, top_k).await?;
        if source_chunks.is_empty() {
            debug!("retrieval returned no chunks, proceeding with empty context");
        }

        let context = format_context(&source_chunks);
        let prompt = self.prompt.render(&context, question);

        let answer = self.generator.generate(&prompt, &self.options).await?;

        info!(
            "answered question ({} source chunks, {} answer chars)",
            source_chunks.len(),
            answer.chars().count()
        );

        Ok(Answer {
            question: question.to_string(),
            answer,
            source_chunks,
        })
    }
}

/// Direct chat with the model; no retrieval on this path.
pub struct ChatChain {
    generator: Arc<dyn TextGenerator>,
    options: GenerationOptions,
}

impl ChatChain {
    /// Create a new chat chain.
    pub fn new(generator: Arc<dyn TextGenerator>, options: GenerationOptions) -> Self {
        Self { generator, options }
    }

    /// Send `message` to the model, prefixed with a window of the most
    /// recent history exchanges.
    ///
    /// `temperature` overrides the configured default for this call.
    pub async fn chat(
        &self,
        message: &str,
        temperature: Option<f32>,
        history: &[ChatTurn],
    ) -> Result<String, Error> {
        let message = message.trim();
        if message.is_empty() {
            return Err(Error::Validation("message must not be empty".to_string()));
        }

        let options = GenerationOptions {
            temperature: temperature.unwrap_or(self.options.temperature),
            max_tokens: self.options.max_tokens,
        };

        let prompt = render_chat_prompt(message, history);
        let response = self.generator.generate(&prompt, &options).await?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragserve_core::{Chunk, ChatRole, Embedder, LlmError, StoreError, VectorStore};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;
    use uuid::Uuid;

    /// Generator that records the prompts it was given.
    struct RecordingGenerator {
        prompts: Mutex<Vec<String>>,
        temperatures: Mutex<Vec<f32>>,
        reply: String,
    }

    impl RecordingGenerator {
        fn new(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                prompts: Mutex::new(Vec::new()),
                temperatures: Mutex::new(Vec::new()),
                reply: reply.to_string(),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for RecordingGenerator {
        fn model_name(&self) -> &str {
            "recording"
        }

        async fn generate(
            &self,
            prompt: &str,
            options: &GenerationOptions,
        ) -> Result<String, LlmError> {
            self.prompts.lock().await.push(prompt.to_string());
            self.temperatures.lock().await.push(options.temperature);
            Ok(self.reply.clone())
        }
    }

    struct StaticEmbedder;

    #[async_trait]
    impl Embedder for StaticEmbedder {
        fn model_name(&self) -> &str {
            "static"
        }

        fn dimension(&self) -> usize {
            2
        }

        async fn embed(&self, _text: &str) -> Result<Vec<f32>, LlmError> {
            Ok(vec![1.0, 0.0])
        }
    }

    /// Store with fixed contents and a search-call counter.
    struct CountingStore {
        results: Vec<SearchResult>,
        searches: AtomicUsize,
    }

    impl CountingStore {
        fn with_results(results: Vec<SearchResult>) -> Arc<Self> {
            Arc::new(Self {
                results,
                searches: AtomicUsize::new(0),
            })
        }

        fn search_count(&self) -> usize {
            self.searches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VectorStore for CountingStore {
        async fn init(&self) -> Result<(), StoreError> {
            Ok(())
        }

        async fn add_chunks(&self, _chunks: &[Chunk]) -> Result<(), StoreError> {
            Ok(())
        }

        async fn search(
            &self,
            _embedding: &[f32],
            k: usize,
        ) -> Result<Vec<SearchResult>, StoreError> {
            self.searches.fetch_add(1, Ordering::SeqCst);
            Ok(self.results.iter().take(k).cloned().collect())
        }

        async fn count(&self) -> u64 {
            self.results.len() as u64
        }

        async fn delete_all(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn result(content: &str) -> SearchResult {
        SearchResult {
            chunk_id: Uuid::new_v4(),
            source: "doc.txt".to_string(),
            chunk_index: 0,
            content: content.to_string(),
            distance: 0.1,
        }
    }

    fn qa_chain(
        store: Arc<CountingStore>,
        generator: Arc<RecordingGenerator>,
    ) -> QaChain {
        let retriever = Retriever::new(store, Arc::new(StaticEmbedder), 4);
        QaChain::new(retriever, generator, GenerationOptions::default())
    }

    #[tokio::test]
    async fn test_query_returns_answer_with_sources() {
        let store = CountingStore::with_results(vec![result("alpha"), result("beta")]);
        let generator = RecordingGenerator::new("the answer");

        let answer = qa_chain(store.clone(), generator.clone())
            .query("what?", None)
            .await
            .unwrap();

        assert_eq!(answer.question, "what?");
        assert_eq!(answer.answer, "the answer");
        assert_eq!(answer.source_chunks.len(), 2);
        assert_eq!(store.search_count(), 1);
    }

    #[tokio::test]
    async fn test_query_prompt_contains_context_and_question() {
        let store = CountingStore::with_results(vec![result("alpha"), result("beta")]);
        let generator = RecordingGenerator::new("ok");

        qa_chain(store, generator.clone())
            .query("what is alpha?", None)
            .await
            .unwrap();

        let prompts = generator.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("alpha\n\nbeta"));
        assert!(prompts[0].contains("Question: what is alpha?"));
    }

    #[tokio::test]
    async fn test_query_with_empty_retrieval_proceeds() {
        let store = CountingStore::with_results(vec![]);
        let generator = RecordingGenerator::new("I don't know.");

        let answer = qa_chain(store, generator.clone())
            .query("anything?", None)
            .await
            .unwrap();

        assert_eq!(answer.answer, "I don't know.");
        assert!(answer.source_chunks.is_empty());

        // The generator was still invoked, with an empty context block.
        let prompts = generator.prompts.lock().await;
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Context:\n\n"));
    }

    #[tokio::test]
    async fn test_query_rejects_empty_question() {
        let store = CountingStore::with_results(vec![]);
        let generator = RecordingGenerator::new("unused");

        let err = qa_chain(store.clone(), generator)
            .query("   ", None)
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Validation(_)));
        assert_eq!(store.search_count(), 0);
    }

    #[tokio::test]
    async fn test_query_top_k_limits_sources() {
        let store =
            CountingStore::with_results(vec![result("a"), result("b"), result("c")]);
        let generator = RecordingGenerator::new("ok");

        let answer = qa_chain(store, generator)
            .query("q?", Some(2))
            .await
            .unwrap();
        assert_eq!(answer.source_chunks.len(), 2);
    }

    #[tokio::test]
    async fn test_chat_does_not_touch_the_store() {
        let generator = RecordingGenerator::new("hello!");
        let chain = ChatChain::new(generator.clone(), GenerationOptions::default());

        let response = chain.chat("안녕하세요", None, &[]).await.unwrap();
        assert_eq!(response, "hello!");

        let prompts = generator.prompts.lock().await;
        assert_eq!(prompts[0], "안녕하세요");
    }

    #[tokio::test]
    async fn test_chat_temperature_override() {
        let generator = RecordingGenerator::new("ok");
        let chain = ChatChain::new(generator.clone(), GenerationOptions::default());

        chain.chat("hi", Some(0.2), &[]).await.unwrap();
        chain.chat("hi again", None, &[]).await.unwrap();

        let temperatures = generator.temperatures.lock().await;
        assert!((temperatures[0] - 0.2).abs() < f32::EPSILON);
        assert!((temperatures[1] - 0.7).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn test_chat_renders_history_window() {
        let generator = RecordingGenerator::new("ok");
        let chain = ChatChain::new(generator.clone(), GenerationOptions::default());

        let history = vec![
            ChatTurn {
                role: ChatRole::User,
                content: "first".to_string(),
            },
            ChatTurn {
                role: ChatRole::Assistant,
                content: "reply".to_string(),
            },
        ];
        chain.chat("second", None, &history).await.unwrap();

        let prompts = generator.prompts.lock().await;
        assert!(prompts[0].starts_with("User: first\nAssistant: reply\n"));
        assert!(prompts[0].ends_with("User: second\nAssistant:"));
    }

    #[tokio::test]
    async fn test_chat_rejects_empty_message() {
        let generator = RecordingGenerator::new("unused");
        let chain = ChatChain::new(generator, GenerationOptions::default());

        let err = chain.chat("", None, &[]).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }
}
