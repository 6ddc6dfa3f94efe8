//! Interaction loop: dispatches one user input at a time.
//!
//! Input starting with the `search:` prefix goes straight to the search
//! provider and comes back as a raw results block; everything else runs
//! the search-augmented answer flow (search, grounding prompt, streamed
//! generation). Either way the exchange lands in the conversation store.

use futures::{pin_mut, StreamExt};
use tracing::debug;

use websage_core::ChatRole;
use websage_llm::generator::{AnswerGenerator, ModelProvider};
use websage_llm::prompt;
use websage_search::{format_results_markdown, SearchProvider};

use crate::session::ChatSession;

/// Reserved prefix for raw-search mode (matched case-insensitively).
pub const SEARCH_PREFIX: &str = "search:";

/// Search results fetched per query.
pub const RESULT_COUNT: usize = 5;

/// Central coordinator wiring search, prompt assembly, and generation.
///
/// The whole flow for one input runs synchronously within one call;
/// there is no concurrency within a session and no cancellation once a
/// generation attempt has started.
pub struct ChatOrchestrator<S, P> {
    search: S,
    generator: AnswerGenerator<P>,
}

impl<S: SearchProvider, P: ModelProvider> ChatOrchestrator<S, P> {
    pub fn new(search: S, generator: AnswerGenerator<P>) -> Self {
        Self { search, generator }
    }

    /// Handle one user input.
    ///
    /// The user message is appended before dispatch, regardless of
    /// branch. During generation, `on_partial` receives each cumulative
    /// partial as it arrives. The final assistant text is appended to
    /// the session and returned. This never fails: every upstream error
    /// has already been converted to substitute data or a fallback by
    /// the component that caught it.
    pub async fn handle_input<F>(
        &self,
        session: &mut ChatSession,
        input: &str,
        mut on_partial: F,
    ) -> String
    where
        F: FnMut(&str),
    {
        session.append(ChatRole::User, input);

        let reply = if let Some(query) = strip_search_prefix(input) {
            debug!(query = %query, "Raw search dispatch");
            let results = self.search.search(query, RESULT_COUNT).await;
            format_results_markdown(&results)
        } else {
            debug!("Search-augmented generation dispatch");
            let results = self.search.search(input, RESULT_COUNT).await;
            let grounding = prompt::assemble(input, &results);

            let stream = self.generator.generate(&grounding);
            pin_mut!(stream);
            let mut latest = String::new();
            while let Some(partial) = stream.next().await {
                on_partial(&partial);
                latest = partial;
            }
            latest
        };

        session.append(ChatRole::Assistant, reply.clone());
        reply
    }
}

/// Strip the `search:` prefix, case-insensitive on the prefix only.
///
/// Returns the trimmed remainder when the prefix matches.
fn strip_search_prefix(input: &str) -> Option<&str> {
    match input.get(..SEARCH_PREFIX.len()) {
        Some(prefix) if prefix.eq_ignore_ascii_case(SEARCH_PREFIX) => {
            Some(input[SEARCH_PREFIX.len()..].trim())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use websage_core::SearchResult;
    use websage_llm::generator::FragmentStream;
    use websage_llm::{ModelError, FALLBACK_MESSAGE};

    // ---- Mocks ----

    type CallLog<T> = Arc<Mutex<Vec<T>>>;

    struct MockSearch {
        results: Vec<SearchResult>,
        queries: CallLog<(String, usize)>,
    }

    impl MockSearch {
        fn with_results(results: Vec<SearchResult>) -> Self {
            Self {
                results,
                queries: Arc::new(Mutex::new(Vec::new())),
            }
        }

        fn queries(&self) -> Vec<(String, usize)> {
            self.queries.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SearchProvider for MockSearch {
        async fn search(&self, query: &str, count: usize) -> Vec<SearchResult> {
            self.queries.lock().unwrap().push((query.to_string(), count));
            self.results.clone()
        }
    }

    /// Yields scripted fragments on every call and records prompts.
    struct MockModel {
        fragments: Vec<Result<String, ModelError>>,
        prompts: CallLog<String>,
        fail_open: bool,
    }

    impl MockModel {
        fn streaming(fragments: &[&str]) -> Self {
            Self {
                fragments: fragments.iter().map(|s| Ok(s.to_string())).collect(),
                prompts: Arc::new(Mutex::new(Vec::new())),
                fail_open: false,
            }
        }

        fn always_failing() -> Self {
            Self {
                fragments: Vec::new(),
                prompts: Arc::new(Mutex::new(Vec::new())),
                fail_open: true,
            }
        }
    }

    #[async_trait]
    impl ModelProvider for MockModel {
        async fn open_stream(
            &self,
            _variant: &str,
            prompt: &str,
        ) -> Result<FragmentStream, ModelError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            if self.fail_open {
                return Err(ModelError::Other("unavailable".to_string()));
            }
            Ok(futures::stream::iter(self.fragments.clone()).boxed())
        }
    }

    /// The prompt log outlives the model, which moves into the generator.
    fn orchestrator(
        search: MockSearch,
        model: MockModel,
    ) -> (ChatOrchestrator<MockSearch, MockModel>, CallLog<String>) {
        let prompts = Arc::clone(&model.prompts);
        let generator = AnswerGenerator::new(model, vec!["test-variant".to_string()]);
        (ChatOrchestrator::new(search, generator), prompts)
    }

    fn title_result(title: &str) -> SearchResult {
        SearchResult {
            title: Some(title.to_string()),
            link: Some("https://example.org".to_string()),
            snippet: Some("snippet".to_string()),
        }
    }

    // ---- Prefix parsing ----

    #[test]
    fn test_strip_search_prefix_basic() {
        assert_eq!(strip_search_prefix("search: rust 1.0"), Some("rust 1.0"));
    }

    #[test]
    fn test_strip_search_prefix_case_insensitive() {
        assert_eq!(strip_search_prefix("SEARCH: x"), Some("x"));
        assert_eq!(strip_search_prefix("Search:x"), Some("x"));
    }

    #[test]
    fn test_strip_search_prefix_only_at_start() {
        assert_eq!(strip_search_prefix("please search: x"), None);
        assert_eq!(strip_search_prefix("searching for x"), None);
    }

    #[test]
    fn test_strip_search_prefix_short_input() {
        assert_eq!(strip_search_prefix("sea"), None);
        assert_eq!(strip_search_prefix(""), None);
    }

    #[test]
    fn test_strip_search_prefix_multibyte_input_does_not_panic() {
        assert_eq!(strip_search_prefix("héllo wörld"), None);
        assert_eq!(strip_search_prefix("日本語のクエリです"), None);
    }

    // ---- Raw search branch ----

    #[tokio::test]
    async fn test_search_prefix_skips_model() {
        let search = MockSearch::with_results(vec![title_result("Rust")]);
        let model = MockModel::streaming(&["should not run"]);
        let (orch, prompts) = orchestrator(search, model);
        let mut session = ChatSession::new();

        let reply = orch
            .handle_input(&mut session, "search: rust lang", |_| {})
            .await;

        assert!(reply.contains("**Rust**"));
        assert!(prompts.lock().unwrap().is_empty());
        assert_eq!(orch.search.queries(), vec![("rust lang".to_string(), 5)]);
    }

    #[tokio::test]
    async fn test_search_branch_appends_both_messages() {
        let search = MockSearch::with_results(vec![title_result("T")]);
        let (orch, _) = orchestrator(search, MockModel::streaming(&[]));
        let mut session = ChatSession::new();

        orch.handle_input(&mut session, "search: q", |_| {}).await;

        let active = session.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[0].role, ChatRole::User);
        assert_eq!(active[0].content, "search: q");
        assert_eq!(active[1].role, ChatRole::Assistant);
    }

    // ---- Generation branch ----

    #[tokio::test]
    async fn test_generation_streams_partials_and_appends_final() {
        let search = MockSearch::with_results(vec![]);
        let model = MockModel::streaming(&["The ", "answer"]);
        let (orch, _) = orchestrator(search, model);
        let mut session = ChatSession::new();

        let mut partials = Vec::new();
        let reply = orch
            .handle_input(&mut session, "what is rust", |p| partials.push(p.to_string()))
            .await;

        assert_eq!(partials, vec!["The ", "The answer"]);
        assert_eq!(reply, "The answer");

        let active = session.active();
        assert_eq!(active.len(), 2);
        assert_eq!(active[1].role, ChatRole::Assistant);
        assert_eq!(active[1].content, "The answer");
    }

    #[tokio::test]
    async fn test_generation_prompt_includes_search_context_and_question() {
        let search = MockSearch::with_results(vec![title_result("Rust Blog")]);
        let model = MockModel::streaming(&["ok"]);
        let (orch, prompts) = orchestrator(search, model);
        let mut session = ChatSession::new();

        orch.handle_input(&mut session, "when was rust 1.0", |_| {})
            .await;

        let prompts = prompts.lock().unwrap().clone();
        assert_eq!(prompts.len(), 1);
        assert!(prompts[0].contains("Rust Blog"));
        assert!(prompts[0].contains("Question: when was rust 1.0"));
        assert_eq!(
            orch.search.queries(),
            vec![("when was rust 1.0".to_string(), 5)]
        );
    }

    #[tokio::test]
    async fn test_generation_failure_appends_fallback_message() {
        let search = MockSearch::with_results(vec![]);
        let (orch, _) = orchestrator(search, MockModel::always_failing());
        let mut session = ChatSession::new();

        let reply = orch.handle_input(&mut session, "anything", |_| {}).await;

        assert_eq!(reply, FALLBACK_MESSAGE);
        assert_eq!(session.active()[1].content, FALLBACK_MESSAGE);
    }

    #[tokio::test]
    async fn test_user_message_appended_even_when_everything_fails() {
        let search = MockSearch::with_results(vec![SearchResult::error("down")]);
        let (orch, _) = orchestrator(search, MockModel::always_failing());
        let mut session = ChatSession::new();

        orch.handle_input(&mut session, "hello", |_| {}).await;

        assert_eq!(session.active()[0].role, ChatRole::User);
        assert_eq!(session.active()[0].content, "hello");
    }

    // ---- Multiple turns ----

    #[tokio::test]
    async fn test_turns_accumulate_in_order() {
        let search = MockSearch::with_results(vec![]);
        let (orch, _) = orchestrator(search, MockModel::streaming(&["reply"]));
        let mut session = ChatSession::new();

        orch.handle_input(&mut session, "first", |_| {}).await;
        orch.handle_input(&mut session, "second", |_| {}).await;

        let contents: Vec<&str> = session.active().iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["first", "reply", "second", "reply"]);
    }
}
