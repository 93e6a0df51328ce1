//! Mock chat gateway for deterministic testing.
//!
//! Returns queued replies without making any network calls.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use crate::gateway::{ChatGateway, ChatOptions, ChatResponse, Usage};
use switchyard_core::{ChatMessage, Result, SwitchyardError};

/// A queued reply.
#[derive(Debug, Clone)]
pub enum MockReply {
    Text(String),
    Error(String),
}

/// One call received by the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub provider: String,
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub options: ChatOptions,
}

/// A gateway that answers from a queue.
///
/// # Example
/// ```
/// use switchyard_llm::mock::MockGateway;
/// let gateway = MockGateway::new(["cliproxy"])
///     .with_response("Hello, world!");
/// ```
pub struct MockGateway {
    providers: Vec<String>,
    replies: Arc<Mutex<Vec<MockReply>>>,
    /// Every call received, in order (for assertions in tests).
    pub calls: Arc<Mutex<Vec<MockCall>>>,
    latency_ms: u64,
}

impl MockGateway {
    pub fn new<I, S>(providers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            providers: providers.into_iter().map(Into::into).collect(),
            replies: Arc::new(Mutex::new(Vec::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
            latency_ms: 120,
        }
    }

    /// Queue a text reply.
    pub fn with_response(self, text: &str) -> Self {
        self.replies.lock().push(MockReply::Text(text.to_string()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: &str) -> Self {
        self.replies.lock().push(MockReply::Error(error.to_string()));
        self
    }

    /// Latency reported on every successful reply.
    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn recorded_calls(&self) -> Vec<MockCall> {
        self.calls.lock().clone()
    }

    fn next_reply(&self) -> MockReply {
        let mut replies = self.replies.lock();
        if replies.is_empty() {
            MockReply::Text("(mock: no more queued responses)".to_string())
        } else {
            replies.remove(0)
        }
    }
}

#[async_trait]
impl ChatGateway for MockGateway {
    fn has_provider(&self, name: &str) -> bool {
        self.providers.iter().any(|p| p == name)
    }

    fn providers(&self) -> Vec<String> {
        self.providers.clone()
    }

    async fn chat(
        &self,
        provider: &str,
        model: &str,
        messages: &[ChatMessage],
        options: &ChatOptions,
    ) -> Result<ChatResponse> {
        self.calls.lock().push(MockCall {
            provider: provider.to_string(),
            model: model.to_string(),
            messages: messages.to_vec(),
            options: options.clone(),
        });

        match self.next_reply() {
            MockReply::Error(e) => Err(SwitchyardError::Gateway(e)),
            MockReply::Text(content) => Ok(ChatResponse {
                content,
                provider: provider.to_string(),
                model: model.to_string(),
                latency_ms: self.latency_ms,
                usage: Usage {
                    input_tokens: 100,
                    output_tokens: 50,
                },
            }),
        }
    }
}
